//! User service
//!
//! Implements business logic for user management:
//! - Signup with a unique username
//! - Login/logout backed by database sessions
//! - Session validation for every request carrying a `session` cookie

use crate::db::repositories::{is_unique_violation, SessionRepository, UserRepository};
use crate::models::{Session, User};
use crate::services::forms::{FormErrors, SignupInput, NON_FIELD_ERRORS};
use crate::services::password::{hash_password, verify_password};
use anyhow::Context;
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Default session expiration time in days
const DEFAULT_SESSION_EXPIRATION_DAYS: i64 = 7;

/// Error shown for an unknown username or a wrong password
pub const INVALID_CREDENTIALS: &str = "Пожалуйста, введите правильные имя пользователя и пароль. \
     Оба поля могут быть чувствительны к регистру.";

/// Error shown when the username is already registered
pub const USERNAME_TAKEN: &str = "Пользователь с таким именем уже существует.";

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (invalid credentials)
    #[error("Authentication failed")]
    AuthenticationError,

    /// Field-level validation failure
    #[error("Validation error: {0}")]
    Validation(FormErrors),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl UserServiceError {
    /// Form errors to show on the page that submitted the request
    pub fn form_errors(&self) -> Option<FormErrors> {
        match self {
            Self::AuthenticationError => {
                Some(FormErrors::single(NON_FIELD_ERRORS, INVALID_CREDENTIALS))
            }
            Self::Validation(errors) => Some(errors.clone()),
            Self::InternalError(_) => None,
        }
    }
}

/// User service for managing users and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    session_expiration_days: i64,
}

impl UserService {
    /// Create a new user service with the given repositories
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
    ) -> Self {
        Self::with_session_expiration(user_repo, session_repo, DEFAULT_SESSION_EXPIRATION_DAYS)
    }

    /// Create a new user service with custom session expiration
    pub fn with_session_expiration(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        session_expiration_days: i64,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_expiration_days,
        }
    }

    /// Register a new user with a hashed password
    ///
    /// # Errors
    ///
    /// - `Validation` with a `username` error if the name is taken
    /// - `InternalError` for database or hashing errors
    pub async fn register(&self, input: SignupInput) -> Result<User, UserServiceError> {
        if self
            .user_repo
            .get_by_username(&input.username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(UserServiceError::Validation(FormErrors::single(
                "username",
                USERNAME_TAKEN,
            )));
        }

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;
        let user = self.create_user(&User::new(input.username, password_hash)).await?;

        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Insert a user as given, without touching the password hash
    pub async fn create_user(&self, user: &User) -> Result<User, UserServiceError> {
        match self.user_repo.create(user).await {
            Ok(created) => Ok(created),
            Err(e) if is_unique_violation(&e) => Err(UserServiceError::Validation(
                FormErrors::single("username", USERNAME_TAKEN),
            )),
            Err(e) => Err(e.context("Failed to create user").into()),
        }
    }

    /// Login with credentials
    ///
    /// Validates the provided credentials and creates a new session if valid.
    ///
    /// # Errors
    ///
    /// - `AuthenticationError` for an unknown user, a wrong password or an
    ///   account without a usable password
    /// - `InternalError` for database errors
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, UserServiceError> {
        let user = self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to get user by username")?
            .ok_or(UserServiceError::AuthenticationError)?;

        if !user.has_usable_password() {
            tracing::warn!(user_id = user.id, "Password login attempted for passwordless account");
            return Err(UserServiceError::AuthenticationError);
        }

        let password_valid = verify_password(password, &user.password_hash)
            .context("Failed to verify password")?;
        if !password_valid {
            tracing::warn!(user_id = user.id, "Login failed: wrong password");
            return Err(UserServiceError::AuthenticationError);
        }

        let session = self.start_session(user.id).await?;
        tracing::info!(user_id = user.id, "User logged in");
        Ok(session)
    }

    /// Logout (invalidate session)
    ///
    /// Deleting a session that does not exist is not an error.
    pub async fn logout(&self, session_id: &str) -> Result<(), UserServiceError> {
        self.session_repo
            .delete(session_id)
            .await
            .context("Failed to delete session")?;

        Ok(())
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        let user = self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user by ID")?;

        Ok(user)
    }

    /// Get user by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, UserServiceError> {
        let user = self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to get user by username")?;

        Ok(user)
    }

    /// Validate session token and return the associated user
    ///
    /// Returns `None` if the session doesn't exist or is expired. Expired
    /// sessions are deleted on sight.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let session = match self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to get session")?
        {
            Some(s) => s,
            None => return Ok(None),
        };

        if session.is_expired() {
            if let Err(e) = self.session_repo.delete(token).await {
                tracing::warn!(error = %e, "Failed to delete expired session");
            }
            return Ok(None);
        }

        self.get_by_id(session.user_id).await
    }

    /// Open a session for a user without checking credentials.
    ///
    /// Used by `login` after verification and by test fixtures to log a
    /// user in directly.
    pub async fn start_session(&self, user_id: i64) -> Result<Session, UserServiceError> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id,
            expires_at: now + Duration::days(self.session_expiration_days),
            created_at: now,
        };

        let created = self
            .session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;

        Ok(created)
    }

    /// Delete all expired sessions, returning how many were removed
    pub async fn cleanup_expired_sessions(&self) -> Result<i64, UserServiceError> {
        let count = self
            .session_repo
            .delete_expired()
            .await
            .context("Failed to delete expired sessions")?;

        Ok(count)
    }

    /// Session lifetime used for new sessions and the cookie `Max-Age`
    pub fn session_expiration_days(&self) -> i64 {
        self.session_expiration_days
    }
}
