//! Request middleware and extractors
//!
//! Contains:
//! - Application state shared by every handler
//! - Session cookie authentication (optional on every request)
//! - The login-required gate, which redirects anonymous users to the
//!   login page with a `next` parameter

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::convert::Infallible;
use std::sync::Arc;

use crate::config::Config;
use crate::db::repositories::{
    SqlxCommentRepository, SqlxNewsRepository, SqlxNoteRepository, SqlxSessionRepository,
    SqlxUserRepository,
};
use crate::db::DynDatabasePool;
use crate::models::User;
use crate::services::{CommentService, NewsService, NoteService, UserService};
use crate::templates::TemplateEngine;

/// Login page that anonymous users are sent to
pub const LOGIN_URL: &str = "/auth/login/";

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "session";

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: DynDatabasePool,
    pub user_service: Arc<UserService>,
    pub news_service: Arc<NewsService>,
    pub comment_service: Arc<CommentService>,
    pub note_service: Arc<NoteService>,
    pub templates: Arc<TemplateEngine>,
}

impl AppState {
    /// Wire repositories and services over a migrated pool
    pub fn new(pool: DynDatabasePool, config: &Config) -> anyhow::Result<Self> {
        let news_repo = SqlxNewsRepository::boxed(pool.clone());
        let comment_repo = SqlxCommentRepository::boxed(pool.clone());

        let user_service = UserService::with_session_expiration(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
            config.session.expiration_days,
        );
        let news_service =
            NewsService::with_page_size(news_repo.clone(), comment_repo.clone(), config.news.page_size);
        let comment_service = CommentService::new(comment_repo, news_repo);
        let note_service =
            NoteService::with_page_size(SqlxNoteRepository::boxed(pool.clone()), config.notes.page_size);

        Ok(Self {
            pool,
            user_service: Arc::new(user_service),
            news_service: Arc::new(news_service),
            comment_service: Arc::new(comment_service),
            note_service: Arc::new(note_service),
            templates: Arc::new(TemplateEngine::new()?),
        })
    }
}

/// Authenticated user attached to the request by `optional_auth`
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// Extract session token from the `session` cookie or a bearer header
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    let prefix = format!("{}=", SESSION_COOKIE);
    for cookie_header in headers.get_all(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                if let Some(token) = cookie.trim().strip_prefix(prefix.as_str()) {
                    if !token.is_empty() {
                        return Some(token.to_string());
                    }
                }
            }
        }
    }

    None
}

/// `Set-Cookie` value that starts a session
pub fn session_cookie(token: &str, expiration_days: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        expiration_days * 24 * 60 * 60
    )
}

/// `Set-Cookie` value that ends a session
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Optional authentication middleware
///
/// Attaches `AuthenticatedUser` when the request carries a live session.
/// Anything else leaves the request anonymous.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_session_token(request.headers()) {
        match state.user_service.validate_session(&token).await {
            Ok(Some(user)) => {
                request.extensions_mut().insert(AuthenticatedUser(user));
            }
            Ok(None) => tracing::debug!("Request with unknown or expired session"),
            Err(e) => tracing::warn!(error = %e, "Session validation failed"),
        }
    }
    next.run(request).await
}

/// Login-required middleware
pub async fn require_login(request: Request, next: Next) -> Response {
    if request.extensions().get::<AuthenticatedUser>().is_none() {
        return login_redirect(request.uri());
    }
    next.run(request).await
}

/// 302 Found with a `Location` header
pub fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(_) => {
            tracing::warn!(location, "Redirect target is not a valid header value");
            (StatusCode::FOUND, [(header::LOCATION, HeaderValue::from_static("/"))])
                .into_response()
        }
    }
}

/// Login URL that brings the user back to `uri` afterwards
pub fn login_url(uri: &axum::http::Uri) -> String {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    let next = urlencoding::encode(target).replace("%2F", "/");
    format!("{}?next={}", LOGIN_URL, next)
}

/// Redirect an anonymous request to the login page
pub fn login_redirect(uri: &axum::http::Uri) -> Response {
    tracing::debug!(path = %uri.path(), "Anonymous request redirected to login");
    found(&login_url(uri))
}

/// Logged-in user; anonymous requests are redirected to the login page
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .map(|user| CurrentUser(user.0.clone()))
            .ok_or_else(|| login_redirect(&parts.uri))
    }
}

/// The viewer, if logged in
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<User>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(
            parts.extensions.get::<AuthenticatedUser>().map(|user| user.0.clone()),
        ))
    }
}
