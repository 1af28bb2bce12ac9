//! Form inputs and field-level validation
//!
//! Each form deserializes from an `application/x-www-form-urlencoded` body,
//! serializes back as the bound data shown on a re-rendered page, and
//! cleans itself into the values a service needs. Cross-row rules (slug
//! uniqueness, credentials) live in the services.

use crate::models::{SLUG_MAX_LENGTH, TITLE_MAX_LENGTH};
use crate::services::slug::is_valid_slug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Words a comment may not contain, matched case-insensitively as substrings
pub const BAD_WORDS: [&str; 2] = ["редиска", "негодяй"];

/// Error shown when a comment contains a bad word
pub const WARNING: &str = "Не ругайтесь!";

/// Suffix of the duplicate-slug error; the message is `{slug}{SLUG_WARNING}`
pub const SLUG_WARNING: &str =
    " - такой slug уже существует, придумайте уникальное значение!";

/// Error shown for a missing required field
pub const REQUIRED: &str = "Обязательное поле.";

/// Error shown for a slug outside `[A-Za-z0-9_-]`
pub const INVALID_SLUG: &str =
    "Значение должно состоять только из латинских букв, цифр, знаков подчеркивания или дефиса.";

/// Key under which errors not tied to one field are reported
pub const NON_FIELD_ERRORS: &str = "__all__";

/// Username length limit
pub const USERNAME_MAX_LENGTH: usize = 150;

/// Slugs that would shadow a fixed notes route
pub const RESERVED_SLUGS: [&str; 2] = ["add", "done"];

/// Field name to error messages, in a stable order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors holding a single message for `field`
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages for one field, empty when it is valid
    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// `Ok(value)` when no error was recorded
    pub fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// A named, serializable form as exposed in the page context
pub trait Form: Serialize {
    const NAME: &'static str;
}

/// Trim and require a text field
fn required(errors: &mut FormErrors, field: &str, value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
    }
    value.to_string()
}

fn max_length(errors: &mut FormErrors, field: &str, value: &str, limit: usize) {
    let length = value.chars().count();
    if length > limit {
        errors.add(
            field,
            format!(
                "Убедитесь, что это значение содержит не более {} символов (сейчас {}).",
                limit, length
            ),
        );
    }
}

// ============================================================================
// Comment
// ============================================================================

/// Comment text submitted on a news page or the comment edit page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

impl Form for CommentForm {
    const NAME: &'static str = "CommentForm";
}

impl CommentForm {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Cleaned comment text
    pub fn clean(&self) -> Result<String, FormErrors> {
        let mut errors = FormErrors::new();
        let text = required(&mut errors, "text", &self.text);

        let lowered = text.to_lowercase();
        if BAD_WORDS.iter().any(|word| lowered.contains(word)) {
            errors.add("text", WARNING);
        }

        errors.into_result(text)
    }
}

// ============================================================================
// Note
// ============================================================================

/// Note fields submitted on the add and edit pages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub slug: String,
}

impl Form for NoteForm {
    const NAME: &'static str = "NoteForm";
}

/// Cleaned note fields; `slug` is `None` when left blank
#[derive(Debug, Clone, PartialEq)]
pub struct NoteDraft {
    pub title: String,
    pub text: String,
    pub slug: Option<String>,
}

impl NoteForm {
    pub fn new(title: impl Into<String>, text: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            slug: slug.into(),
        }
    }

    pub fn clean(&self) -> Result<NoteDraft, FormErrors> {
        let mut errors = FormErrors::new();

        let title = required(&mut errors, "title", &self.title);
        max_length(&mut errors, "title", &title, TITLE_MAX_LENGTH);
        let text = required(&mut errors, "text", &self.text);

        let slug = self.slug.trim();
        let slug = if slug.is_empty() {
            None
        } else {
            max_length(&mut errors, "slug", slug, SLUG_MAX_LENGTH);
            if !is_valid_slug(slug) {
                errors.add("slug", INVALID_SLUG);
            } else if RESERVED_SLUGS.contains(&slug) {
                errors.add("slug", format!("{}{}", slug, SLUG_WARNING));
            }
            Some(slug.to_string())
        };

        errors.into_result(NoteDraft { title, text, slug })
    }
}

// ============================================================================
// Auth
// ============================================================================

/// Login credentials plus the page to return to
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

impl Form for LoginForm {
    const NAME: &'static str = "AuthenticationForm";
}

impl LoginForm {
    /// Both fields present; credentials are checked by the user service
    pub fn clean(&self) -> Result<(String, String), FormErrors> {
        let mut errors = FormErrors::new();
        let username = required(&mut errors, "username", &self.username);
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }
        errors.into_result((username, self.password.clone()))
    }
}

/// Registration fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password1: String,
    #[serde(default, skip_serializing)]
    pub password2: String,
}

impl Form for SignupForm {
    const NAME: &'static str = "UserCreationForm";
}

/// Cleaned registration data
#[derive(Debug, Clone)]
pub struct SignupInput {
    pub username: String,
    pub password: String,
}

impl SignupForm {
    pub fn clean(&self) -> Result<SignupInput, FormErrors> {
        let mut errors = FormErrors::new();

        let username = required(&mut errors, "username", &self.username);
        max_length(&mut errors, "username", &username, USERNAME_MAX_LENGTH);
        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        }
        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if self.password1 != self.password2 {
            errors.add("password2", "Введенные пароли не совпадают.");
        }

        errors.into_result(SignupInput {
            username,
            password: self.password1.clone(),
        })
    }
}
