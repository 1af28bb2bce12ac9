//! Note model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of a note title
pub const TITLE_MAX_LENGTH: usize = 100;

/// Maximum length of a note slug
pub const SLUG_MAX_LENGTH: usize = 100;

/// Private note. Only its author can see or change it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub text: String,
    /// Unique across all notes, not just the author's
    pub slug: String,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Note {
    pub fn new(
        title: impl Into<String>,
        text: impl Into<String>,
        slug: impl Into<String>,
        author_id: i64,
    ) -> Self {
        Self {
            id: 0, // Will be set by the database
            title: title.into(),
            text: text.into(),
            slug: slug.into(),
            author_id,
            created_at: Utc::now(),
        }
    }
}
