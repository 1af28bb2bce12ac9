//! Comment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reader comment attached to a news item.
///
/// `author_id` is fixed at creation; only that user may edit or delete it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: i64,
    pub news_id: i64,
    pub author_id: i64,
    pub text: String,
    pub created: DateTime<Utc>,
}

impl Comment {
    /// Create a comment timestamped now
    pub fn new(news_id: i64, author_id: i64, text: impl Into<String>) -> Self {
        Self {
            id: 0, // Will be set by the database
            news_id,
            author_id,
            text: text.into(),
            created: Utc::now(),
        }
    }
}

/// Comment joined with its author's username, for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: String,
}
