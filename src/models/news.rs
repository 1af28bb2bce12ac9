//! News model

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A news item shown on the home page.
///
/// `date` is the publication date used for ordering, not a creation timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct News {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub date: NaiveDate,
}

impl News {
    /// Create a news item dated today
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::dated(title, text, Utc::now().date_naive())
    }

    /// Create a news item with an explicit date
    pub fn dated(title: impl Into<String>, text: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: 0, // Will be set by the database
            title: title.into(),
            text: text.into(),
            date,
        }
    }
}
