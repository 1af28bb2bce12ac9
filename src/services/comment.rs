//! Comment service
//!
//! Creation, editing and deletion of reader comments. Every mutation is
//! scoped to the acting user: touching someone else's comment reports
//! `NotFound`, never "forbidden".

use crate::db::repositories::{CommentRepository, NewsRepository};
use crate::models::Comment;
use crate::services::forms::{CommentForm, FormErrors};
use anyhow::Context;
use std::sync::Arc;

/// Error types for comment service operations
#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    /// Unknown news item, or a comment the user does not own
    #[error("Not found")]
    NotFound,

    /// Field-level validation failure
    #[error("Validation error: {0}")]
    Validation(FormErrors),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub struct CommentService {
    comment_repo: Arc<dyn CommentRepository>,
    news_repo: Arc<dyn NewsRepository>,
}

impl CommentService {
    pub fn new(
        comment_repo: Arc<dyn CommentRepository>,
        news_repo: Arc<dyn NewsRepository>,
    ) -> Self {
        Self {
            comment_repo,
            news_repo,
        }
    }

    /// Add a comment by `author_id` to a news item
    pub async fn create(
        &self,
        news_id: i64,
        author_id: i64,
        form: &CommentForm,
    ) -> Result<Comment, CommentServiceError> {
        if self
            .news_repo
            .get_by_id(news_id)
            .await
            .context("Failed to get news")?
            .is_none()
        {
            return Err(CommentServiceError::NotFound);
        }

        let text = form.clean().map_err(|errors| {
            tracing::warn!(news_id, author_id, %errors, "Comment rejected");
            CommentServiceError::Validation(errors)
        })?;

        let created = self
            .comment_repo
            .create(&Comment::new(news_id, author_id, text))
            .await
            .context("Failed to create comment")?;

        tracing::info!(comment_id = created.id, news_id, author_id, "Comment created");
        Ok(created)
    }

    /// A comment owned by `author_id`
    pub async fn get_for_author(
        &self,
        id: i64,
        author_id: i64,
    ) -> Result<Comment, CommentServiceError> {
        let comment = self
            .comment_repo
            .get_for_author(id, author_id)
            .await
            .context("Failed to get comment")?;

        comment.ok_or_else(|| {
            tracing::debug!(comment_id = id, author_id, "Comment not visible to user");
            CommentServiceError::NotFound
        })
    }

    /// Replace a comment's text. The news item and author never change.
    pub async fn update(
        &self,
        id: i64,
        author_id: i64,
        form: &CommentForm,
    ) -> Result<Comment, CommentServiceError> {
        let existing = self.get_for_author(id, author_id).await?;
        let text = form.clean().map_err(|errors| {
            tracing::warn!(comment_id = id, %errors, "Comment edit rejected");
            CommentServiceError::Validation(errors)
        })?;

        let updated = self
            .comment_repo
            .update_text_for_author(id, author_id, &text)
            .await
            .context("Failed to update comment")?;
        if !updated {
            return Err(CommentServiceError::NotFound);
        }

        tracing::info!(comment_id = id, "Comment updated");
        Ok(Comment { text, ..existing })
    }

    /// Delete a comment, returning the removed row
    pub async fn delete(&self, id: i64, author_id: i64) -> Result<Comment, CommentServiceError> {
        let existing = self.get_for_author(id, author_id).await?;

        let deleted = self
            .comment_repo
            .delete_for_author(id, author_id)
            .await
            .context("Failed to delete comment")?;
        if !deleted {
            return Err(CommentServiceError::NotFound);
        }

        tracing::info!(comment_id = id, news_id = existing.news_id, "Comment deleted");
        Ok(existing)
    }

    /// Count all comments
    pub async fn count(&self) -> Result<i64, CommentServiceError> {
        Ok(self.comment_repo.count().await.context("Failed to count comments")?)
    }
}
