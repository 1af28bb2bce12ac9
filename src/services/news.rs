//! News service
//!
//! Read side of the News section: the home page feed and a news item with
//! its comments. Creation exists for seeding and tests.

use crate::db::repositories::{CommentRepository, NewsRepository};
use crate::models::{CommentWithAuthor, News};
use anyhow::Context;
use std::sync::Arc;

/// Default number of items on the home page
pub const DEFAULT_HOME_PAGE_SIZE: u32 = 10;

/// Error types for news service operations
#[derive(Debug, thiserror::Error)]
pub enum NewsServiceError {
    /// No news item with this id
    #[error("News not found: {0}")]
    NotFound(i64),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// News item with its comments, oldest comment first
#[derive(Debug, Clone)]
pub struct NewsDetail {
    pub news: News,
    pub comments: Vec<CommentWithAuthor>,
}

pub struct NewsService {
    news_repo: Arc<dyn NewsRepository>,
    comment_repo: Arc<dyn CommentRepository>,
    home_page_size: u32,
}

impl NewsService {
    pub fn new(
        news_repo: Arc<dyn NewsRepository>,
        comment_repo: Arc<dyn CommentRepository>,
    ) -> Self {
        Self::with_page_size(news_repo, comment_repo, DEFAULT_HOME_PAGE_SIZE)
    }

    pub fn with_page_size(
        news_repo: Arc<dyn NewsRepository>,
        comment_repo: Arc<dyn CommentRepository>,
        home_page_size: u32,
    ) -> Self {
        Self {
            news_repo,
            comment_repo,
            home_page_size,
        }
    }

    /// The newest `home_page_size` items by date
    pub async fn home(&self) -> Result<Vec<News>, NewsServiceError> {
        let items = self
            .news_repo
            .list_latest(self.home_page_size as i64)
            .await
            .context("Failed to list latest news")?;
        Ok(items)
    }

    /// A news item with its comments
    pub async fn detail(&self, id: i64) -> Result<NewsDetail, NewsServiceError> {
        let news = self.get(id).await?;
        let comments = self
            .comment_repo
            .list_by_news(id)
            .await
            .context("Failed to list comments")?;

        Ok(NewsDetail { news, comments })
    }

    /// A news item or `NotFound`
    pub async fn get(&self, id: i64) -> Result<News, NewsServiceError> {
        self.news_repo
            .get_by_id(id)
            .await
            .context("Failed to get news")?
            .ok_or(NewsServiceError::NotFound(id))
    }

    pub async fn create(&self, news: &News) -> Result<News, NewsServiceError> {
        let created = self
            .news_repo
            .create(news)
            .await
            .context("Failed to create news")?;
        tracing::info!(news_id = created.id, "News created");
        Ok(created)
    }

    /// Insert a batch of items atomically
    pub async fn create_many(&self, items: &[News]) -> Result<Vec<News>, NewsServiceError> {
        let created = self
            .news_repo
            .create_many(items)
            .await
            .context("Failed to create news batch")?;
        tracing::info!(count = created.len(), "News batch created");
        Ok(created)
    }
}
