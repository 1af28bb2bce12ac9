//! News repository
//!
//! Database operations for news items. News is created by fixtures and
//! administrators only; the site itself reads it.

use super::{backend, Backend};
use crate::db::DynDatabasePool;
use crate::models::News;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// News repository trait
#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// Create a news item
    async fn create(&self, news: &News) -> Result<News>;

    /// Insert several news items in one transaction
    async fn create_many(&self, items: &[News]) -> Result<Vec<News>>;

    /// Get news item by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<News>>;

    /// Newest items first, at most `limit` of them
    async fn list_latest(&self, limit: i64) -> Result<Vec<News>>;

    /// Count all news items
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based news repository implementation
pub struct SqlxNewsRepository {
    pool: DynDatabasePool,
}

impl SqlxNewsRepository {
    /// Create a new SQLx news repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn NewsRepository> {
        Arc::new(Self::new(pool))
    }
}

const INSERT_NEWS: &str = "INSERT INTO news (title, text, date) VALUES (?, ?, ?)";

const SELECT_NEWS: &str = "SELECT id, title, text, date FROM news";

#[async_trait]
impl NewsRepository for SqlxNewsRepository {
    async fn create(&self, news: &News) -> Result<News> {
        let id = match backend(&self.pool)? {
            Backend::Sqlite(pool) => sqlx::query(INSERT_NEWS)
                .bind(&news.title)
                .bind(&news.text)
                .bind(news.date)
                .execute(pool)
                .await
                .map(|r| r.last_insert_rowid()),
            Backend::Mysql(pool) => sqlx::query(INSERT_NEWS)
                .bind(&news.title)
                .bind(&news.text)
                .bind(news.date)
                .execute(pool)
                .await
                .map(|r| r.last_insert_id() as i64),
        }
        .context("Failed to create news")?;

        Ok(News { id, ..news.clone() })
    }

    async fn create_many(&self, items: &[News]) -> Result<Vec<News>> {
        match backend(&self.pool)? {
            Backend::Sqlite(pool) => create_many_sqlite(pool, items).await,
            Backend::Mysql(pool) => create_many_mysql(pool, items).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<News>> {
        let query = format!("{} WHERE id = ?", SELECT_NEWS);
        match backend(&self.pool)? {
            Backend::Sqlite(pool) => sqlx::query(&query)
                .bind(id)
                .fetch_optional(pool)
                .await
                .context("Failed to get news by ID")?
                .map(|row| row_to_news_sqlite(&row))
                .transpose(),
            Backend::Mysql(pool) => sqlx::query(&query)
                .bind(id)
                .fetch_optional(pool)
                .await
                .context("Failed to get news by ID")?
                .map(|row| row_to_news_mysql(&row))
                .transpose(),
        }
    }

    async fn list_latest(&self, limit: i64) -> Result<Vec<News>> {
        let query = format!("{} ORDER BY date DESC, id DESC LIMIT ?", SELECT_NEWS);
        match backend(&self.pool)? {
            Backend::Sqlite(pool) => sqlx::query(&query)
                .bind(limit)
                .fetch_all(pool)
                .await
                .context("Failed to list news")?
                .iter()
                .map(row_to_news_sqlite)
                .collect(),
            Backend::Mysql(pool) => sqlx::query(&query)
                .bind(limit)
                .fetch_all(pool)
                .await
                .context("Failed to list news")?
                .iter()
                .map(row_to_news_mysql)
                .collect(),
        }
    }

    async fn count(&self) -> Result<i64> {
        let query = "SELECT COUNT(*) as count FROM news";
        let row_count = match backend(&self.pool)? {
            Backend::Sqlite(pool) => sqlx::query(query)
                .fetch_one(pool)
                .await
                .map(|row| row.get::<i64, _>("count")),
            Backend::Mysql(pool) => sqlx::query(query)
                .fetch_one(pool)
                .await
                .map(|row| row.get::<i64, _>("count")),
        }
        .context("Failed to count news")?;

        Ok(row_count)
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_many_sqlite(pool: &SqlitePool, items: &[News]) -> Result<Vec<News>> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;
    let mut created = Vec::with_capacity(items.len());

    for news in items {
        let result = sqlx::query(INSERT_NEWS)
            .bind(&news.title)
            .bind(&news.text)
            .bind(news.date)
            .execute(&mut *tx)
            .await
            .context("Failed to create news")?;
        created.push(News {
            id: result.last_insert_rowid(),
            ..news.clone()
        });
    }

    tx.commit().await.context("Failed to commit news batch")?;
    Ok(created)
}

fn row_to_news_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<News> {
    Ok(News {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        text: row.try_get("text")?,
        date: row.try_get("date")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_many_mysql(pool: &MySqlPool, items: &[News]) -> Result<Vec<News>> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;
    let mut created = Vec::with_capacity(items.len());

    for news in items {
        let result = sqlx::query(INSERT_NEWS)
            .bind(&news.title)
            .bind(&news.text)
            .bind(news.date)
            .execute(&mut *tx)
            .await
            .context("Failed to create news")?;
        created.push(News {
            id: result.last_insert_id() as i64,
            ..news.clone()
        });
    }

    tx.commit().await.context("Failed to commit news batch")?;
    Ok(created)
}

fn row_to_news_mysql(row: &sqlx::mysql::MySqlRow) -> Result<News> {
    Ok(News {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        text: row.try_get("text")?,
        date: row.try_get("date")?,
    })
}
