//! Comment repository
//!
//! Database operations for reader comments on news items.
//!
//! Edit and delete take the requesting user's id and only touch a row
//! that user wrote. A `false` result means "no such comment for you",
//! which the web layer turns into a 404.

use super::{backend, Backend};
use crate::db::DynDatabasePool;
use crate::models::{Comment, CommentWithAuthor};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Create a new comment
    async fn create(&self, comment: &Comment) -> Result<Comment>;

    /// Get comment by ID regardless of author
    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>>;

    /// Get comment by ID only if `author_id` wrote it
    async fn get_for_author(&self, id: i64, author_id: i64) -> Result<Option<Comment>>;

    /// Comments of a news item, oldest first, with author names
    async fn list_by_news(&self, news_id: i64) -> Result<Vec<CommentWithAuthor>>;

    /// Replace the text of a comment owned by `author_id`
    async fn update_text_for_author(&self, id: i64, author_id: i64, text: &str) -> Result<bool>;

    /// Delete a comment owned by `author_id`
    async fn delete_for_author(&self, id: i64, author_id: i64) -> Result<bool>;

    /// Count all comments
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based comment repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxCommentRepository {
    /// Create a new SQLx comment repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, comment: &Comment) -> Result<Comment> {
        match backend(&self.pool)? {
            Backend::Sqlite(pool) => create_comment_sqlite(pool, comment).await,
            Backend::Mysql(pool) => create_comment_mysql(pool, comment).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        match backend(&self.pool)? {
            Backend::Sqlite(pool) => get_comment_sqlite(pool, id, None).await,
            Backend::Mysql(pool) => get_comment_mysql(pool, id, None).await,
        }
    }

    async fn get_for_author(&self, id: i64, author_id: i64) -> Result<Option<Comment>> {
        match backend(&self.pool)? {
            Backend::Sqlite(pool) => get_comment_sqlite(pool, id, Some(author_id)).await,
            Backend::Mysql(pool) => get_comment_mysql(pool, id, Some(author_id)).await,
        }
    }

    async fn list_by_news(&self, news_id: i64) -> Result<Vec<CommentWithAuthor>> {
        match backend(&self.pool)? {
            Backend::Sqlite(pool) => list_comments_by_news_sqlite(pool, news_id).await,
            Backend::Mysql(pool) => list_comments_by_news_mysql(pool, news_id).await,
        }
    }

    async fn update_text_for_author(&self, id: i64, author_id: i64, text: &str) -> Result<bool> {
        let query = "UPDATE comments SET text = ? WHERE id = ? AND author_id = ?";
        let affected = match backend(&self.pool)? {
            Backend::Sqlite(pool) => sqlx::query(query)
                .bind(text)
                .bind(id)
                .bind(author_id)
                .execute(pool)
                .await
                .map(|r| r.rows_affected()),
            Backend::Mysql(pool) => sqlx::query(query)
                .bind(text)
                .bind(id)
                .bind(author_id)
                .execute(pool)
                .await
                .map(|r| r.rows_affected()),
        }
        .context("Failed to update comment")?;

        Ok(affected > 0)
    }

    async fn delete_for_author(&self, id: i64, author_id: i64) -> Result<bool> {
        let query = "DELETE FROM comments WHERE id = ? AND author_id = ?";
        let affected = match backend(&self.pool)? {
            Backend::Sqlite(pool) => sqlx::query(query)
                .bind(id)
                .bind(author_id)
                .execute(pool)
                .await
                .map(|r| r.rows_affected()),
            Backend::Mysql(pool) => sqlx::query(query)
                .bind(id)
                .bind(author_id)
                .execute(pool)
                .await
                .map(|r| r.rows_affected()),
        }
        .context("Failed to delete comment")?;

        Ok(affected > 0)
    }

    async fn count(&self) -> Result<i64> {
        let query = "SELECT COUNT(*) as count FROM comments";
        let total = match backend(&self.pool)? {
            Backend::Sqlite(pool) => sqlx::query(query)
                .fetch_one(pool)
                .await
                .map(|row| row.get::<i64, _>("count")),
            Backend::Mysql(pool) => sqlx::query(query)
                .fetch_one(pool)
                .await
                .map(|row| row.get::<i64, _>("count")),
        }
        .context("Failed to count comments")?;

        Ok(total)
    }
}

const INSERT_COMMENT: &str = r#"
    INSERT INTO comments (news_id, author_id, text, created)
    VALUES (?, ?, ?, ?)
"#;

const SELECT_BY_NEWS: &str = r#"
    SELECT c.id, c.news_id, c.author_id, c.text, c.created, u.username AS author
    FROM comments c
    JOIN users u ON u.id = c.author_id
    WHERE c.news_id = ?
    ORDER BY c.created ASC, c.id ASC
"#;

/// Single-comment select, optionally restricted to its author
fn single_comment_query(owned: bool) -> String {
    let mut query =
        String::from("SELECT id, news_id, author_id, text, created FROM comments WHERE id = ?");
    if owned {
        query.push_str(" AND author_id = ?");
    }
    query
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_comment_sqlite(pool: &SqlitePool, comment: &Comment) -> Result<Comment> {
    let result = sqlx::query(INSERT_COMMENT)
        .bind(comment.news_id)
        .bind(comment.author_id)
        .bind(&comment.text)
        .bind(comment.created)
        .execute(pool)
        .await
        .context("Failed to create comment")?;

    Ok(Comment {
        id: result.last_insert_rowid(),
        ..comment.clone()
    })
}

async fn get_comment_sqlite(
    pool: &SqlitePool,
    id: i64,
    author_id: Option<i64>,
) -> Result<Option<Comment>> {
    let query = single_comment_query(author_id.is_some());
    let mut q = sqlx::query(&query).bind(id);
    if let Some(author_id) = author_id {
        q = q.bind(author_id);
    }

    let row = q
        .fetch_optional(pool)
        .await
        .context("Failed to get comment")?;

    row.map(|row| row_to_comment_sqlite(&row)).transpose()
}

async fn list_comments_by_news_sqlite(
    pool: &SqlitePool,
    news_id: i64,
) -> Result<Vec<CommentWithAuthor>> {
    let rows = sqlx::query(SELECT_BY_NEWS)
        .bind(news_id)
        .fetch_all(pool)
        .await
        .context("Failed to list comments")?;

    rows.iter()
        .map(|row| {
            Ok(CommentWithAuthor {
                comment: row_to_comment_sqlite(row)?,
                author: row.try_get("author")?,
            })
        })
        .collect()
}

fn row_to_comment_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Comment> {
    Ok(Comment {
        id: row.try_get("id")?,
        news_id: row.try_get("news_id")?,
        author_id: row.try_get("author_id")?,
        text: row.try_get("text")?,
        created: row.try_get("created")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_comment_mysql(pool: &MySqlPool, comment: &Comment) -> Result<Comment> {
    let result = sqlx::query(INSERT_COMMENT)
        .bind(comment.news_id)
        .bind(comment.author_id)
        .bind(&comment.text)
        .bind(comment.created)
        .execute(pool)
        .await
        .context("Failed to create comment")?;

    Ok(Comment {
        id: result.last_insert_id() as i64,
        ..comment.clone()
    })
}

async fn get_comment_mysql(
    pool: &MySqlPool,
    id: i64,
    author_id: Option<i64>,
) -> Result<Option<Comment>> {
    let query = single_comment_query(author_id.is_some());
    let mut q = sqlx::query(&query).bind(id);
    if let Some(author_id) = author_id {
        q = q.bind(author_id);
    }

    let row = q
        .fetch_optional(pool)
        .await
        .context("Failed to get comment")?;

    row.map(|row| row_to_comment_mysql(&row)).transpose()
}

async fn list_comments_by_news_mysql(
    pool: &MySqlPool,
    news_id: i64,
) -> Result<Vec<CommentWithAuthor>> {
    let rows = sqlx::query(SELECT_BY_NEWS)
        .bind(news_id)
        .fetch_all(pool)
        .await
        .context("Failed to list comments")?;

    rows.iter()
        .map(|row| {
            Ok(CommentWithAuthor {
                comment: row_to_comment_mysql(row)?,
                author: row.try_get("author")?,
            })
        })
        .collect()
}

fn row_to_comment_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Comment> {
    Ok(Comment {
        id: row.try_get("id")?,
        news_id: row.try_get("news_id")?,
        author_id: row.try_get("author_id")?,
        text: row.try_get("text")?,
        created: row.try_get("created")?,
    })
}
