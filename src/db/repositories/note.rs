//! Note repository
//!
//! Database operations for private notes.
//!
//! This module provides:
//! - `NoteRepository` trait defining the interface for note data access
//! - `SqlxNoteRepository` implementing the trait for SQLite and MySQL
//!
//! Slugs are unique across the whole table. Every read used by the notes
//! pages goes through an `_for_author` method so that other users' notes
//! are never visible.

use super::{backend, Backend};
use crate::db::DynDatabasePool;
use crate::models::{ListParams, Note, PagedResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Note repository trait
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Create a new note
    async fn create(&self, note: &Note) -> Result<Note>;

    /// Get note by ID regardless of author
    async fn get_by_id(&self, id: i64) -> Result<Option<Note>>;

    /// Get note by slug regardless of author
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Note>>;

    /// Get note by slug only if `author_id` wrote it
    async fn get_by_slug_for_author(&self, slug: &str, author_id: i64) -> Result<Option<Note>>;

    /// One page of an author's notes, newest first
    async fn list_by_author(&self, author_id: i64, params: &ListParams)
        -> Result<PagedResult<Note>>;

    /// Whether any note other than `exclude_id` already uses `slug`
    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool>;

    /// Overwrite title, text and slug of a note owned by `note.author_id`
    async fn update_for_author(&self, note: &Note) -> Result<bool>;

    /// Delete a note owned by `author_id`
    async fn delete_for_author(&self, id: i64, author_id: i64) -> Result<bool>;

    /// Count all notes
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based note repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxNoteRepository {
    pool: DynDatabasePool,
}

impl SqlxNoteRepository {
    /// Create a new SQLx note repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn NoteRepository> {
        Arc::new(Self::new(pool))
    }
}

const NOTE_COLUMNS: &str = "id, title, text, slug, author_id, created_at";

#[async_trait]
impl NoteRepository for SqlxNoteRepository {
    async fn create(&self, note: &Note) -> Result<Note> {
        match backend(&self.pool)? {
            Backend::Sqlite(pool) => create_note_sqlite(pool, note).await,
            Backend::Mysql(pool) => create_note_mysql(pool, note).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Note>> {
        let query = format!("SELECT {} FROM notes WHERE id = ?", NOTE_COLUMNS);
        match backend(&self.pool)? {
            Backend::Sqlite(pool) => sqlx::query(&query)
                .bind(id)
                .fetch_optional(pool)
                .await
                .context("Failed to get note by ID")?
                .map(|row| row_to_note_sqlite(&row))
                .transpose(),
            Backend::Mysql(pool) => sqlx::query(&query)
                .bind(id)
                .fetch_optional(pool)
                .await
                .context("Failed to get note by ID")?
                .map(|row| row_to_note_mysql(&row))
                .transpose(),
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Note>> {
        let query = format!("SELECT {} FROM notes WHERE slug = ?", NOTE_COLUMNS);
        match backend(&self.pool)? {
            Backend::Sqlite(pool) => sqlx::query(&query)
                .bind(slug)
                .fetch_optional(pool)
                .await
                .context("Failed to get note by slug")?
                .map(|row| row_to_note_sqlite(&row))
                .transpose(),
            Backend::Mysql(pool) => sqlx::query(&query)
                .bind(slug)
                .fetch_optional(pool)
                .await
                .context("Failed to get note by slug")?
                .map(|row| row_to_note_mysql(&row))
                .transpose(),
        }
    }

    async fn get_by_slug_for_author(&self, slug: &str, author_id: i64) -> Result<Option<Note>> {
        let query = format!(
            "SELECT {} FROM notes WHERE slug = ? AND author_id = ?",
            NOTE_COLUMNS
        );
        match backend(&self.pool)? {
            Backend::Sqlite(pool) => sqlx::query(&query)
                .bind(slug)
                .bind(author_id)
                .fetch_optional(pool)
                .await
                .context("Failed to get note by slug")?
                .map(|row| row_to_note_sqlite(&row))
                .transpose(),
            Backend::Mysql(pool) => sqlx::query(&query)
                .bind(slug)
                .bind(author_id)
                .fetch_optional(pool)
                .await
                .context("Failed to get note by slug")?
                .map(|row| row_to_note_mysql(&row))
                .transpose(),
        }
    }

    async fn list_by_author(
        &self,
        author_id: i64,
        params: &ListParams,
    ) -> Result<PagedResult<Note>> {
        match backend(&self.pool)? {
            Backend::Sqlite(pool) => list_notes_by_author_sqlite(pool, author_id, params).await,
            Backend::Mysql(pool) => list_notes_by_author_mysql(pool, author_id, params).await,
        }
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
        // Ids start at 1, so 0 excludes nothing
        let exclude_id = exclude_id.unwrap_or(0);
        let query = "SELECT COUNT(*) as count FROM notes WHERE slug = ? AND id <> ?";
        let matches = match backend(&self.pool)? {
            Backend::Sqlite(pool) => sqlx::query(query)
                .bind(slug)
                .bind(exclude_id)
                .fetch_one(pool)
                .await
                .map(|row| row.get::<i64, _>("count")),
            Backend::Mysql(pool) => sqlx::query(query)
                .bind(slug)
                .bind(exclude_id)
                .fetch_one(pool)
                .await
                .map(|row| row.get::<i64, _>("count")),
        }
        .context("Failed to check slug")?;

        Ok(matches > 0)
    }

    async fn update_for_author(&self, note: &Note) -> Result<bool> {
        let query = r#"
            UPDATE notes
            SET title = ?, text = ?, slug = ?
            WHERE id = ? AND author_id = ?
        "#;
        let affected = match backend(&self.pool)? {
            Backend::Sqlite(pool) => sqlx::query(query)
                .bind(&note.title)
                .bind(&note.text)
                .bind(&note.slug)
                .bind(note.id)
                .bind(note.author_id)
                .execute(pool)
                .await
                .map(|r| r.rows_affected()),
            Backend::Mysql(pool) => sqlx::query(query)
                .bind(&note.title)
                .bind(&note.text)
                .bind(&note.slug)
                .bind(note.id)
                .bind(note.author_id)
                .execute(pool)
                .await
                .map(|r| r.rows_affected()),
        }
        .context("Failed to update note")?;

        Ok(affected > 0)
    }

    async fn delete_for_author(&self, id: i64, author_id: i64) -> Result<bool> {
        let query = "DELETE FROM notes WHERE id = ? AND author_id = ?";
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
        .context("Failed to delete note")?;

        Ok(affected > 0)
    }

    async fn count(&self) -> Result<i64> {
        let query = "SELECT COUNT(*) as count FROM notes";
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
        .context("Failed to count notes")?;

        Ok(total)
    }
}

const INSERT_NOTE: &str = r#"
    INSERT INTO notes (title, text, slug, author_id, created_at)
    VALUES (?, ?, ?, ?, ?)
"#;

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_note_sqlite(pool: &SqlitePool, note: &Note) -> Result<Note> {
    let result = sqlx::query(INSERT_NOTE)
        .bind(&note.title)
        .bind(&note.text)
        .bind(&note.slug)
        .bind(note.author_id)
        .bind(note.created_at)
        .execute(pool)
        .await
        .context("Failed to create note")?;

    Ok(Note {
        id: result.last_insert_rowid(),
        ..note.clone()
    })
}

async fn list_notes_by_author_sqlite(
    pool: &SqlitePool,
    author_id: i64,
    params: &ListParams,
) -> Result<PagedResult<Note>> {
    let query = format!(
        "SELECT {} FROM notes WHERE author_id = ? ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        NOTE_COLUMNS
    );
    let rows = sqlx::query(&query)
        .bind(author_id)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await
        .context("Failed to list notes")?;

    let notes = rows
        .iter()
        .map(row_to_note_sqlite)
        .collect::<Result<Vec<_>>>()?;

    let total: i64 = sqlx::query("SELECT COUNT(*) as count FROM notes WHERE author_id = ?")
        .bind(author_id)
        .fetch_one(pool)
        .await
        .context("Failed to count notes")?
        .get("count");

    Ok(PagedResult::new(notes, total, params))
}

fn row_to_note_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Note> {
    Ok(Note {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        text: row.try_get("text")?,
        slug: row.try_get("slug")?,
        author_id: row.try_get("author_id")?,
        created_at: row.try_get("created_at")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_note_mysql(pool: &MySqlPool, note: &Note) -> Result<Note> {
    let result = sqlx::query(INSERT_NOTE)
        .bind(&note.title)
        .bind(&note.text)
        .bind(&note.slug)
        .bind(note.author_id)
        .bind(note.created_at)
        .execute(pool)
        .await
        .context("Failed to create note")?;

    Ok(Note {
        id: result.last_insert_id() as i64,
        ..note.clone()
    })
}

async fn list_notes_by_author_mysql(
    pool: &MySqlPool,
    author_id: i64,
    params: &ListParams,
) -> Result<PagedResult<Note>> {
    let query = format!(
        "SELECT {} FROM notes WHERE author_id = ? ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        NOTE_COLUMNS
    );
    let rows = sqlx::query(&query)
        .bind(author_id)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await
        .context("Failed to list notes")?;

    let notes = rows
        .iter()
        .map(row_to_note_mysql)
        .collect::<Result<Vec<_>>>()?;

    let total: i64 = sqlx::query("SELECT COUNT(*) as count FROM notes WHERE author_id = ?")
        .bind(author_id)
        .fetch_one(pool)
        .await
        .context("Failed to count notes")?
        .get("count");

    Ok(PagedResult::new(notes, total, params))
}

fn row_to_note_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Note> {
    Ok(Note {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        text: row.try_get("text")?,
        slug: row.try_get("slug")?,
        author_id: row.try_get("author_id")?,
        created_at: row.try_get("created_at")?,
    })
}
