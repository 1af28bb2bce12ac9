//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity.
//!
//! Lookups that back owner-only pages take the viewer's id as part of the
//! predicate (`... AND author_id = ?`), so a row owned by someone else is
//! indistinguishable from a missing one.

pub mod comment;
pub mod news;
pub mod note;
pub mod session;
pub mod user;

pub use comment::{CommentRepository, SqlxCommentRepository};
pub use news::{NewsRepository, SqlxNewsRepository};
pub use note::{NoteRepository, SqlxNoteRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use user::{SqlxUserRepository, UserRepository};

use anyhow::{anyhow, Result};
use sqlx::{MySqlPool, SqlitePool};

use crate::db::DynDatabasePool;

/// Concrete pool borrowed from a [`DynDatabasePool`]
pub(crate) enum Backend<'a> {
    Sqlite(&'a SqlitePool),
    Mysql(&'a MySqlPool),
}

/// Resolve the concrete backend behind a pool
pub(crate) fn backend(pool: &DynDatabasePool) -> Result<Backend<'_>> {
    if let Some(sqlite) = pool.as_sqlite() {
        return Ok(Backend::Sqlite(sqlite));
    }
    if let Some(mysql) = pool.as_mysql() {
        return Ok(Backend::Mysql(mysql));
    }
    Err(anyhow!("Database pool exposes neither SQLite nor MySQL"))
}

/// Whether an error chain bottoms out in a unique-constraint violation
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<sqlx::Error>()
            .and_then(|e| e.as_database_error())
            .map(|db| db.is_unique_violation())
            .unwrap_or(false)
    })
}
