//! Database layer
//!
//! This module provides database abstraction for the newsnotes server.
//! It supports:
//! - SQLite (default, single file or in-memory for tests)
//! - MySQL
//!
//! The database driver is selected based on configuration.
//!
//! # Usage
//!
//! ```ignore
//! use newsnotes::config::DatabaseConfig;
//! use newsnotes::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};
