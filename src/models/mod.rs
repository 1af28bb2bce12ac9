//! Data models
//!
//! Entities shared by the News and Notes sections:
//! - Database entities (User, Session, News, Comment, Note)
//! - Pagination helpers for list pages

mod comment;
mod news;
mod note;
mod pagination;
mod session;
mod user;

pub use comment::{Comment, CommentWithAuthor};
pub use news::News;
pub use note::{Note, SLUG_MAX_LENGTH, TITLE_MAX_LENGTH};
pub use pagination::{ListParams, PagedResult};
pub use session::Session;
pub use user::{User, UNUSABLE_PASSWORD};
