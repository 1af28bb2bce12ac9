//! Services layer - Business logic
//!
//! This module contains the business logic behind the News, Notes and auth
//! sections. Services are responsible for:
//! - Implementing business rules (bad words, slug uniqueness, ownership)
//! - Coordinating between repositories
//! - Turning invalid input into field-level form errors

pub mod comment;
pub mod forms;
pub mod news;
pub mod note;
pub mod password;
pub mod slug;
pub mod user;

pub use comment::{CommentService, CommentServiceError};
pub use forms::{
    CommentForm, Form, FormErrors, LoginForm, NoteForm, SignupForm, BAD_WORDS, SLUG_WARNING,
    WARNING,
};
pub use news::{NewsDetail, NewsService, NewsServiceError};
pub use note::{NoteService, NoteServiceError};
pub use password::{hash_password, verify_password};
pub use slug::slugify;
pub use user::{UserService, UserServiceError};
