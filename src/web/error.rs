//! Web error handling
//!
//! Service errors become `WebError`, which turns into a bare status
//! response tagged with `ErrorPage`. The `error_pages` middleware then
//! replaces the body with the matching error template (or JSON).

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::middleware::AppState;
use super::render::Page;
use crate::services::{
    CommentServiceError, FormErrors, NewsServiceError, NoteServiceError, UserServiceError,
};
use crate::templates::TemplateError;

/// Errors a handler can end with
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("Page not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Marks a response produced by `WebError`
#[derive(Debug, Clone)]
pub struct ErrorPage {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebError::NotFound => StatusCode::NOT_FOUND,
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::Internal(e) => {
                tracing::error!(error = ?e, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        // Internal details stay in the log
        let message = match &self {
            WebError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let mut response = (status, message.clone()).into_response();
        response
            .extensions_mut()
            .insert(ErrorPage { status, message });
        response
    }
}

/// Form handlers re-render invalid input with 200, so validation errors
/// never reach this conversion on a working route. One that does is a bug.
fn unhandled_validation(errors: FormErrors) -> WebError {
    WebError::Internal(anyhow::anyhow!("Unhandled form validation: {}", errors))
}

impl From<NewsServiceError> for WebError {
    fn from(e: NewsServiceError) -> Self {
        match e {
            NewsServiceError::NotFound(_) => WebError::NotFound,
            NewsServiceError::InternalError(e) => WebError::Internal(e),
        }
    }
}

impl From<CommentServiceError> for WebError {
    fn from(e: CommentServiceError) -> Self {
        match e {
            CommentServiceError::NotFound => WebError::NotFound,
            CommentServiceError::Validation(errors) => unhandled_validation(errors),
            CommentServiceError::InternalError(e) => WebError::Internal(e),
        }
    }
}

impl From<NoteServiceError> for WebError {
    fn from(e: NoteServiceError) -> Self {
        match e {
            NoteServiceError::NotFound(_) => WebError::NotFound,
            NoteServiceError::Validation(errors) => unhandled_validation(errors),
            NoteServiceError::InternalError(e) => WebError::Internal(e),
        }
    }
}

impl From<UserServiceError> for WebError {
    fn from(e: UserServiceError) -> Self {
        match e {
            UserServiceError::AuthenticationError => {
                WebError::BadRequest("Authentication failed".to_string())
            }
            UserServiceError::Validation(errors) => unhandled_validation(errors),
            UserServiceError::InternalError(e) => WebError::Internal(e),
        }
    }
}

impl From<TemplateError> for WebError {
    fn from(e: TemplateError) -> Self {
        WebError::Internal(e.into())
    }
}

/// Router fallback for unknown paths
pub async fn not_found() -> WebError {
    WebError::NotFound
}

/// Error page middleware
///
/// Renders `errors/404.html` or `errors/500.html` in place of the plain body
/// of a `WebError` response. JSON clients get `{"status", "detail"}`.
pub async fn error_pages(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let page = Page::new(
        state.templates.clone(),
        request.headers(),
        request.uri(),
        request.extensions(),
    );

    let response = next.run(request).await;
    let Some(error) = response.extensions().get::<ErrorPage>().cloned() else {
        return response;
    };

    if page.wants_json() {
        let body = json!({ "status": error.status.as_u16(), "detail": error.message });
        return (error.status, Json(body)).into_response();
    }

    let template = match error.status {
        StatusCode::NOT_FOUND => "errors/404.html",
        StatusCode::INTERNAL_SERVER_ERROR => "errors/500.html",
        _ => return response,
    };
    match page.render_status(error.status, template, &json!({ "detail": error.message })) {
        Ok(rendered) => rendered,
        Err(e) => {
            tracing::error!(error = %e, template, "Failed to render error page");
            response
        }
    }
}
