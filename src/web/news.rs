//! News section handlers
//!
//! Public home page and news detail, plus comment creation, editing and
//! deletion. Comment mutations are scoped to their author.

use axum::{
    extract::{Path, State},
    response::Response,
    Form,
};
use serde::Serialize;

use super::error::WebError;
use super::middleware::{found, AppState, CurrentUser, OptionalUser};
use super::render::{FormView, Page};
use crate::models::{Comment, CommentWithAuthor, News};
use crate::services::{CommentForm, CommentServiceError};

#[derive(Serialize)]
struct HomeContext {
    object_list: Vec<News>,
}

#[derive(Serialize)]
struct DetailContext {
    news: News,
    comments: Vec<CommentWithAuthor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    form: Option<FormView<CommentForm>>,
}

#[derive(Serialize)]
struct CommentContext {
    comment: Comment,
    #[serde(skip_serializing_if = "Option::is_none")]
    form: Option<FormView<CommentForm>>,
}

/// Integer path segment; anything else is an unknown page
pub(crate) fn parse_id(raw: &str) -> Result<i64, WebError> {
    raw.parse::<i64>().map_err(|_| WebError::NotFound)
}

fn comments_anchor(news_id: i64) -> String {
    format!("/news/{}/#comments", news_id)
}

/// GET / - Latest news
pub async fn home(page: Page, State(state): State<AppState>) -> Result<Response, WebError> {
    let object_list = state.news_service.home().await?;
    page.render("news/home.html", &HomeContext { object_list })
}

/// GET /news/{id}/ - News item with comments
///
/// The comment form is only offered to logged-in users.
pub async fn detail(
    page: Page,
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let id = parse_id(&id)?;
    let detail = state.news_service.detail(id).await?;

    page.render(
        "news/detail.html",
        &DetailContext {
            news: detail.news,
            comments: detail.comments,
            form: user.map(|_| FormView::new(CommentForm::default())),
        },
    )
}

/// POST /news/{id}/ - Submit a comment
pub async fn add_comment(
    page: Page,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Form(form): Form<CommentForm>,
) -> Result<Response, WebError> {
    let id = parse_id(&id)?;

    match state.comment_service.create(id, user.id, &form).await {
        Ok(_) => Ok(found(&comments_anchor(id))),
        Err(CommentServiceError::Validation(errors)) => {
            let detail = state.news_service.detail(id).await?;
            page.render(
                "news/detail.html",
                &DetailContext {
                    news: detail.news,
                    comments: detail.comments,
                    form: Some(FormView::invalid(form, errors)),
                },
            )
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /edit_comment/{id}/ - Comment edit form
pub async fn edit_comment_page(
    page: Page,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let comment = state
        .comment_service
        .get_for_author(parse_id(&id)?, user.id)
        .await?;
    let form = FormView::new(CommentForm::new(comment.text.clone()));

    page.render(
        "news/edit.html",
        &CommentContext {
            comment,
            form: Some(form),
        },
    )
}

/// POST /edit_comment/{id}/ - Save comment text
pub async fn edit_comment(
    page: Page,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Form(form): Form<CommentForm>,
) -> Result<Response, WebError> {
    let id = parse_id(&id)?;

    match state.comment_service.update(id, user.id, &form).await {
        Ok(comment) => Ok(found(&comments_anchor(comment.news_id))),
        Err(CommentServiceError::Validation(errors)) => {
            let comment = state.comment_service.get_for_author(id, user.id).await?;
            page.render(
                "news/edit.html",
                &CommentContext {
                    comment,
                    form: Some(FormView::invalid(form, errors)),
                },
            )
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /delete_comment/{id}/ - Deletion confirmation
pub async fn delete_comment_page(
    page: Page,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let comment = state
        .comment_service
        .get_for_author(parse_id(&id)?, user.id)
        .await?;

    page.render("news/delete.html", &CommentContext { comment, form: None })
}

/// POST /delete_comment/{id}/ - Delete the comment
pub async fn delete_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let comment = state
        .comment_service
        .delete(parse_id(&id)?, user.id)
        .await?;
    Ok(found(&comments_anchor(comment.news_id)))
}
