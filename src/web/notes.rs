//! Notes section handlers
//!
//! Every route here sits behind the login-required gate. Notes are looked
//! up by slug together with the viewer's id, so someone else's note is
//! indistinguishable from a missing one.

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Form,
};
use serde::{Deserialize, Serialize};

use super::error::WebError;
use super::middleware::{found, AppState, CurrentUser};
use super::render::{FormView, Page};
use crate::models::Note;
use crate::services::{NoteForm, NoteServiceError};

/// Where every successful note mutation lands
pub const SUCCESS_URL: &str = "/notes/done/";

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
}

impl ListQuery {
    /// Requested page, 1 when absent. Anything but a positive integer is a
    /// missing page.
    pub fn page_number(&self) -> Result<u32, WebError> {
        match self.page.as_deref().map(str::trim) {
            None | Some("") => Ok(1),
            Some(raw) => match raw.parse::<u32>() {
                Ok(page) if page >= 1 => Ok(page),
                _ => Err(WebError::NotFound),
            },
        }
    }
}

#[derive(Serialize)]
struct ListContext {
    object_list: Vec<Note>,
    page: u32,
    per_page: u32,
    total: i64,
    total_pages: u32,
}

#[derive(Serialize)]
struct NoteContext {
    note: Note,
}

#[derive(Serialize)]
struct FormContext {
    form: FormView<NoteForm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<Note>,
}

#[derive(Serialize)]
struct EmptyContext {}

/// GET /notes/ - The viewer's notes, newest first
pub async fn list(
    page: Page,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListQuery>,
) -> Result<Response, WebError> {
    let result = state
        .note_service
        .list(user.id, query.page_number()?)
        .await?;
    let total_pages = result.total_pages();

    page.render(
        "notes/list.html",
        &ListContext {
            object_list: result.items,
            page: result.page,
            per_page: result.per_page,
            total: result.total,
            total_pages,
        },
    )
}

/// GET /notes/add/ - Empty note form
pub async fn add_page(page: Page, CurrentUser(_): CurrentUser) -> Result<Response, WebError> {
    page.render(
        "notes/form.html",
        &FormContext {
            form: FormView::new(NoteForm::default()),
            note: None,
        },
    )
}

/// POST /notes/add/ - Create a note
pub async fn add(
    page: Page,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<NoteForm>,
) -> Result<Response, WebError> {
    match state.note_service.create(user.id, &form).await {
        Ok(_) => Ok(found(SUCCESS_URL)),
        Err(NoteServiceError::Validation(errors)) => page.render(
            "notes/form.html",
            &FormContext {
                form: FormView::invalid(form, errors),
                note: None,
            },
        ),
        Err(e) => Err(e.into()),
    }
}

/// GET /notes/done/ - Success page
pub async fn success(page: Page, CurrentUser(_): CurrentUser) -> Result<Response, WebError> {
    page.render("notes/success.html", &EmptyContext {})
}

/// GET /notes/{slug}/ - A single note
pub async fn detail(
    page: Page,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(slug): Path<String>,
) -> Result<Response, WebError> {
    let note = state.note_service.get_for_author(&slug, user.id).await?;
    page.render("notes/detail.html", &NoteContext { note })
}

/// GET /notes/{slug}/edit/ - Form filled with the note's fields
pub async fn edit_page(
    page: Page,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(slug): Path<String>,
) -> Result<Response, WebError> {
    let note = state.note_service.get_for_author(&slug, user.id).await?;
    let form = NoteForm::new(note.title.clone(), note.text.clone(), note.slug.clone());

    page.render(
        "notes/form.html",
        &FormContext {
            form: FormView::new(form),
            note: Some(note),
        },
    )
}

/// POST /notes/{slug}/edit/ - Save the note
pub async fn edit(
    page: Page,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(slug): Path<String>,
    Form(form): Form<NoteForm>,
) -> Result<Response, WebError> {
    match state.note_service.update(&slug, user.id, &form).await {
        Ok(_) => Ok(found(SUCCESS_URL)),
        Err(NoteServiceError::Validation(errors)) => {
            let note = state.note_service.get_for_author(&slug, user.id).await?;
            page.render(
                "notes/form.html",
                &FormContext {
                    form: FormView::invalid(form, errors),
                    note: Some(note),
                },
            )
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /notes/{slug}/delete/ - Deletion confirmation
pub async fn delete_page(
    page: Page,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(slug): Path<String>,
) -> Result<Response, WebError> {
    let note = state.note_service.get_for_author(&slug, user.id).await?;
    page.render("notes/delete.html", &NoteContext { note })
}

/// POST or DELETE /notes/{slug}/delete/ - Delete the note
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(slug): Path<String>,
) -> Result<Response, WebError> {
    state.note_service.delete(&slug, user.id).await?;
    Ok(found(SUCCESS_URL))
}
