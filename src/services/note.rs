//! Note service
//!
//! Private notes: listing, creation, editing and deletion, all scoped to
//! the author. A blank slug is derived from the title; any slug must be
//! unused by every other note, whoever owns it.

use crate::db::repositories::{is_unique_violation, NoteRepository};
use crate::models::{ListParams, Note, PagedResult};
use crate::services::forms::{FormErrors, NoteForm, RESERVED_SLUGS, REQUIRED, SLUG_WARNING};
use crate::services::slug::slugify;
use anyhow::Context;
use std::sync::Arc;

/// Default number of notes per list page
pub const DEFAULT_NOTES_PAGE_SIZE: u32 = 10;

/// Error types for note service operations
#[derive(Debug, thiserror::Error)]
pub enum NoteServiceError {
    /// No note with this slug belongs to the user
    #[error("Note not found: {0}")]
    NotFound(String),

    /// Field-level validation failure
    #[error("Validation error: {0}")]
    Validation(FormErrors),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

fn duplicate_slug(slug: &str) -> NoteServiceError {
    NoteServiceError::Validation(FormErrors::single(
        "slug",
        format!("{}{}", slug, SLUG_WARNING),
    ))
}

pub struct NoteService {
    repo: Arc<dyn NoteRepository>,
    page_size: u32,
}

impl NoteService {
    pub fn new(repo: Arc<dyn NoteRepository>) -> Self {
        Self::with_page_size(repo, DEFAULT_NOTES_PAGE_SIZE)
    }

    pub fn with_page_size(repo: Arc<dyn NoteRepository>, page_size: u32) -> Self {
        Self { repo, page_size }
    }

    /// One page (1-based) of the author's notes, newest first
    pub async fn list(&self, author_id: i64, page: u32) -> Result<PagedResult<Note>, NoteServiceError> {
        let params = ListParams::new(page, self.page_size);
        let result = self
            .repo
            .list_by_author(author_id, &params)
            .await
            .context("Failed to list notes")?;
        Ok(result)
    }

    /// A note owned by `author_id`
    pub async fn get_for_author(&self, slug: &str, author_id: i64) -> Result<Note, NoteServiceError> {
        self.repo
            .get_by_slug_for_author(slug, author_id)
            .await
            .context("Failed to get note")?
            .ok_or_else(|| {
                tracing::debug!(slug, author_id, "Note not visible to user");
                NoteServiceError::NotFound(slug.to_string())
            })
    }

    pub async fn create(&self, author_id: i64, form: &NoteForm) -> Result<Note, NoteServiceError> {
        let (title, text, slug) = self.clean(form, None).await?;

        let note = Note::new(title, text, slug, author_id);
        let created = match self.repo.create(&note).await {
            Ok(created) => created,
            Err(e) if is_unique_violation(&e) => return Err(duplicate_slug(&note.slug)),
            Err(e) => return Err(e.context("Failed to create note").into()),
        };

        tracing::info!(note_id = created.id, slug = %created.slug, author_id, "Note created");
        Ok(created)
    }

    /// Overwrite title, text and slug. The author never changes.
    pub async fn update(
        &self,
        slug: &str,
        author_id: i64,
        form: &NoteForm,
    ) -> Result<Note, NoteServiceError> {
        let existing = self.get_for_author(slug, author_id).await?;
        let (title, text, new_slug) = self.clean(form, Some(existing.id)).await?;

        let note = Note {
            title,
            text,
            slug: new_slug,
            ..existing
        };
        let updated = match self.repo.update_for_author(&note).await {
            Ok(updated) => updated,
            Err(e) if is_unique_violation(&e) => return Err(duplicate_slug(&note.slug)),
            Err(e) => return Err(e.context("Failed to update note").into()),
        };
        if !updated {
            return Err(NoteServiceError::NotFound(slug.to_string()));
        }

        tracing::info!(note_id = note.id, slug = %note.slug, "Note updated");
        Ok(note)
    }

    /// Delete a note, returning the removed row
    pub async fn delete(&self, slug: &str, author_id: i64) -> Result<Note, NoteServiceError> {
        let existing = self.get_for_author(slug, author_id).await?;

        let deleted = self
            .repo
            .delete_for_author(existing.id, author_id)
            .await
            .context("Failed to delete note")?;
        if !deleted {
            return Err(NoteServiceError::NotFound(slug.to_string()));
        }

        tracing::info!(note_id = existing.id, slug, "Note deleted");
        Ok(existing)
    }

    /// Count all notes
    pub async fn count(&self) -> Result<i64, NoteServiceError> {
        Ok(self.repo.count().await.context("Failed to count notes")?)
    }

    /// Validate the form and settle the final slug.
    ///
    /// `current_id` is the note being edited, whose own slug does not count
    /// as taken.
    async fn clean(
        &self,
        form: &NoteForm,
        current_id: Option<i64>,
    ) -> Result<(String, String, String), NoteServiceError> {
        let draft = form.clean().map_err(|errors| {
            tracing::warn!(%errors, "Note form rejected");
            NoteServiceError::Validation(errors)
        })?;

        let slug = match draft.slug {
            Some(slug) => slug,
            None => slugify(&draft.title),
        };
        if slug.is_empty() {
            return Err(NoteServiceError::Validation(FormErrors::single("slug", REQUIRED)));
        }

        let taken = RESERVED_SLUGS.contains(&slug.as_str())
            || self
                .repo
                .slug_exists(&slug, current_id)
                .await
                .context("Failed to check slug")?;
        if taken {
            tracing::warn!(slug = %slug, "Slug already in use");
            return Err(duplicate_slug(&slug));
        }

        Ok((draft.title, draft.text, slug))
    }
}
