//! Note creation, slug rules, editing and deletion

mod common;

use axum::http::StatusCode;
use common::*;
use newsnotes::db::repositories::NoteRepository;
use newsnotes::services::{slugify, SLUG_WARNING};
use serde_json::{json, Value};

const NEW_TITLE: &str = "Новый заголовок";
const NEW_TEXT: &str = "Новый текст";
const NEW_SLUG: &str = "new-note";

fn form_data() -> Value {
    json!({ "title": NEW_TITLE, "text": NEW_TEXT, "slug": NEW_SLUG })
}

#[tokio::test]
async fn anonymous_user_cannot_create_note() {
    let app = TestApp::new().await;

    let response = app.post("/notes/add/", Actor::Anonymous, &form_data()).await;

    assert_eq!(response.status_code(), StatusCode::FOUND);
    assert_eq!(location(&response), login_redirect("/notes/add/"));
    assert_eq!(app.note_count().await, 0);
}

#[tokio::test]
async fn authorized_user_can_create_note() {
    let app = TestApp::new().await;
    let author = app.user("Автор").await;

    let response = app.post("/notes/add/", &author, &form_data()).await;

    assert_eq!(response.status_code(), StatusCode::FOUND);
    assert_eq!(location(&response), "/notes/done/");
    assert_eq!(app.note_count().await, 1);
    let note = app
        .note_repo()
        .get_by_slug(NEW_SLUG)
        .await
        .expect("query")
        .expect("note");
    assert_eq!(
        (note.title.as_str(), note.text.as_str(), note.author_id),
        (NEW_TITLE, NEW_TEXT, author.id())
    );
}

#[tokio::test]
async fn cannot_create_note_with_duplicate_slug() {
    let app = TestApp::new().await;
    let author = app.user("Автор").await;
    let not_author = app.user("Не автор").await;
    let existing = app.note(&author).await;
    let data = json!({
        "title": "Дубликат заметки",
        "text": "Текст дубликата заметки",
        "slug": existing.slug,
    });

    for user in [&author, &not_author, &author] {
        let response = app.post_json("/notes/add/", user, &data).await;

        response.assert_status_ok();
        let context = response.json::<Value>();
        assert_eq!(
            context["form"]["errors"]["slug"][0],
            format!("{}{}", existing.slug, SLUG_WARNING)
        );
    }
    assert_eq!(app.note_count().await, 1);
}

#[tokio::test]
async fn empty_slug_is_derived_from_title() {
    let app = TestApp::new().await;
    let author = app.user("Автор").await;
    let data = json!({ "title": "Заголовок", "text": NEW_TEXT, "slug": "" });

    let response = app.post("/notes/add/", &author, &data).await;

    assert_eq!(response.status_code(), StatusCode::FOUND);
    let note = app
        .note_repo()
        .get_by_slug("zagolovok")
        .await
        .expect("query")
        .expect("note with derived slug");
    assert_eq!(note.slug, slugify("Заголовок"));
}

#[tokio::test]
async fn derived_slug_drops_punctuation_cleanly() {
    let app = TestApp::new().await;
    let author = app.user("Автор").await;

    for (title, expected) in [
        ("Заметка — важная", "zametka-vazhnaya"),
        ("!!! Привет", "privet"),
        ("Итоги года ?", "itogi-goda"),
    ] {
        let data = json!({ "title": title, "text": NEW_TEXT, "slug": "" });

        let response = app.post("/notes/add/", &author, &data).await;

        assert_eq!(response.status_code(), StatusCode::FOUND, "title {}", title);
        let note = app
            .note_repo()
            .get_by_slug(expected)
            .await
            .expect("query")
            .unwrap_or_else(|| panic!("no note with slug {}", expected));
        assert_eq!(note.title, title);
    }
    assert_eq!(app.note_count().await, 3);
}

#[tokio::test]
async fn missing_fields_are_reported() {
    let app = TestApp::new().await;
    let author = app.user("Автор").await;

    let response = app
        .post_json("/notes/add/", &author, &json!({ "title": "", "text": "", "slug": "плохой slug" }))
        .await;

    response.assert_status_ok();
    let errors = &response.json::<Value>()["form"]["errors"];
    for field in ["title", "text", "slug"] {
        assert!(errors[field].is_array(), "no error for {}", field);
    }
    assert_eq!(app.note_count().await, 0);
}

#[tokio::test]
async fn reserved_slug_is_rejected() {
    let app = TestApp::new().await;
    let author = app.user("Автор").await;

    let response = app
        .post_json("/notes/add/", &author, &json!({ "title": "Add", "text": NEW_TEXT, "slug": "" }))
        .await;

    response.assert_status_ok();
    assert!(response.json::<Value>()["form"]["errors"]["slug"].is_array());
    assert_eq!(app.note_count().await, 0);
}

#[tokio::test]
async fn author_can_edit_note() {
    let app = TestApp::new().await;
    let author = app.user("Автор").await;
    let note = app.note(&author).await;

    let response = app.post(&note_edit_url(&note.slug), &author, &form_data()).await;

    assert_eq!(response.status_code(), StatusCode::FOUND);
    assert_eq!(location(&response), "/notes/done/");
    let edited = app.reload_note(note.id).await.expect("note");
    assert_eq!(
        (edited.title.as_str(), edited.text.as_str(), edited.slug.as_str(), edited.author_id),
        (NEW_TITLE, NEW_TEXT, NEW_SLUG, note.author_id)
    );
}

#[tokio::test]
async fn author_can_keep_slug_when_editing() {
    let app = TestApp::new().await;
    let author = app.user("Автор").await;
    let note = app.note(&author).await;
    let data = json!({ "title": NEW_TITLE, "text": NEW_TEXT, "slug": note.slug });

    let response = app.post(&note_edit_url(&note.slug), &author, &data).await;

    assert_eq!(response.status_code(), StatusCode::FOUND);
    let edited = app.reload_note(note.id).await.expect("note");
    assert_eq!((edited.title.as_str(), edited.slug.as_str()), (NEW_TITLE, NOTE_SLUG));
}

#[tokio::test]
async fn user_cannot_edit_others_note() {
    let app = TestApp::new().await;
    let author = app.user("Автор").await;
    let not_author = app.user("Не автор").await;
    let note = app.note(&author).await;

    let response = app
        .post(&note_edit_url(&note.slug), &not_author, &form_data())
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(app.reload_note(note.id).await, Some(note));
}

#[tokio::test]
async fn author_can_delete_note() {
    let app = TestApp::new().await;
    let author = app.user("Автор").await;
    let note = app.note(&author).await;
    let before = app.note_count().await;

    let response = app.delete(&note_delete_url(&note.slug), &author).await;

    assert_eq!(response.status_code(), StatusCode::FOUND);
    assert_eq!(location(&response), "/notes/done/");
    assert!(app.reload_note(note.id).await.is_none());
    assert_eq!(before - app.note_count().await, 1);
}

#[tokio::test]
async fn author_can_delete_note_with_post() {
    let app = TestApp::new().await;
    let author = app.user("Автор").await;
    let note = app.note(&author).await;

    let response = app.post(&note_delete_url(&note.slug), &author, &json!({})).await;

    assert_eq!(response.status_code(), StatusCode::FOUND);
    assert_eq!(app.note_count().await, 0);
}

#[tokio::test]
async fn user_cannot_delete_others_note() {
    let app = TestApp::new().await;
    let author = app.user("Автор").await;
    let not_author = app.user("Не автор").await;
    let note = app.note(&author).await;

    let response = app.delete(&note_delete_url(&note.slug), &not_author).await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(app.note_count().await, 1);
    assert!(app.reload_note(note.id).await.is_some());
}
