//! Comment creation, validation, editing and deletion

mod common;

use axum::http::StatusCode;
use common::*;
use newsnotes::db::repositories::CommentRepository;
use newsnotes::services::{BAD_WORDS, WARNING};
use serde_json::{json, Value};

const NEW_TEXT: &str = "Обновлённый комментарий";

#[tokio::test]
async fn anonymous_user_cant_create_comment() {
    let app = TestApp::new().await;
    let news = app.news().await;
    let url = news_detail_url(news.id);

    let response = app.post(&url, Actor::Anonymous, &json!({ "text": COMMENT_TEXT })).await;

    assert_eq!(response.status_code(), StatusCode::FOUND);
    assert_eq!(location(&response), login_redirect(&url));
    assert_eq!(app.comment_count().await, 0);
}

#[tokio::test]
async fn user_can_create_comment() {
    let app = TestApp::new().await;
    let author = app.user("Лев Толстой").await;
    let news = app.news().await;

    let response = app
        .post(&news_detail_url(news.id), &author, &json!({ "text": COMMENT_TEXT }))
        .await;

    assert_eq!(response.status_code(), StatusCode::FOUND);
    assert_eq!(location(&response), comments_url(news.id));
    assert_eq!(app.comment_count().await, 1);
    let stored = app
        .comment_repo()
        .list_by_news(news.id)
        .await
        .expect("comments");
    let comment = &stored[0].comment;
    assert_eq!(
        (comment.text.as_str(), comment.news_id, comment.author_id),
        (COMMENT_TEXT, news.id, author.id())
    );
}

#[tokio::test]
async fn comment_on_unknown_news_is_not_found() {
    let app = TestApp::new().await;
    let author = app.user("Лев Толстой").await;

    let response = app
        .post(&news_detail_url(999), &author, &json!({ "text": COMMENT_TEXT }))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(app.comment_count().await, 0);
}

#[tokio::test]
async fn user_cant_use_bad_words() {
    let app = TestApp::new().await;
    let author = app.user("Лев Толстой").await;
    let news = app.news().await;

    for word in BAD_WORDS {
        let text = format!("Какой-то текст, {}, еще текст", word.to_uppercase());
        let response = app
            .post_json(&news_detail_url(news.id), &author, &json!({ "text": text }))
            .await;

        response.assert_status_ok();
        let context = response.json::<Value>();
        assert_eq!(context["form"]["name"], "CommentForm");
        let errors: Vec<String> =
            serde_json::from_value(context["form"]["errors"]["text"].clone()).expect("errors");
        assert!(errors.contains(&WARNING.to_string()));
    }
    assert_eq!(app.comment_count().await, 0);
}

#[tokio::test]
async fn rejected_comment_page_renders_html() {
    let app = TestApp::new().await;
    let author = app.user("Лев Толстой").await;
    let news = app.news().await;

    let response = app
        .post(&news_detail_url(news.id), &author, &json!({ "text": BAD_WORDS[1] }))
        .await;

    response.assert_status_ok();
    assert!(response.text().contains(WARNING));
}

#[tokio::test]
async fn empty_comment_is_rejected() {
    let app = TestApp::new().await;
    let author = app.user("Лев Толстой").await;
    let news = app.news().await;

    let response = app
        .post_json(&news_detail_url(news.id), &author, &json!({ "text": "   " }))
        .await;

    response.assert_status_ok();
    assert!(response.json::<Value>()["form"]["errors"]["text"].is_array());
    assert_eq!(app.comment_count().await, 0);
}

#[tokio::test]
async fn author_can_delete_comment() {
    let app = TestApp::new().await;
    let author = app.user("Лев Толстой").await;
    let news = app.news().await;
    let comment = app.comment(&news, &author).await;

    let response = app
        .post(&delete_comment_url(comment.id), &author, &json!({}))
        .await;

    assert_eq!(response.status_code(), StatusCode::FOUND);
    assert_eq!(location(&response), comments_url(news.id));
    assert_eq!(app.comment_count().await, 0);
    assert!(app.reload_comment(comment.id).await.is_none());
}

#[tokio::test]
async fn user_cant_delete_comment_of_another_user() {
    let app = TestApp::new().await;
    let author = app.user("Лев Толстой").await;
    let reader = app.user("Читатель простой").await;
    let news = app.news().await;
    let comment = app.comment(&news, &author).await;

    let response = app
        .post(&delete_comment_url(comment.id), &reader, &json!({}))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(app.comment_count().await, 1);
    assert_eq!(app.reload_comment(comment.id).await, Some(comment));
}

#[tokio::test]
async fn author_can_edit_comment() {
    let app = TestApp::new().await;
    let author = app.user("Лев Толстой").await;
    let news = app.news().await;
    let comment = app.comment(&news, &author).await;

    let response = app
        .post(&edit_comment_url(comment.id), &author, &json!({ "text": NEW_TEXT }))
        .await;

    assert_eq!(response.status_code(), StatusCode::FOUND);
    assert_eq!(location(&response), comments_url(news.id));
    let updated = app.reload_comment(comment.id).await.expect("comment");
    assert_eq!(
        (updated.text.as_str(), updated.news_id, updated.author_id),
        (NEW_TEXT, comment.news_id, comment.author_id)
    );
}

#[tokio::test]
async fn user_cant_edit_comment_of_another_user() {
    let app = TestApp::new().await;
    let author = app.user("Лев Толстой").await;
    let reader = app.user("Читатель простой").await;
    let news = app.news().await;
    let comment = app.comment(&news, &author).await;

    let response = app
        .post(&edit_comment_url(comment.id), &reader, &json!({ "text": NEW_TEXT }))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(app.reload_comment(comment.id).await, Some(comment));
}

#[tokio::test]
async fn edit_with_bad_words_keeps_comment() {
    let app = TestApp::new().await;
    let author = app.user("Лев Толстой").await;
    let news = app.news().await;
    let comment = app.comment(&news, &author).await;

    let response = app
        .post_json(
            &edit_comment_url(comment.id),
            &author,
            &json!({ "text": format!("Ты {}", BAD_WORDS[0]) }),
        )
        .await;

    response.assert_status_ok();
    let context = response.json::<Value>();
    assert_eq!(context["comment"]["id"], comment.id);
    assert_eq!(context["form"]["errors"]["text"][0], WARNING);
    assert_eq!(app.reload_comment(comment.id).await, Some(comment));
}
