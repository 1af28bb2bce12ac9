//! Access control for the News and auth pages

mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;

#[tokio::test]
async fn public_pages_are_available_to_anonymous_users() {
    let app = TestApp::new().await;
    let news = app.news().await;

    for path in [
        "/".to_string(),
        news_detail_url(news.id),
        "/auth/login/".to_string(),
        "/auth/signup/".to_string(),
    ] {
        let response = app.get(&path, Actor::Anonymous).await;
        assert_eq!(response.status_code(), StatusCode::OK, "GET {}", path);
    }
}

#[tokio::test]
async fn logout_page_is_available_for_post() {
    let app = TestApp::new().await;

    let response = app.post("/auth/logout/", Actor::Anonymous, &json!({})).await;

    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn comment_pages_are_only_for_the_author() {
    let app = TestApp::new().await;
    let author = app.user("Лев Толстой").await;
    let reader = app.user("Читатель простой").await;
    let news = app.news().await;
    let comment = app.comment(&news, &author).await;

    let cases = [
        (&author, StatusCode::OK),
        (&reader, StatusCode::NOT_FOUND),
    ];
    for (user, expected) in cases {
        for path in [edit_comment_url(comment.id), delete_comment_url(comment.id)] {
            let response = app.get(&path, user).await;
            assert_eq!(
                response.status_code(),
                expected,
                "GET {} as {}",
                path,
                user.user.username
            );
        }
    }
}

#[tokio::test]
async fn anonymous_user_is_redirected_from_comment_pages() {
    let app = TestApp::new().await;
    let author = app.user("Лев Толстой").await;
    let news = app.news().await;
    let comment = app.comment(&news, &author).await;

    for path in [edit_comment_url(comment.id), delete_comment_url(comment.id)] {
        let response = app.get(&path, Actor::Anonymous).await;
        assert_eq!(response.status_code(), StatusCode::FOUND, "GET {}", path);
        assert_eq!(location(&response), login_redirect(&path));
    }
}

#[tokio::test]
async fn unknown_news_is_not_found() {
    let app = TestApp::new().await;
    let news = app.news().await;

    for path in [news_detail_url(news.id + 1), "/news/abc/".to_string()] {
        let response = app.get(&path, Actor::Anonymous).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND, "GET {}", path);
    }
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let app = TestApp::new().await;

    let response = app.get("/no/such/page/", Actor::Anonymous).await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert!(response.text().contains("404"));
}
