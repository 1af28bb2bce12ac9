//! Shared harness for the HTTP test suites
//!
//! Every `TestApp` owns a fresh in-memory database and an in-process
//! server. Fixtures insert rows directly through the repositories; users
//! are logged in by opening a session for them, the way a browser holding
//! the `session` cookie would be.

#![allow(dead_code)]

use axum::http::{header, HeaderValue};
use axum_test::{TestRequest, TestResponse, TestServer};
use chrono::{Duration, Utc};
use serde::Serialize;
use serde_json::Value;

use newsnotes::config::Config;
use newsnotes::db::repositories::{
    CommentRepository, NewsRepository, NoteRepository, SqlxCommentRepository, SqlxNewsRepository,
    SqlxNoteRepository,
};
use newsnotes::db::{create_test_pool, migrations};
use newsnotes::models::{Comment, News, Note, User};
use newsnotes::web::{build_router, AppState};

pub const NOTE_TITLE: &str = "Тестовая заметка";
pub const NOTE_TEXT: &str = "Текст заметки";
pub const NOTE_SLUG: &str = "test-note";
pub const COMMENT_TEXT: &str = "Текст комментария";

/// A user with an open session
#[derive(Debug, Clone)]
pub struct TestUser {
    pub user: User,
    cookie: String,
}

impl TestUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }
}

/// Who sends a request
#[derive(Debug, Clone, Copy)]
pub enum Actor<'a> {
    Anonymous,
    User(&'a TestUser),
}

impl<'a> From<&'a TestUser> for Actor<'a> {
    fn from(user: &'a TestUser) -> Self {
        Actor::User(user)
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub config: Config,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let state = AppState::new(pool, &config).expect("Failed to build state");
        let server = TestServer::new(build_router(state.clone())).expect("Failed to start server");

        Self {
            server,
            state,
            config,
        }
    }

    // ------------------------------------------------------------------
    // Fixtures
    // ------------------------------------------------------------------

    /// Create a user without a password and log them in
    pub async fn user(&self, username: &str) -> TestUser {
        let user = self
            .state
            .user_service
            .create_user(&User::without_password(username))
            .await
            .expect("Failed to create user");
        let session = self
            .state
            .user_service
            .start_session(user.id)
            .await
            .expect("Failed to start session");

        TestUser {
            user,
            cookie: format!("session={}", session.id),
        }
    }

    pub fn news_repo(&self) -> SqlxNewsRepository {
        SqlxNewsRepository::new(self.state.pool.clone())
    }

    pub fn comment_repo(&self) -> SqlxCommentRepository {
        SqlxCommentRepository::new(self.state.pool.clone())
    }

    pub fn note_repo(&self) -> SqlxNoteRepository {
        SqlxNoteRepository::new(self.state.pool.clone())
    }

    /// One more news item than the home page shows, one per day back from today
    pub async fn seed_home_news(&self) -> Vec<News> {
        let today = Utc::now().date_naive();
        let items: Vec<News> = (0..=self.config.news.page_size as i64)
            .map(|index| {
                News::dated(
                    format!("Новость {}", index),
                    "Просто текст.",
                    today - Duration::days(index),
                )
            })
            .collect();

        self.news_repo()
            .create_many(&items)
            .await
            .expect("Failed to seed news")
    }

    pub async fn news(&self) -> News {
        self.news_repo()
            .create(&News::new("Заголовок", "Текст"))
            .await
            .expect("Failed to create news")
    }

    pub async fn comment(&self, news: &News, author: &TestUser) -> Comment {
        self.comment_repo()
            .create(&Comment::new(news.id, author.id(), COMMENT_TEXT))
            .await
            .expect("Failed to create comment")
    }

    /// Ten comments created one day apart, inserted out of order
    pub async fn multiple_comments(&self, news: &News, author: &TestUser) {
        let now = Utc::now();
        for index in [5, 2, 9, 0, 7, 1, 8, 3, 6, 4] {
            let mut comment = Comment::new(news.id, author.id(), format!("Tекст {}", index));
            comment.created = now + Duration::days(index);
            self.comment_repo()
                .create(&comment)
                .await
                .expect("Failed to create comment");
        }
    }

    pub async fn note(&self, author: &TestUser) -> Note {
        self.note_repo()
            .create(&Note::new(NOTE_TITLE, NOTE_TEXT, NOTE_SLUG, author.id()))
            .await
            .expect("Failed to create note")
    }

    pub async fn comment_count(&self) -> i64 {
        self.comment_repo().count().await.expect("count")
    }

    pub async fn note_count(&self) -> i64 {
        self.note_repo().count().await.expect("count")
    }

    pub async fn reload_comment(&self, id: i64) -> Option<Comment> {
        self.comment_repo().get_by_id(id).await.expect("comment")
    }

    pub async fn reload_note(&self, id: i64) -> Option<Note> {
        self.note_repo().get_by_id(id).await.expect("note")
    }

    // ------------------------------------------------------------------
    // Requests
    // ------------------------------------------------------------------

    fn as_actor(request: TestRequest, actor: Actor<'_>) -> TestRequest {
        match actor {
            Actor::Anonymous => request,
            Actor::User(user) => request.add_header(
                header::COOKIE,
                HeaderValue::from_str(&user.cookie).expect("cookie header"),
            ),
        }
    }

    fn json(request: TestRequest) -> TestRequest {
        request.add_header(header::ACCEPT, HeaderValue::from_static("application/json"))
    }

    pub async fn get<'a>(&self, path: &str, actor: impl Into<Actor<'a>>) -> TestResponse {
        Self::as_actor(self.server.get(path), actor.into()).await
    }

    /// GET a page and return its context; the page must render with 200
    pub async fn context<'a>(&self, path: &str, actor: impl Into<Actor<'a>>) -> Value {
        let response = Self::json(Self::as_actor(self.server.get(path), actor.into())).await;
        response.assert_status_ok();
        response.json::<Value>()
    }

    pub async fn post<'a, T: Serialize>(
        &self,
        path: &str,
        actor: impl Into<Actor<'a>>,
        form: &T,
    ) -> TestResponse {
        Self::as_actor(self.server.post(path), actor.into())
            .form(form)
            .await
    }

    /// POST a form asking for the JSON context of the re-rendered page
    pub async fn post_json<'a, T: Serialize>(
        &self,
        path: &str,
        actor: impl Into<Actor<'a>>,
        form: &T,
    ) -> TestResponse {
        Self::json(Self::as_actor(self.server.post(path), actor.into()))
            .form(form)
            .await
    }

    pub async fn delete<'a>(&self, path: &str, actor: impl Into<Actor<'a>>) -> TestResponse {
        Self::as_actor(self.server.delete(path), actor.into()).await
    }
}

/// `Location` of a redirect response
pub fn location(response: &TestResponse) -> String {
    response
        .header("location")
        .to_str()
        .expect("ascii location")
        .to_string()
}

/// Where an anonymous request to `path` is sent
pub fn login_redirect(path: &str) -> String {
    format!("/auth/login/?next={}", path)
}

pub fn news_detail_url(id: i64) -> String {
    format!("/news/{}/", id)
}

pub fn comments_url(news_id: i64) -> String {
    format!("/news/{}/#comments", news_id)
}

pub fn edit_comment_url(id: i64) -> String {
    format!("/edit_comment/{}/", id)
}

pub fn delete_comment_url(id: i64) -> String {
    format!("/delete_comment/{}/", id)
}

pub fn note_detail_url(slug: &str) -> String {
    format!("/notes/{}/", slug)
}

pub fn note_edit_url(slug: &str) -> String {
    format!("/notes/{}/edit/", slug)
}

pub fn note_delete_url(slug: &str) -> String {
    format!("/notes/{}/delete/", slug)
}
