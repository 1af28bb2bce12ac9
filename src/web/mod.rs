//! Web layer - HTTP handlers and routing
//!
//! This module contains the HTML endpoints of the site:
//! - News home page, news detail and comment mutation
//! - The private Notes section
//! - Signup, login and logout
//!
//! Every page can also be fetched as JSON (see `render`).

pub mod auth;
pub mod error;
pub mod middleware;
pub mod news;
pub mod notes;
pub mod render;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use error::WebError;
pub use middleware::{AppState, AuthenticatedUser, CurrentUser, OptionalUser, LOGIN_URL};
pub use render::{FormView, Page};

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(news::home))
        .route("/news/{id}/", get(news::detail).post(news::add_comment))
        .route("/auth/login/", get(auth::login_page).post(auth::login))
        .route("/auth/signup/", get(auth::signup_page).post(auth::signup))
        .route("/auth/logout/", post(auth::logout));

    // Anonymous users are sent to the login page
    let protected_routes = Router::new()
        .route(
            "/edit_comment/{id}/",
            get(news::edit_comment_page).post(news::edit_comment),
        )
        .route(
            "/delete_comment/{id}/",
            get(news::delete_comment_page).post(news::delete_comment),
        )
        .route("/notes/", get(notes::list))
        .route("/notes/add/", get(notes::add_page).post(notes::add))
        .route("/notes/done/", get(notes::success))
        .route("/notes/{slug}/", get(notes::detail))
        .route("/notes/{slug}/edit/", get(notes::edit_page).post(notes::edit))
        .route(
            "/notes/{slug}/delete/",
            get(notes::delete_page)
                .post(notes::delete)
                .delete(notes::delete),
        )
        .route_layer(axum_middleware::from_fn(middleware::require_login));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(error::not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            error::error_pages,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::optional_auth,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
