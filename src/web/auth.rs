//! Auth section handlers
//!
//! Signup, login and logout. A successful login stores the session token
//! in an HttpOnly `session` cookie.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::Response,
    Form,
};
use serde::{Deserialize, Serialize};

use super::error::WebError;
use super::middleware::{
    clear_session_cookie, extract_session_token, found, session_cookie, AppState, LOGIN_URL,
};
use super::render::{FormView, Page};
use crate::services::{Form as PageForm, LoginForm, SignupForm};

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Serialize)]
struct FormContext<F: PageForm> {
    form: FormView<F>,
}

#[derive(Serialize)]
struct EmptyContext {}

/// Accept only local absolute paths as a post-login target
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.starts_with("/\\")
                && path.is_ascii() =>
        {
            path
        }
        _ => "/",
    }
}

fn with_cookie(mut response: Response, cookie: &str) -> Result<Response, WebError> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|e| anyhow::anyhow!("Invalid cookie header: {}", e))?;
    response.headers_mut().insert(header::SET_COOKIE, value);
    Ok(response)
}

/// GET /auth/login/ - Login form
pub async fn login_page(page: Page, Query(query): Query<LoginQuery>) -> Result<Response, WebError> {
    let form = LoginForm {
        next: query.next,
        ..LoginForm::default()
    };
    page.render("auth/login.html", &FormContext { form: FormView::new(form) })
}

/// POST /auth/login/ - Check credentials and start a session
pub async fn login(
    page: Page,
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, WebError> {
    let (username, password) = match form.clean() {
        Ok(credentials) => credentials,
        Err(errors) => {
            return page.render(
                "auth/login.html",
                &FormContext { form: FormView::invalid(form, errors) },
            )
        }
    };

    match state.user_service.login(&username, &password).await {
        Ok(session) => {
            let cookie = session_cookie(&session.id, state.user_service.session_expiration_days());
            with_cookie(found(safe_next(form.next.as_deref())), &cookie)
        }
        Err(e) => match e.form_errors() {
            Some(errors) => page.render(
                "auth/login.html",
                &FormContext { form: FormView::invalid(form, errors) },
            ),
            None => Err(e.into()),
        },
    }
}

/// GET /auth/signup/ - Registration form
pub async fn signup_page(page: Page) -> Result<Response, WebError> {
    page.render(
        "auth/signup.html",
        &FormContext { form: FormView::new(SignupForm::default()) },
    )
}

/// POST /auth/signup/ - Create an account
pub async fn signup(
    page: Page,
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> Result<Response, WebError> {
    let input = match form.clean() {
        Ok(input) => input,
        Err(errors) => {
            return page.render(
                "auth/signup.html",
                &FormContext { form: FormView::invalid(form, errors) },
            )
        }
    };

    match state.user_service.register(input).await {
        Ok(_) => Ok(found(LOGIN_URL)),
        Err(e) => match e.form_errors() {
            Some(errors) => page.render(
                "auth/signup.html",
                &FormContext { form: FormView::invalid(form, errors) },
            ),
            None => Err(e.into()),
        },
    }
}

/// POST /auth/logout/ - End the session, if any
pub async fn logout(
    page: Page,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, WebError> {
    if let Some(token) = extract_session_token(&headers) {
        state.user_service.logout(&token).await?;
    }

    let response = page.anonymous().render("auth/logged_out.html", &EmptyContext {})?;
    with_cookie(response, &clear_session_cookie())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/notes/")), "/notes/");
        assert_eq!(safe_next(Some("/notes/?page=2")), "/notes/?page=2");
        assert_eq!(safe_next(Some("//evil.example/")), "/");
        assert_eq!(safe_next(Some("https://evil.example/")), "/");
        assert_eq!(safe_next(Some("/\\evil.example")), "/");
        assert_eq!(safe_next(None), "/");
    }
}
