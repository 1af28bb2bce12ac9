//! Page rendering with content negotiation
//!
//! Handlers build a serializable context for each page. Browsers get the
//! context rendered through a Tera template; clients sending
//! `Accept: application/json` get the context itself.

use anyhow::{anyhow, Context as _};
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, Extensions, HeaderMap, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use std::convert::Infallible;
use std::sync::Arc;

use super::error::WebError;
use super::middleware::{AppState, AuthenticatedUser};
use crate::services::{Form, FormErrors};
use crate::templates::TemplateEngine;

/// Form state exposed to templates: `{ "name", "data", "errors" }`
#[derive(Debug, Clone, Serialize)]
pub struct FormView<F: Form> {
    pub name: &'static str,
    pub data: F,
    pub errors: FormErrors,
}

impl<F: Form> FormView<F> {
    /// A form without errors, showing `data` as initial values
    pub fn new(data: F) -> Self {
        Self {
            name: F::NAME,
            data,
            errors: FormErrors::new(),
        }
    }

    /// A submitted form that failed validation
    pub fn invalid(data: F, errors: FormErrors) -> Self {
        Self {
            name: F::NAME,
            data,
            errors,
        }
    }
}

/// Does the client ask for JSON instead of HTML?
pub fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.contains("application/json"))
}

/// Renderer for the current request
pub struct Page {
    templates: Arc<TemplateEngine>,
    wants_json: bool,
    user: Option<String>,
    path: String,
}

impl Page {
    pub fn new(
        templates: Arc<TemplateEngine>,
        headers: &HeaderMap,
        uri: &Uri,
        extensions: &Extensions,
    ) -> Self {
        Self {
            templates,
            wants_json: wants_json(headers),
            user: extensions
                .get::<AuthenticatedUser>()
                .map(|user| user.0.username.clone()),
            path: uri.path().to_string(),
        }
    }

    /// Render for an anonymous viewer, e.g. right after logout
    pub fn anonymous(mut self) -> Self {
        self.user = None;
        self
    }

    pub fn wants_json(&self) -> bool {
        self.wants_json
    }

    /// Render a page with 200 OK
    pub fn render<C: Serialize>(&self, template: &str, context: &C) -> Result<Response, WebError> {
        self.render_status(StatusCode::OK, template, context)
    }

    /// Render a page with the given status
    pub fn render_status<C: Serialize>(
        &self,
        status: StatusCode,
        template: &str,
        context: &C,
    ) -> Result<Response, WebError> {
        let mut value = serde_json::to_value(context).context("Failed to serialize page context")?;
        let map = value
            .as_object_mut()
            .ok_or_else(|| anyhow!("Context for {} is not an object", template))?;
        map.insert("user".to_string(), self.user.clone().into());

        if self.wants_json {
            return Ok((status, Json(value)).into_response());
        }

        if let Value::Object(map) = &mut value {
            map.insert("request_path".to_string(), Value::String(self.path.clone()));
        }
        let html = self.templates.render_value(template, &value)?;
        Ok((status, Html(html)).into_response())
    }
}

impl FromRequestParts<AppState> for Page {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Page::new(
            state.templates.clone(),
            &parts.headers,
            &parts.uri,
            &parts.extensions,
        ))
    }
}
