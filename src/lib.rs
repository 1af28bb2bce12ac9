//! Newsnotes - a news site with reader comments and a private notes app
//!
//! This library provides everything the `newsnotes` server runs:
//! configuration, persistence, business rules, templates and the HTTP layer.

pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod templates;
pub mod web;
