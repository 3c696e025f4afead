use actix_web::web;

use crate::error::JsonError;

pub mod admin;
pub mod ai;
pub mod api;
pub mod session;
pub mod study;
pub mod view;

/// Result for JSON response handlers
pub type JsonResult<T> = Result<web::Json<T>, JsonError>;

/// Trims a request field, treating blank values as missing.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
