//! HTTP route handlers

use axum::extract::FromRequest;

use crate::ApiError;

pub mod form;
pub mod predict;

/// JSON body whose rejections answer with the same error body as every
/// other bad form input
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct FormJson<T>(pub T);
