//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Bad access code or missing/expired session.
  #[error("unauthorized: {0}")]
  Unauthorized(String),
  /// Bad or missing admin credentials.
  #[error("admin credentials required")]
  AdminUnauthorized,
  #[error("forbidden: {0}")]
  Forbidden(String),
  #[error("not found: {0}")]
  NotFound(String),
  #[error("bad request: {0}")]
  BadRequest(String),
  #[error("payload too large: {0}")]
  PayloadTooLarge(String),
  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
  #[error("persistence error: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<sculpt_core::Error> for Error {
  fn from(e: sculpt_core::Error) -> Self {
    use sculpt_core::Error as Core;
    match e {
      Core::Validation(msg) => Error::BadRequest(msg),
      e @ Core::TooLarge { .. } => Error::PayloadTooLarge(e.to_string()),
      Core::NotFound(name) => Error::NotFound(format!("no submission for {name}")),
      Core::Storage(e) => Error::Storage(e),
      Core::Persistence(e) => Error::Persistence(e),
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      Error::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.clone()),
      Error::AdminUnauthorized => {
        let mut res = (
          StatusCode::UNAUTHORIZED,
          Json(json!({ "error": "admin credentials required" })),
        )
          .into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"sculpt-admin\""),
        );
        return res;
      }
      Error::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
      Error::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      Error::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      Error::PayloadTooLarge(m) => (StatusCode::PAYLOAD_TOO_LARGE, m.clone()),
      Error::Storage(e) => {
        tracing::error!(error = %e, "blob storage failure");
        (StatusCode::INTERNAL_SERVER_ERROR, "file storage failed, please retry".to_owned())
      }
      Error::Persistence(e) => {
        tracing::error!(error = %e, "record store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, "could not save submission, please retry".to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
