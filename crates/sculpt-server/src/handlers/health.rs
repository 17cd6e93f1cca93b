//! GET /api/health: liveness plus a record store round trip.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use chrono::Utc;
use sculpt_core::{blob::BlobStore, store::SubmissionStore};
use serde_json::json;

use crate::AppState;

pub async fn handler<S, B>(State(state): State<AppState<S, B>>) -> Response
where
  S: SubmissionStore + 'static,
  B: BlobStore + 'static,
{
  match state.lifecycle.store().ping().await {
    Ok(()) => Json(json!({ "status": "ok", "timestamp": Utc::now() })).into_response(),
    Err(e) => {
      tracing::error!(error = %e, "health check failed");
      (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "status": "error", "timestamp": Utc::now() })),
      )
        .into_response()
    }
  }
}
