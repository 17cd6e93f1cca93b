//! POST /api/verify: exchange the access code for a staff session.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use chrono::{DateTime, Utc};
use sculpt_core::{blob::BlobStore, store::SubmissionStore};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppState, error::Error};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
  pub name:        String,
  pub access_code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
  pub token:         String,
  pub employee_name: String,
  pub expires_at:    DateTime<Utc>,
}

pub async fn handler<S, B>(
  State(state): State<AppState<S, B>>,
  body: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<VerifyResponse>, Error>
where
  S: SubmissionStore + 'static,
  B: BlobStore + 'static,
{
  let Json(req) = body.map_err(|e| Error::BadRequest(e.body_text()))?;

  let name = req.name.trim();
  if name.is_empty() {
    return Err(Error::BadRequest("name is required".into()));
  }

  state.gate.verify(name, &req.access_code)?;

  let (token, session) = state.sessions.issue(name);
  info!(employee = name, "staff session issued");

  Ok(Json(VerifyResponse {
    token,
    employee_name: session.employee_name,
    expires_at:    session.expires_at,
  }))
}
