//! Admin surface: the roster table and model management.

use std::collections::BTreeMap;

use axum::{
  Json,
  extract::{Multipart, Path, State, multipart::MultipartRejection},
  http::StatusCode,
};
use sculpt_core::{blob::BlobStore, store::SubmissionStore};

use crate::{
  AppState,
  auth::Admin,
  error::Error,
  handlers::{read_form, require_upload},
  view::{RosterEntry, SubmissionView},
};

const MODEL_FIELD: &str = "model";

/// GET /api/admin/submissions
///
/// Every allow-listed employee in name order, followed by any stored
/// submission whose name has since left the allow-list.
pub async fn roster<S, B>(
  State(state): State<AppState<S, B>>,
  _: Admin,
) -> Result<Json<Vec<RosterEntry>>, Error>
where
  S: SubmissionStore + 'static,
  B: BlobStore + 'static,
{
  let mut by_name: BTreeMap<String, _> = state
    .lifecycle
    .list_submissions()
    .await?
    .into_iter()
    .map(|s| (s.employee_name.clone(), s))
    .collect();

  let mut entries: Vec<RosterEntry> = state
    .gate
    .employees()
    .map(|name| RosterEntry::new(name, by_name.remove(name)))
    .collect();
  entries.extend(
    by_name
      .into_iter()
      .map(|(name, submission)| RosterEntry::new(name, Some(submission))),
  );

  Ok(Json(entries))
}

/// POST /api/admin/submissions/{name}/model: multipart field `model`.
pub async fn upload_model<S, B>(
  State(state): State<AppState<S, B>>,
  _: Admin,
  Path(name): Path<String>,
  multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SubmissionView>, Error>
where
  S: SubmissionStore + 'static,
  B: BlobStore + 'static,
{
  let mut form = read_form(multipart, MODEL_FIELD).await?;
  let upload = require_upload(&mut form, MODEL_FIELD)?;
  let submission = state.lifecycle.upload_model(&name, upload).await?;
  Ok(Json(submission.into()))
}

/// DELETE /api/admin/submissions/{name}/model
pub async fn delete_model<S, B>(
  State(state): State<AppState<S, B>>,
  _: Admin,
  Path(name): Path<String>,
) -> Result<Json<SubmissionView>, Error>
where
  S: SubmissionStore + 'static,
  B: BlobStore + 'static,
{
  let submission = state.lifecycle.delete_model(&name).await?;
  Ok(Json(submission.into()))
}

/// DELETE /api/admin/submissions/{name}/photo: removes the whole submission.
pub async fn delete_photo<S, B>(
  State(state): State<AppState<S, B>>,
  _: Admin,
  Path(name): Path<String>,
) -> Result<StatusCode, Error>
where
  S: SubmissionStore + 'static,
  B: BlobStore + 'static,
{
  state.lifecycle.delete_photo(&name).await?;
  Ok(StatusCode::NO_CONTENT)
}
