//! Staff surface: read and replace one's own photo.

use axum::{
  Json,
  extract::{Multipart, State, multipart::MultipartRejection},
};
use sculpt_core::{blob::BlobStore, store::SubmissionStore};

use crate::{
  AppState,
  auth::StaffSession,
  error::Error,
  handlers::{read_form, require_upload},
  view::SubmissionView,
};

const PHOTO_FIELD: &str = "photo";

/// GET /api/submission: `null` until a photo has been uploaded.
pub async fn get_own<S, B>(
  State(state): State<AppState<S, B>>,
  StaffSession(session): StaffSession,
) -> Result<Json<Option<SubmissionView>>, Error>
where
  S: SubmissionStore + 'static,
  B: BlobStore + 'static,
{
  let submission = state
    .lifecycle
    .get_submission(&session.employee_name)
    .await?;
  Ok(Json(submission.map(SubmissionView::from)))
}

/// POST /api/submission: multipart field `photo`, plus an optional
/// `employeeName` that must agree with the session.
pub async fn upload_photo<S, B>(
  State(state): State<AppState<S, B>>,
  StaffSession(session): StaffSession,
  multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SubmissionView>, Error>
where
  S: SubmissionStore + 'static,
  B: BlobStore + 'static,
{
  let mut form = read_form(multipart, PHOTO_FIELD).await?;

  if let Some(claimed) = form.fields.get("employeeName")
    && claimed.trim() != session.employee_name
  {
    return Err(Error::Forbidden(
      "employee name does not match the verified session".into(),
    ));
  }

  let upload = require_upload(&mut form, PHOTO_FIELD)?;
  let submission = state
    .lifecycle
    .upload_photo(&session.employee_name, upload)
    .await?;
  Ok(Json(submission.into()))
}
