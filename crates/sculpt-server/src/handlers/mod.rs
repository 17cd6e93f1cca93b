pub mod admin;
pub mod health;
pub mod submission;
pub mod uploads;
pub mod verify;

use std::collections::HashMap;

use axum::{
  extract::{Multipart, multipart::{MultipartError, MultipartRejection}},
  http::StatusCode,
};
use sculpt_core::Upload;

use crate::error::Error;

/// A multipart form with one file field pulled out.
pub(crate) struct UploadForm {
  pub upload: Option<Upload>,
  pub fields: HashMap<String, String>,
}

/// Drain a multipart body. The field named `file_field` becomes the upload;
/// every other field is read as text.
pub(crate) async fn read_form(
  multipart: Result<Multipart, MultipartRejection>,
  file_field: &str,
) -> Result<UploadForm, Error> {
  let mut multipart = multipart.map_err(|e| Error::BadRequest(e.body_text()))?;
  let mut form = UploadForm { upload: None, fields: HashMap::new() };

  while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
    let Some(name) = field.name().map(str::to_owned) else { continue };

    if name == file_field {
      let file_name = field.file_name().map(str::to_owned);
      let bytes = field.bytes().await.map_err(multipart_error)?;
      form.upload = Some(Upload { file_name, bytes: bytes.to_vec() });
    } else {
      let text = field.text().await.map_err(multipart_error)?;
      form.fields.insert(name, text);
    }
  }
  Ok(form)
}

fn multipart_error(e: MultipartError) -> Error {
  if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
    Error::PayloadTooLarge(e.body_text())
  } else {
    Error::BadRequest(e.body_text())
  }
}

/// Take the upload out of a form, or say which field was missing.
pub(crate) fn require_upload(form: &mut UploadForm, file_field: &str) -> Result<Upload, Error> {
  form
    .upload
    .take()
    .ok_or_else(|| Error::BadRequest(format!("missing `{file_field}` file field")))
}
