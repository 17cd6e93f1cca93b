//! GET /api/uploads/{*path}: stream stored blobs back to clients.
//!
//! Blob keys carry a timestamp, so a given URL never changes content and can
//! be cached indefinitely.

use axum::{
  body::Body,
  extract::{Path, State},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use sculpt_core::{
  blob::{BlobStore, Fetch},
  store::SubmissionStore,
};
use tokio_util::io::ReaderStream;

use crate::{AppState, error::Error};

const CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Content type for a stored blob, by extension.
pub fn content_type_for(path: &str) -> &'static str {
  let extension = path
    .rsplit_once('.')
    .map(|(_, ext)| ext.to_ascii_lowercase())
    .unwrap_or_default();

  match extension.as_str() {
    "jpg" | "jpeg" => "image/jpeg",
    "png" => "image/png",
    "glb" => "model/gltf-binary",
    "gltf" => "model/gltf+json",
    _ => "application/octet-stream",
  }
}

pub async fn handler<S, B>(
  State(state): State<AppState<S, B>>,
  Path(path): Path<String>,
) -> Result<Response, Error>
where
  S: SubmissionStore + 'static,
  B: BlobStore + 'static,
{
  let fetched = state
    .lifecycle
    .blobs()
    .fetch(&path)
    .await
    .map_err(|e| Error::Storage(Box::new(e)))?;

  let (file, len) = match fetched {
    Fetch::Found { file, len } => (file, len),
    Fetch::Missing => return Err(Error::NotFound(format!("no file at {path}"))),
    Fetch::OutsideRoot => {
      tracing::warn!(%path, "refused delivery outside the upload root");
      return Err(Error::Forbidden("path escapes the upload root".into()));
    }
  };

  let body = Body::from_stream(ReaderStream::new(file));
  let mut response = (StatusCode::OK, body).into_response();
  let headers = response.headers_mut();
  headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
  headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type_for(&path)));
  headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL));
  headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
  Ok(response)
}
