//! Storage key generation.
//!
//! Keys look like `photo_{enc}_{millis}.{ext}`. `enc` is the standard base64
//! of the UTF-8 employee name with `+`, `/` and `=` stripped, so names in any
//! script map onto filesystem-safe ASCII.

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use chrono::{DateTime, Utc};

/// Extension every stored model gets.
pub const MODEL_EXTENSION: &str = "glb";

pub fn encode_name(name: &str) -> String {
  B64
    .encode(name.as_bytes())
    .chars()
    .filter(|c| !matches!(c, '+' | '/' | '='))
    .collect()
}

pub fn photo_key(name: &str, extension: &str, at: DateTime<Utc>) -> String {
  format!(
    "photo_{}_{}.{}",
    encode_name(name),
    at.timestamp_millis(),
    extension.to_ascii_lowercase()
  )
}

pub fn model_key(name: &str, at: DateTime<Utc>) -> String {
  format!(
    "model_{}_{}.{MODEL_EXTENSION}",
    encode_name(name),
    at.timestamp_millis()
  )
}

/// Lower-cased extension of an uploaded file name, if it has a usable one.
///
/// Only ASCII alphanumerics are accepted so the result can be embedded in a
/// key without further escaping.
pub fn extension_of(file_name: &str) -> Option<String> {
  let (stem, ext) = file_name.rsplit_once('.')?;
  if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
    return None;
  }
  Some(ext.to_ascii_lowercase())
}
