//! Path guards at the storage boundary.

use std::path::{Component, Path, PathBuf};

use sculpt_core::blob::BlobCategory;

use crate::{Error, Result};

/// Validate a flat blob key: one path segment, no traversal, nothing hidden.
pub fn validate_key(key: &str) -> Result<&str> {
  let reject = |reason| Err(Error::InvalidKey { key: key.to_owned(), reason });

  if key.is_empty() {
    return reject("empty");
  }
  // Control characters would also let a key smuggle CRLF into headers.
  if key.chars().any(|c| c == '\0' || c.is_control()) {
    return reject("control character");
  }
  if key.contains('/') || key.contains('\\') {
    return reject("path separator");
  }
  if key.starts_with('.') {
    return reject("leading dot");
  }
  Ok(key)
}

/// Lexically normalise a client-supplied path relative to the storage root.
///
/// Returns `None` for anything that is absolute, empty, or contains `..`,
/// `.` or a prefix component. Symlink escapes are caught separately, after
/// canonicalisation.
pub fn relative_within_root(path: &str) -> Option<PathBuf> {
  let path = Path::new(path);
  let mut out = PathBuf::new();
  for component in path.components() {
    match component {
      Component::Normal(part) => out.push(part),
      _ => return None,
    }
  }
  if out.as_os_str().is_empty() { None } else { Some(out) }
}

/// Split a root-relative path into a blob's `(category, key)`.
///
/// Exactly two segments, a known category and a valid key; anything else
/// under the root (in-flight temp files, stray files) is not a blob.
pub fn blob_segments(relative: &Path) -> Option<(BlobCategory, &str)> {
  let mut parts = relative.iter();
  let category: BlobCategory = parts.next()?.to_str()?.parse().ok()?;
  let key = parts.next()?.to_str()?;
  if parts.next().is_some() {
    return None;
  }
  validate_key(key).ok().map(|key| (category, key))
}
