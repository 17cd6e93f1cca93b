//! The `BlobStore` trait and the locator type it hands out.

use std::{fmt, future::Future, str::FromStr};

use serde::{Deserialize, Serialize};

// ─── Category ────────────────────────────────────────────────────────────────

/// Logical bucket a blob lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobCategory {
  Photos,
  Models,
}

impl BlobCategory {
  pub fn as_str(self) -> &'static str {
    match self {
      BlobCategory::Photos => "photos",
      BlobCategory::Models => "models",
    }
  }
}

impl fmt::Display for BlobCategory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for BlobCategory {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "photos" => Ok(BlobCategory::Photos),
      "models" => Ok(BlobCategory::Models),
      other => Err(format!("unknown blob category: {other:?}")),
    }
  }
}

// ─── Locator ─────────────────────────────────────────────────────────────────

/// Opaque, externally dereferenceable address of a stored blob.
///
/// Stores produce locators of the form `{prefix}/{category}/{key}`; the last
/// two segments are what identifies the blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
  pub fn new(value: impl Into<String>) -> Self { Self(value.into()) }

  /// Build a locator under `prefix` (trailing slashes are ignored).
  pub fn compose(prefix: &str, category: BlobCategory, key: &str) -> Self {
    Self(format!("{}/{category}/{key}", prefix.trim_end_matches('/')))
  }

  pub fn as_str(&self) -> &str { &self.0 }

  /// The trailing `(category, key)` segments, if the locator has them.
  pub fn segments(&self) -> Option<(&str, &str)> {
    let mut parts = self.0.rsplitn(3, '/');
    let key = parts.next()?;
    let category = parts.next()?;
    Some((category, key))
  }
}

impl fmt::Display for Locator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

// ─── Fetch outcome ───────────────────────────────────────────────────────────

/// Result of opening a blob by its delivery path.
#[derive(Debug)]
pub enum Fetch {
  /// An open handle, ready to be streamed.
  Found { file: tokio::fs::File, len: u64 },
  Missing,
  /// The path resolved to somewhere outside the storage root.
  OutsideRoot,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over binary asset storage.
///
/// `put` must appear atomic to concurrent readers. `delete` of a blob that
/// does not exist succeeds.
pub trait BlobStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Write `bytes` under `(category, key)` and return its locator.
  fn put<'a>(
    &'a self,
    category: BlobCategory,
    key: &'a str,
    bytes: &'a [u8],
  ) -> impl Future<Output = Result<Locator, Self::Error>> + Send + 'a;

  fn exists<'a>(
    &'a self,
    locator: &'a Locator,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn delete<'a>(
    &'a self,
    locator: &'a Locator,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Open a blob by its `category/key` path (e.g. `photos/photo_x_1.jpg`).
  /// Anything else under the storage root is not a blob and is never
  /// returned.
  fn fetch<'a>(
    &'a self,
    path: &'a str,
  ) -> impl Future<Output = Result<Fetch, Self::Error>> + Send + 'a;
}
