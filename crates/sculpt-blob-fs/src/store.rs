//! [`FsBlobStore`]: the filesystem implementation of [`BlobStore`].

use std::path::{Path, PathBuf};

use sculpt_core::blob::{BlobCategory, BlobStore, Fetch, Locator};
use tokio::fs;
use tracing::debug;

use crate::{
  Error, Result,
  path::{blob_segments, relative_within_root, validate_key},
};

const CATEGORIES: [BlobCategory; 2] = [BlobCategory::Photos, BlobCategory::Models];

/// Blobs stored as plain files under a root directory.
///
/// Writes land in `<root>/.tmp` first and are renamed into place, so a
/// concurrent reader sees either the old file, no file, or the complete new
/// one.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
  root:          PathBuf,
  public_prefix: String,
}

impl FsBlobStore {
  /// Create the directory layout under `root` and return a store whose
  /// locators start with `public_prefix` (e.g. `/api/uploads`).
  pub async fn open(root: impl AsRef<Path>, public_prefix: impl Into<String>) -> Result<Self> {
    let root = root.as_ref().to_path_buf();
    for category in CATEGORIES {
      fs::create_dir_all(root.join(category.as_str())).await?;
    }
    fs::create_dir_all(root.join(".tmp")).await?;
    Ok(Self { root, public_prefix: public_prefix.into() })
  }

  pub fn root(&self) -> &Path { &self.root }

  fn blob_path(&self, category: BlobCategory, key: &str) -> Result<PathBuf> {
    Ok(self.root.join(category.as_str()).join(validate_key(key)?))
  }

  fn temp_path(&self) -> PathBuf {
    self.root.join(".tmp").join(uuid::Uuid::new_v4().to_string())
  }

  /// Map a locator back to its file. Only the trailing `category/key`
  /// segments matter, so locators survive a change of public prefix.
  fn locate(&self, locator: &Locator) -> Result<PathBuf> {
    let (category, key) = locator
      .segments()
      .ok_or_else(|| Error::MalformedLocator(locator.to_string()))?;
    let category = category.parse::<BlobCategory>().map_err(Error::UnknownCategory)?;
    self.blob_path(category, key)
  }
}

impl BlobStore for FsBlobStore {
  type Error = Error;

  async fn put(&self, category: BlobCategory, key: &str, bytes: &[u8]) -> Result<Locator> {
    let blob_path = self.blob_path(category, key)?;
    let temp_path = self.temp_path();

    if let Err(e) = fs::write(&temp_path, bytes).await {
      let _ = fs::remove_file(&temp_path).await;
      return Err(e.into());
    }
    if let Err(e) = fs::rename(&temp_path, &blob_path).await {
      let _ = fs::remove_file(&temp_path).await;
      return Err(e.into());
    }

    debug!(path = %blob_path.display(), size = bytes.len(), "blob written");
    Ok(Locator::compose(&self.public_prefix, category, key))
  }

  async fn exists(&self, locator: &Locator) -> Result<bool> {
    let path = self.locate(locator)?;
    Ok(fs::try_exists(&path).await?)
  }

  async fn delete(&self, locator: &Locator) -> Result<()> {
    let path = self.locate(locator)?;
    match fs::remove_file(&path).await {
      Ok(()) => {
        debug!(path = %path.display(), "blob deleted");
        Ok(())
      }
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e.into()),
    }
  }

  async fn fetch(&self, path: &str) -> Result<Fetch> {
    let Some(relative) = relative_within_root(path) else {
      return Ok(Fetch::OutsideRoot);
    };
    let Some((category, key)) = blob_segments(&relative) else {
      return Ok(Fetch::Missing);
    };

    let canonical_root = fs::canonicalize(&self.root).await?;
    let canonical = match fs::canonicalize(self.blob_path(category, key)?).await {
      Ok(p) => p,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Fetch::Missing),
      Err(e) => return Err(e.into()),
    };

    // Catches symlinks pointing out of the root.
    if !canonical.starts_with(&canonical_root) {
      return Ok(Fetch::OutsideRoot);
    }

    let file = fs::File::open(&canonical).await?;
    let metadata = file.metadata().await?;
    if !metadata.is_file() {
      return Ok(Fetch::Missing);
    }

    Ok(Fetch::Found { file, len: metadata.len() })
  }
}
