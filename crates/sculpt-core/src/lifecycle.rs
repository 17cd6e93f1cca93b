//! The submission lifecycle manager.
//!
//! Coordinates a [`SubmissionStore`] and a [`BlobStore`] under four state
//! transitions. The two stores are never updated atomically as a pair: blob
//! writes happen first on upload paths, record writes happen last on delete
//! paths, so the only inconsistency a failure can leave behind is an orphan
//! blob. The record store is authoritative.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::{
  Error, Result,
  blob::{BlobCategory, BlobStore, Locator},
  key::{MODEL_EXTENSION, extension_of, model_key, photo_key},
  store::SubmissionStore,
  submission::{Change, Submission, SubmissionPatch, SubmissionStatus},
};

/// Photo extensions accepted by [`SubmissionLifecycle::upload_photo`].
pub const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// An uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
  /// Client-side file name; only its extension is used.
  pub file_name: Option<String>,
  pub bytes:     Vec<u8>,
}

/// Per-category upload size limits in bytes.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
  pub max_photo_bytes: usize,
  pub max_model_bytes: usize,
}

impl Default for Limits {
  fn default() -> Self {
    Self {
      max_photo_bytes: 10 * 1024 * 1024,
      max_model_bytes: 50 * 1024 * 1024,
    }
  }
}

/// A blob delete that failed and was downgraded to a warning.
#[derive(Debug)]
pub struct DiscardWarning {
  pub locator: Locator,
  pub error:   Box<dyn std::error::Error + Send + Sync>,
}

// ─── Manager ─────────────────────────────────────────────────────────────────

/// Owns the submission state machine. Blob writes land before record writes,
/// and record deletes come after blob deletes.
pub struct SubmissionLifecycle<S, B> {
  store:  Arc<S>,
  blobs:  Arc<B>,
  limits: Limits,
}

impl<S, B> SubmissionLifecycle<S, B>
where
  S: SubmissionStore,
  B: BlobStore,
{
  pub fn new(store: Arc<S>, blobs: Arc<B>, limits: Limits) -> Self {
    Self { store, blobs, limits }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn blobs(&self) -> &B { &self.blobs }

  pub fn limits(&self) -> Limits { self.limits }

  // ── Reads ─────────────────────────────────────────────────────────────────

  pub async fn get_submission(&self, name: &str) -> Result<Option<Submission>> {
    let name = require_name(name)?;
    self
      .store
      .find_by_name(name)
      .await
      .map_err(|e| Error::Persistence(Box::new(e)))
  }

  pub async fn list_submissions(&self) -> Result<Vec<Submission>> {
    self
      .store
      .list()
      .await
      .map_err(|e| Error::Persistence(Box::new(e)))
  }

  // ── Transitions ───────────────────────────────────────────────────────────

  /// `ABSENT | PENDING | COMPLETED -> PENDING` (stored status).
  ///
  /// The model locator is left as it is; a previous photo blob is orphaned.
  pub async fn upload_photo(&self, name: &str, upload: Upload) -> Result<Submission> {
    let name = require_name(name)?;
    require_bytes(&upload, "photo", self.limits.max_photo_bytes)?;

    let extension = upload
      .file_name
      .as_deref()
      .and_then(extension_of)
      .filter(|ext| PHOTO_EXTENSIONS.contains(&ext.as_str()))
      .ok_or_else(|| {
        Error::Validation(format!(
          "photo must be one of: {}",
          PHOTO_EXTENSIONS.join(", ")
        ))
      })?;

    let key = photo_key(name, &extension, Utc::now());
    let locator = self
      .blobs
      .put(BlobCategory::Photos, &key, &upload.bytes)
      .await
      .map_err(|e| Error::Storage(Box::new(e)))?;

    let patch = SubmissionPatch {
      photo:  Change::Set(locator.clone()),
      model:  Change::Keep,
      status: Some(SubmissionStatus::Pending),
    };
    let submission = self.store.upsert(name, patch).await.map_err(|e| {
      warn!(%locator, "photo stored but record write failed; blob orphaned");
      Error::Persistence(Box::new(e))
    })?;

    info!(employee = name, %locator, "photo uploaded");
    Ok(submission)
  }

  /// `PENDING -> COMPLETED`. Fails with [`Error::NotFound`] from `ABSENT`.
  pub async fn upload_model(&self, name: &str, upload: Upload) -> Result<Submission> {
    let name = require_name(name)?;
    require_bytes(&upload, "model", self.limits.max_model_bytes)?;

    if let Some(file_name) = upload.file_name.as_deref()
      && extension_of(file_name).as_deref() != Some(MODEL_EXTENSION)
    {
      return Err(Error::Validation(format!(
        "model must be a .{MODEL_EXTENSION} file"
      )));
    }

    // Checked up front so the common error path does not orphan a blob.
    self.require_submission(name).await?;

    let key = model_key(name, Utc::now());
    let locator = self
      .blobs
      .put(BlobCategory::Models, &key, &upload.bytes)
      .await
      .map_err(|e| Error::Storage(Box::new(e)))?;

    let patch = SubmissionPatch {
      photo:  Change::Keep,
      model:  Change::Set(locator.clone()),
      status: Some(SubmissionStatus::Completed),
    };
    let updated = self.store.update(name, patch).await.map_err(|e| {
      warn!(%locator, "model stored but record write failed; blob orphaned");
      Error::Persistence(Box::new(e))
    })?;

    match updated {
      Some(submission) => {
        info!(employee = name, %locator, "model uploaded");
        Ok(submission)
      }
      None => {
        warn!(%locator, employee = name, "submission vanished during model upload; blob orphaned");
        Err(Error::NotFound(name.to_owned()))
      }
    }
  }

  /// `COMPLETED -> PENDING`. The blob delete is best-effort; the record is
  /// cleared regardless.
  pub async fn delete_model(&self, name: &str) -> Result<Submission> {
    let name = require_name(name)?;
    let submission = self.require_submission(name).await?;

    if let Some(locator) = submission.model_locator.as_ref()
      && let Err(warning) = self.discard(locator).await
    {
      log_discard_warning(name, &warning);
    }

    let patch = SubmissionPatch {
      photo:  Change::Keep,
      model:  Change::Clear,
      status: Some(SubmissionStatus::Pending),
    };
    let updated = self
      .store
      .update(name, patch)
      .await
      .map_err(|e| Error::Persistence(Box::new(e)))?
      .ok_or_else(|| Error::NotFound(name.to_owned()))?;

    info!(employee = name, "model deleted");
    Ok(updated)
  }

  /// `PENDING | COMPLETED -> ABSENT`. Removes both blobs best-effort, then
  /// the row itself.
  pub async fn delete_photo(&self, name: &str) -> Result<()> {
    let name = require_name(name)?;
    let submission = self.require_submission(name).await?;

    let blobs = [
      submission.photo_locator.as_ref(),
      submission.model_locator.as_ref(),
    ];
    for locator in blobs.into_iter().flatten() {
      if let Err(warning) = self.discard(locator).await {
        log_discard_warning(name, &warning);
      }
    }

    let deleted = self
      .store
      .delete_by_name(name)
      .await
      .map_err(|e| Error::Persistence(Box::new(e)))?;
    if !deleted {
      return Err(Error::NotFound(name.to_owned()));
    }

    info!(employee = name, "photo deleted; submission removed");
    Ok(())
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  /// Best-effort blob removal. Failure is a value, not an error.
  pub async fn discard(&self, locator: &Locator) -> Result<(), DiscardWarning> {
    self.blobs.delete(locator).await.map_err(|e| DiscardWarning {
      locator: locator.clone(),
      error:   Box::new(e),
    })
  }

  async fn require_submission(&self, name: &str) -> Result<Submission> {
    self
      .store
      .find_by_name(name)
      .await
      .map_err(|e| Error::Persistence(Box::new(e)))?
      .ok_or_else(|| Error::NotFound(name.to_owned()))
  }
}

fn log_discard_warning(name: &str, warning: &DiscardWarning) {
  warn!(
    employee = name,
    locator = %warning.locator,
    error = %warning.error,
    "blob delete failed; continuing with record update"
  );
}

fn require_name(name: &str) -> Result<&str> {
  let trimmed = name.trim();
  if trimmed.is_empty() {
    return Err(Error::Validation("employee name is required".into()));
  }
  Ok(trimmed)
}

fn require_bytes(upload: &Upload, kind: &'static str, limit: usize) -> Result<()> {
  if upload.bytes.is_empty() {
    return Err(Error::Validation(format!("{kind} file is required")));
  }
  if upload.bytes.len() > limit {
    return Err(Error::TooLarge { kind, actual: upload.bytes.len(), limit });
  }
  Ok(())
}
