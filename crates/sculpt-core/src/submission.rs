//! Submission: the per-employee record tracking photo and model progress.
//!
//! The stored [`SubmissionStatus`] is a display cache written by the
//! lifecycle operations. Anything that makes a decision uses [`Stage`], which
//! is derived from locator presence alone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blob::Locator;

// ─── Stored status ───────────────────────────────────────────────────────────

/// Status tag persisted alongside the record. Advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
  Pending,
  Processing,
  Completed,
}

// ─── Derived stage ───────────────────────────────────────────────────────────

/// Where an employee is in the pipeline, computed from the two locators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
  /// No photo on record.
  #[serde(rename = "none")]
  Absent,
  /// Photo submitted, awaiting a model.
  Pending,
  /// Photo and model both present.
  Completed,
}

impl Stage {
  /// Label shown to staff.
  pub fn label(self) -> &'static str {
    match self {
      Stage::Absent => "未上传",
      Stage::Pending => "待处理",
      Stage::Completed => "已完成",
    }
  }
}

/// Derive the stage from locator presence.
///
/// A model without a photo violates the record invariant; it is reported as
/// [`Stage::Absent`] because there is no photo to show.
pub fn derive_stage(photo: Option<&Locator>, model: Option<&Locator>) -> Stage {
  match (photo, model) {
    (None, _) => Stage::Absent,
    (Some(_), None) => Stage::Pending,
    (Some(_), Some(_)) => Stage::Completed,
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// One row per employee name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
  pub submission_id: Uuid,
  pub employee_name: String,
  pub photo_locator: Option<Locator>,
  pub model_locator: Option<Locator>,
  pub status:        SubmissionStatus,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

impl Submission {
  pub fn stage(&self) -> Stage {
    derive_stage(self.photo_locator.as_ref(), self.model_locator.as_ref())
  }
}

// ─── Partial updates ─────────────────────────────────────────────────────────

/// What to do with one optional column during an upsert or update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Change<T> {
  #[default]
  Keep,
  Set(T),
  Clear,
}

impl<T> Change<T> {
  /// Resolve against the current value of the column.
  pub fn apply(self, current: Option<T>) -> Option<T> {
    match self {
      Change::Keep => current,
      Change::Set(v) => Some(v),
      Change::Clear => None,
    }
  }

  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Change<U> {
    match self {
      Change::Keep => Change::Keep,
      Change::Set(v) => Change::Set(f(v)),
      Change::Clear => Change::Clear,
    }
  }
}

/// Field changes for [`SubmissionStore::upsert`](crate::store::SubmissionStore::upsert)
/// and [`SubmissionStore::update`](crate::store::SubmissionStore::update).
///
/// `updated_at` is always bumped by the store; `status: None` keeps the
/// stored tag (or `pending` on insert).
#[derive(Debug, Clone, Default)]
pub struct SubmissionPatch {
  pub photo:  Change<Locator>,
  pub model:  Change<Locator>,
  pub status: Option<SubmissionStatus>,
}
