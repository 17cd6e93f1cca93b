//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs hyphenated lowercase, locators
//! verbatim.

use chrono::{DateTime, Utc};
use sculpt_core::{
  blob::Locator,
  submission::{Submission, SubmissionStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── SubmissionStatus ─────────────────────────────────────────────────────────

pub fn encode_status(s: SubmissionStatus) -> &'static str {
  match s {
    SubmissionStatus::Pending => "pending",
    SubmissionStatus::Processing => "processing",
    SubmissionStatus::Completed => "completed",
  }
}

pub fn decode_status(s: &str) -> Result<SubmissionStatus> {
  match s {
    "pending" => Ok(SubmissionStatus::Pending),
    "processing" => Ok(SubmissionStatus::Processing),
    "completed" => Ok(SubmissionStatus::Completed),
    other => Err(Error::UnknownStatus(other.to_owned())),
  }
}

// ─── Raw row ──────────────────────────────────────────────────────────────────

pub const SELECT_COLUMNS: &str = "submission_id, employee_name, photo_locator, \
                                  model_locator, status, created_at, updated_at";

/// A `submissions` row exactly as SQLite hands it back.
#[derive(Debug, Clone)]
pub struct RawSubmission {
  pub submission_id: String,
  pub employee_name: String,
  pub photo_locator: Option<String>,
  pub model_locator: Option<String>,
  pub status:        String,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawSubmission {
  /// Map a row selected with [`SELECT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      submission_id: row.get(0)?,
      employee_name: row.get(1)?,
      photo_locator: row.get(2)?,
      model_locator: row.get(3)?,
      status:        row.get(4)?,
      created_at:    row.get(5)?,
      updated_at:    row.get(6)?,
    })
  }

  pub fn into_submission(self) -> Result<Submission> {
    Ok(Submission {
      submission_id: decode_uuid(&self.submission_id)?,
      employee_name: self.employee_name,
      photo_locator: self.photo_locator.map(Locator::new),
      model_locator: self.model_locator.map(Locator::new),
      status:        decode_status(&self.status)?,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}
