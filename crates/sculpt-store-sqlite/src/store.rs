//! [`SqliteStore`]: the SQLite implementation of [`SubmissionStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use sculpt_core::{
  store::SubmissionStore,
  submission::{Change, Submission, SubmissionPatch, SubmissionStatus},
};

use crate::{
  Result,
  encode::{RawSubmission, SELECT_COLUMNS, encode_dt, encode_status, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A submission table backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted. Every call
/// runs on the connection's single worker thread, so each upsert/update is
/// serialised against all others.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// A [`SubmissionPatch`] lowered to column values so it can cross into the
/// connection thread.
struct RawPatch {
  photo:      Change<String>,
  model:      Change<String>,
  status:     Option<&'static str>,
  updated_at: String,
}

impl RawPatch {
  fn new(patch: SubmissionPatch) -> Self {
    Self {
      photo:      patch.photo.map(|l| l.as_str().to_owned()),
      model:      patch.model.map(|l| l.as_str().to_owned()),
      status:     patch.status.map(encode_status),
      updated_at: encode_dt(Utc::now()),
    }
  }

  fn apply(self, row: &mut RawSubmission) {
    row.photo_locator = self.photo.apply(row.photo_locator.take());
    row.model_locator = self.model.apply(row.model_locator.take());
    if let Some(status) = self.status {
      row.status = status.to_owned();
    }
    row.updated_at = self.updated_at;
  }
}

fn select_by_name(
  conn: &rusqlite::Connection,
  name: &str,
) -> rusqlite::Result<Option<RawSubmission>> {
  conn
    .query_row(
      &format!("SELECT {SELECT_COLUMNS} FROM submissions WHERE employee_name = ?1"),
      rusqlite::params![name],
      RawSubmission::from_row,
    )
    .optional()
}

fn write_back(conn: &rusqlite::Connection, row: &RawSubmission) -> rusqlite::Result<()> {
  conn.execute(
    "UPDATE submissions
        SET photo_locator = ?2, model_locator = ?3, status = ?4, updated_at = ?5
      WHERE employee_name = ?1",
    rusqlite::params![
      row.employee_name,
      row.photo_locator,
      row.model_locator,
      row.status,
      row.updated_at,
    ],
  )?;
  Ok(())
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store: useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SubmissionStore impl ────────────────────────────────────────────────────

impl SubmissionStore for SqliteStore {
  type Error = crate::Error;

  async fn find_by_name(&self, name: &str) -> Result<Option<Submission>> {
    let name = name.to_owned();

    let raw = self
      .conn
      .call(move |conn| Ok(select_by_name(conn, &name)?))
      .await?;

    raw.map(RawSubmission::into_submission).transpose()
  }

  async fn upsert(&self, name: &str, patch: SubmissionPatch) -> Result<Submission> {
    let name  = name.to_owned();
    let patch = RawPatch::new(patch);
    let fresh_id = encode_uuid(Uuid::new_v4());

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let row = match select_by_name(&tx, &name)? {
          Some(mut row) => {
            patch.apply(&mut row);
            write_back(&tx, &row)?;
            row
          }
          None => {
            let mut row = RawSubmission {
              submission_id: fresh_id,
              employee_name: name,
              photo_locator: None,
              model_locator: None,
              status:        encode_status(SubmissionStatus::Pending).to_owned(),
              created_at:    patch.updated_at.clone(),
              updated_at:    String::new(),
            };
            patch.apply(&mut row);
            tx.execute(
              "INSERT INTO submissions (
                 submission_id, employee_name, photo_locator, model_locator,
                 status, created_at, updated_at
               ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
              rusqlite::params![
                row.submission_id,
                row.employee_name,
                row.photo_locator,
                row.model_locator,
                row.status,
                row.created_at,
                row.updated_at,
              ],
            )?;
            row
          }
        };

        tx.commit()?;
        Ok(row)
      })
      .await?;

    raw.into_submission()
  }

  async fn update(&self, name: &str, patch: SubmissionPatch) -> Result<Option<Submission>> {
    let name  = name.to_owned();
    let patch = RawPatch::new(patch);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(mut row) = select_by_name(&tx, &name)? else {
          return Ok(None);
        };
        patch.apply(&mut row);
        write_back(&tx, &row)?;
        tx.commit()?;
        Ok(Some(row))
      })
      .await?;

    raw.map(RawSubmission::into_submission).transpose()
  }

  async fn delete_by_name(&self, name: &str) -> Result<bool> {
    let name = name.to_owned();

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM submissions WHERE employee_name = ?1",
          rusqlite::params![name],
        )?)
      })
      .await?;

    Ok(affected > 0)
  }

  async fn list(&self) -> Result<Vec<Submission>> {
    let raws: Vec<RawSubmission> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SELECT_COLUMNS} FROM submissions ORDER BY employee_name"
        ))?;
        let rows = stmt
          .query_map([], RawSubmission::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubmission::into_submission).collect()
  }

  async fn ping(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
