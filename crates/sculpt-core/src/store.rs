//! The `SubmissionStore` trait.
//!
//! Implemented by record backends (e.g. `sculpt-store-sqlite`). The lifecycle
//! manager and the HTTP layer depend on this abstraction only.

use std::future::Future;

use crate::submission::{Submission, SubmissionPatch};

/// Abstraction over the submission table, keyed by employee name.
///
/// "Not found" is a value (`None` / `false`), never an error.
pub trait SubmissionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn find_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + 'a;

  /// Apply `patch` to the row for `name`, inserting a fresh row if none
  /// exists. Runs as one transaction.
  fn upsert<'a>(
    &'a self,
    name: &'a str,
    patch: SubmissionPatch,
  ) -> impl Future<Output = Result<Submission, Self::Error>> + Send + 'a;

  /// Apply `patch` to an existing row. Returns `None` if there is no row.
  fn update<'a>(
    &'a self,
    name: &'a str,
    patch: SubmissionPatch,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + 'a;

  /// Remove the row. Returns `false` if there was no row.
  fn delete_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// All rows, ordered by employee name.
  fn list(&self) -> impl Future<Output = Result<Vec<Submission>, Self::Error>> + Send + '_;

  /// Cheap round-trip used by health checks.
  fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
