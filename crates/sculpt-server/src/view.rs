//! JSON views returned by the HTTP surface.

use sculpt_core::submission::{Stage, Submission};
use serde::Serialize;

/// A submission plus its derived stage and display label.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionView {
  #[serde(flatten)]
  pub submission:  Submission,
  pub stage:       Stage,
  pub stage_label: &'static str,
}

impl From<Submission> for SubmissionView {
  fn from(submission: Submission) -> Self {
    let stage = submission.stage();
    Self { submission, stage, stage_label: stage.label() }
  }
}

/// One line of the admin table. Employees without a submission still appear,
/// with stage `none`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
  pub employee_name: String,
  pub stage:         Stage,
  pub stage_label:   &'static str,
  pub submission:    Option<SubmissionView>,
}

impl RosterEntry {
  pub fn new(employee_name: impl Into<String>, submission: Option<Submission>) -> Self {
    let submission = submission.map(SubmissionView::from);
    let stage = submission.as_ref().map_or(Stage::Absent, |v| v.stage);
    Self {
      employee_name: employee_name.into(),
      stage,
      stage_label: stage.label(),
      submission,
    }
  }
}
