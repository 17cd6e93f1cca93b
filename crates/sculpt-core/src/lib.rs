//! Core types and trait definitions for the Sculpt submission portal.
//!
//! The record store and blob store are traits here; backends live in their
//! own crates. [`SubmissionLifecycle`] coordinates the two.

// Trait methods spell out `impl Future + Send`; impls use plain `async fn`.
#![allow(async_fn_in_trait)]

pub mod blob;
pub mod error;
pub mod key;
pub mod lifecycle;
pub mod store;
pub mod submission;

pub use error::{Error, Result};
pub use lifecycle::{Limits, SubmissionLifecycle, Upload};
