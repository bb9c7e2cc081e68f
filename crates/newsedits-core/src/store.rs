//! The `RevisionStore` trait and the run record it persists.
//!
//! The trait is implemented by storage backends (e.g.
//! `newsedits-store-sqlite`). The pipeline and the binary depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  config::PipelineConfig,
  label::LabeledRevision,
  sentence::SentenceFragment,
  stats::RevisionStat,
};

// ─── Run record ──────────────────────────────────────────────────────────────

/// Audit metadata written next to the labeled rows of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
  pub started_at:   DateTime<Utc>,
  pub finished_at:  DateTime<Utc>,
  pub labeled_rows: usize,
  pub dropped_rows: usize,
  pub config:       PipelineConfig,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Source of the two input tables and sink for the labeled dataset.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait RevisionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Check that both input tables exist with the columns the pipeline
  /// reads. Called before any load so schema problems surface early.
  fn validate_schema(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Every row of `doc_level_stats`.
  fn load_doc_stats(
    &self,
  ) -> impl Future<Output = Result<Vec<RevisionStat>, Self::Error>> + Send + '_;

  /// Every row of `split_sentences`, ascending by `(entry_id, version)`.
  fn load_sentences(
    &self,
  ) -> impl Future<Output = Result<Vec<SentenceFragment>, Self::Error>> + Send + '_;

  /// Replace the stored dataset with `rows` and append `run` to the audit
  /// log, atomically.
  fn write_labeled<'a>(
    &'a self,
    run: &'a RunRecord,
    rows: &'a [LabeledRevision],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
