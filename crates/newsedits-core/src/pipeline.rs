//! End-to-end pipeline: filter → reconstruct → aggregate → label.
//!
//! [`run`] is the pure in-memory transform. [`execute`] wraps it with loading
//! from and writing to a [`RevisionStore`].

use chrono::Utc;
use serde::Serialize;

use crate::{
  Error, Result,
  config::PipelineConfig,
  index::RevisionIndexMap,
  label::{CaseLabeler, DropReason, LabelReport},
  sentence::{SentenceFragment, SentenceTable},
  stats::{RevisionStat, StatsFilter},
  store::{RevisionStore, RunRecord},
};

/// Row counts observed at each stage of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineSummary {
  pub stats_rows:        usize,
  pub filtered_rows:     usize,
  pub documents:         usize,
  pub requested_indices: usize,
  pub sentence_rows:     usize,
  pub aggregated_rows:   usize,
  pub labeled_rows:      usize,
  pub dropped_rows:      usize,
  /// Labeled rows per label, indexed `0..=2`.
  pub label_counts:      [usize; 3],
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
  pub report:  LabelReport,
  pub summary: PipelineSummary,
}

/// Run every stage over fully loaded tables.
pub fn run(
  stats: &[RevisionStat],
  sentences: Vec<SentenceFragment>,
  config: &PipelineConfig,
) -> Result<PipelineOutput> {
  config.validate()?;

  let views = StatsFilter::from_config(config).apply(stats);
  tracing::info!(
    total = views.all.len(),
    kept = views.filtered.len(),
    "filtered revision stats"
  );

  let indices = RevisionIndexMap::build(views.filtered.iter().copied());
  tracing::info!(
    documents = indices.len(),
    indices = indices.total_indices(),
    "reconstructed revision indices"
  );

  let table = SentenceTable::new(sentences);
  let aggregated = table.aggregate(&indices);
  tracing::info!(
    fragments = table.len(),
    revisions = aggregated.len(),
    "aggregated sentences"
  );

  let aggregated_rows = aggregated.len();
  let report = CaseLabeler::new(views.all, config.thresholds).label(aggregated);

  if report.dropped_count() > 0 {
    let ambiguous = report
      .dropped
      .iter()
      .filter(|d| d.reason == DropReason::AmbiguousStats)
      .count();
    tracing::warn!(
      dropped = report.dropped_count(),
      ambiguous,
      "dropped revisions without a unique stats row"
    );
  }

  let summary = PipelineSummary {
    stats_rows: views.all.len(),
    filtered_rows: views.filtered.len(),
    documents: indices.len(),
    requested_indices: indices.total_indices(),
    sentence_rows: table.len(),
    aggregated_rows,
    labeled_rows: report.labeled.len(),
    dropped_rows: report.dropped_count(),
    label_counts: report.histogram(),
  };
  tracing::info!(
    labeled = summary.labeled_rows,
    dropped = summary.dropped_rows,
    "labeled revisions"
  );

  Ok(PipelineOutput { report, summary })
}

/// Load both input tables from `store`, run the pipeline and, unless
/// `dry_run`, write the labeled rows back.
pub async fn execute<S>(store: &S, config: &PipelineConfig, dry_run: bool) -> Result<PipelineOutput>
where
  S: RevisionStore,
{
  let started_at = Utc::now();

  store.validate_schema().await.map_err(Error::store)?;
  let stats = store.load_doc_stats().await.map_err(Error::store)?;
  let sentences = store.load_sentences().await.map_err(Error::store)?;

  let output = run(&stats, sentences, config)?;

  if dry_run {
    tracing::info!("dry run, skipping output tables");
    return Ok(output);
  }

  let record = RunRecord {
    started_at,
    finished_at: Utc::now(),
    labeled_rows: output.summary.labeled_rows,
    dropped_rows: output.summary.dropped_rows,
    config: *config,
  };
  store
    .write_labeled(&record, &output.report.labeled)
    .await
    .map_err(Error::store)?;

  Ok(output)
}
