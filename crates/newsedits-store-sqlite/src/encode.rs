//! Encoding and decoding helpers between domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, the run config as compact JSON
//! and labels as their integer value. Index columns of the input tables may
//! arrive as `REAL`; they are accepted when the value is a whole number.

use chrono::{DateTime, Utc};
use newsedits_core::{
  config::PipelineConfig,
  label::{Label, LabeledRevision},
  stats::RevisionStat,
  store::RunRecord,
};

use crate::{Error, Result, schema::DOC_LEVEL_STATS};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── PipelineConfig ──────────────────────────────────────────────────────────

pub fn encode_config(cfg: &PipelineConfig) -> Result<String> {
  Ok(serde_json::to_string(cfg)?)
}

pub fn decode_config(s: &str) -> Result<PipelineConfig> {
  Ok(serde_json::from_str(s)?)
}

// ─── Label ───────────────────────────────────────────────────────────────────

pub fn encode_label(label: Label) -> i64 { i64::from(label.as_u8()) }

pub fn decode_label(value: i64) -> Result<Label> { Ok(Label::try_from(value)?) }

// ─── Integral columns ────────────────────────────────────────────────────────

pub fn decode_integral(value: f64, table: &'static str, column: &'static str) -> Result<i64> {
  // Both bounds are exact in f64; the upper one is 2^63 and excluded.
  let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
  if value.fract() == 0.0 && in_range {
    Ok(value as i64)
  } else {
    Err(Error::NonIntegral { table, column, value })
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values of one `doc_level_stats` row, read as SQLite numerics.
pub struct RawRevisionStat {
  pub entry_id:        f64,
  pub version_x:       f64,
  pub version_y:       f64,
  pub num_sentences_y: f64,
  pub num_added:       Option<f64>,
}

impl RawRevisionStat {
  pub fn into_stat(self) -> Result<RevisionStat> {
    let integral = |value, column| decode_integral(value, DOC_LEVEL_STATS, column);
    Ok(RevisionStat {
      entry_id:        integral(self.entry_id, "entry_id")?,
      version_x:       integral(self.version_x, "version_x")?,
      version_y:       integral(self.version_y, "version_y")?,
      num_sentences_y: integral(self.num_sentences_y, "num_sentences_y")?,
      num_added:       self.num_added.unwrap_or(f64::NAN),
    })
  }
}

/// Raw values of one `labeled_revisions` row.
pub struct RawLabeledRevision {
  pub entity_id: i64,
  pub version:   f64,
  pub sentence:  String,
  pub label:     i64,
}

impl RawLabeledRevision {
  pub fn from_labeled(row: &LabeledRevision) -> Self {
    Self {
      entity_id: row.entity_id,
      version:   row.version,
      sentence:  row.sentence.clone(),
      label:     encode_label(row.label),
    }
  }

  pub fn into_labeled(self) -> Result<LabeledRevision> {
    Ok(LabeledRevision {
      entity_id: self.entity_id,
      version:   self.version,
      sentence:  self.sentence,
      label:     decode_label(self.label)?,
    })
  }
}

/// Raw values of one `pipeline_runs` row.
pub struct RawRun {
  pub started_at:   String,
  pub finished_at:  String,
  pub labeled_rows: i64,
  pub dropped_rows: i64,
  pub config_json:  String,
}

impl RawRun {
  pub fn from_record(run: &RunRecord) -> Result<Self> {
    Ok(Self {
      started_at:   encode_dt(run.started_at),
      finished_at:  encode_dt(run.finished_at),
      labeled_rows: i64::try_from(run.labeled_rows)?,
      dropped_rows: i64::try_from(run.dropped_rows)?,
      config_json:  encode_config(&run.config)?,
    })
  }

  pub fn into_record(self) -> Result<RunRecord> {
    Ok(RunRecord {
      started_at:   decode_dt(&self.started_at)?,
      finished_at:  decode_dt(&self.finished_at)?,
      labeled_rows: usize::try_from(self.labeled_rows)?,
      dropped_rows: usize::try_from(self.dropped_rows)?,
      config:       decode_config(&self.config_json)?,
    })
  }
}
