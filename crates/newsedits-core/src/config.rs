//! Tunable parameters for the labeling pipeline.
//!
//! Every value has a named default; the binary layers a TOML file and
//! `NEWSEDITS__*` environment variables on top of these.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Transitions must end strictly below this version to be selected.
pub const DEFAULT_VERSION_CEILING: i64 = 20;
/// Inclusive lower bound on `num_sentences_y`.
pub const DEFAULT_MIN_SENTENCES: i64 = 5;
/// Inclusive upper bound on `num_sentences_y`.
pub const DEFAULT_MAX_SENTENCES: i64 = 15;
/// `num_added` at or above this is at least a minor edit.
pub const DEFAULT_MINOR_THRESHOLD: f64 = 1.0;
/// `num_added` at or above this is a major edit.
pub const DEFAULT_MAJOR_THRESHOLD: f64 = 3.0;

// ─── Thresholds ──────────────────────────────────────────────────────────────

/// Bucket boundaries for [`Label`](crate::label::Label) classification.
/// Each bucket is closed below and open above.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelThresholds {
  pub minor: f64,
  pub major: f64,
}

impl Default for LabelThresholds {
  fn default() -> Self {
    Self {
      minor: DEFAULT_MINOR_THRESHOLD,
      major: DEFAULT_MAJOR_THRESHOLD,
    }
  }
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
  pub version_ceiling: i64,
  pub min_sentences:   i64,
  pub max_sentences:   i64,
  pub thresholds:      LabelThresholds,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      version_ceiling: DEFAULT_VERSION_CEILING,
      min_sentences:   DEFAULT_MIN_SENTENCES,
      max_sentences:   DEFAULT_MAX_SENTENCES,
      thresholds:      LabelThresholds::default(),
    }
  }
}

impl PipelineConfig {
  /// Reject ranges that can never match and thresholds out of order.
  pub fn validate(&self) -> Result<()> {
    if self.min_sentences > self.max_sentences {
      return Err(Error::InvalidConfig(format!(
        "min_sentences ({}) exceeds max_sentences ({})",
        self.min_sentences, self.max_sentences
      )));
    }

    let LabelThresholds { minor, major } = self.thresholds;
    // Written as a negation so NaN is rejected too.
    if !(minor <= major) {
      return Err(Error::InvalidConfig(format!(
        "minor threshold ({minor}) must not exceed major threshold ({major})"
      )));
    }

    Ok(())
  }
}
