//! Revision-transition statistics and the row filter applied to them.
//!
//! The unfiltered table is kept alongside the filtered view: index
//! reconstruction only sees the filtered rows, but label lookups search the
//! whole table.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;

/// Identifier of a versioned document.
pub type EntryId = i64;

/// One row of `doc_level_stats`: the transition `version_x → version_y` of a
/// single document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionStat {
  pub entry_id:        EntryId,
  pub version_x:       i64,
  pub version_y:       i64,
  /// Sentence count at `version_y`.
  pub num_sentences_y: i64,
  /// Sentences added by this transition; NaN when the source value is NULL.
  pub num_added:       f64,
}

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Selects transitions below a version ceiling whose target revision has a
/// sentence count inside an inclusive range.
#[derive(Debug, Clone)]
pub struct StatsFilter {
  version_ceiling: i64,
  sentences:       RangeInclusive<i64>,
}

/// Both views produced by [`StatsFilter::apply`].
#[derive(Debug, Clone)]
pub struct StatsViews<'a> {
  pub all:      &'a [RevisionStat],
  /// Matching rows in their original order.
  pub filtered: Vec<&'a RevisionStat>,
}

impl StatsFilter {
  pub fn new(version_ceiling: i64, sentences: RangeInclusive<i64>) -> Self {
    Self { version_ceiling, sentences }
  }

  pub fn from_config(config: &PipelineConfig) -> Self {
    Self::new(
      config.version_ceiling,
      config.min_sentences..=config.max_sentences,
    )
  }

  pub fn accepts(&self, stat: &RevisionStat) -> bool {
    stat.version_y < self.version_ceiling
      && self.sentences.contains(&stat.num_sentences_y)
  }

  pub fn apply<'a>(&self, stats: &'a [RevisionStat]) -> StatsViews<'a> {
    let filtered = stats.iter().filter(|s| self.accepts(s)).collect();
    StatsViews { all: stats, filtered }
  }
}

#[cfg(test)]
pub(crate) fn stat(
  entry_id: EntryId,
  version_x: i64,
  version_y: i64,
  num_sentences_y: i64,
  num_added: f64,
) -> RevisionStat {
  RevisionStat { entry_id, version_x, version_y, num_sentences_y, num_added }
}
