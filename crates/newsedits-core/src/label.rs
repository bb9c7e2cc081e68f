//! Edit-magnitude labels and the labeler that assigns them.
//!
//! Revision 0 is always [`Label::Unchanged`]. Any other revision is labeled
//! from the single stats row whose `version_y` matches it; rows with no such
//! match (or more than one) are dropped and reported.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
  Error,
  config::LabelThresholds,
  sentence::AggregatedRevision,
  stats::{EntryId, RevisionStat},
};

// ─── Label ───────────────────────────────────────────────────────────────────

/// Discrete edit-magnitude bucket, serialised as `0`, `1` or `2`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum Label {
  Unchanged = 0,
  Minor     = 1,
  Major     = 2,
}

impl Label {
  /// Bucket `num_added` into `[0, minor)`, `[minor, major)` or the rest.
  ///
  /// Anything outside the first two buckets is `Major`, negative counts
  /// included.
  pub fn classify(num_added: f64, thresholds: &LabelThresholds) -> Self {
    if num_added >= 0.0 && num_added < thresholds.minor {
      Self::Unchanged
    } else if num_added >= thresholds.minor && num_added < thresholds.major {
      Self::Minor
    } else {
      Self::Major
    }
  }

  pub fn as_u8(self) -> u8 { self as u8 }
}

impl From<Label> for u8 {
  fn from(label: Label) -> Self { label.as_u8() }
}

impl TryFrom<u8> for Label {
  type Error = Error;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Self::try_from(i64::from(value))
  }
}

impl TryFrom<i64> for Label {
  type Error = Error;

  fn try_from(value: i64) -> Result<Self, Self::Error> {
    match value {
      0 => Ok(Self::Unchanged),
      1 => Ok(Self::Minor),
      2 => Ok(Self::Major),
      other => Err(Error::UnknownLabel(other)),
    }
  }
}

// ─── Output rows ─────────────────────────────────────────────────────────────

/// A final dataset row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledRevision {
  pub entity_id: EntryId,
  pub version:   f64,
  pub sentence:  String,
  pub label:     Label,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
  /// No stats row for this `(entry_id, version_y)`.
  MissingStats,
  /// Several stats rows share this `(entry_id, version_y)`.
  AmbiguousStats,
}

/// A row excluded from the dataset, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedRevision {
  pub entity_id: EntryId,
  pub version:   f64,
  pub reason:    DropReason,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelReport {
  pub labeled: Vec<LabeledRevision>,
  pub dropped: Vec<DroppedRevision>,
}

impl LabelReport {
  pub fn dropped_count(&self) -> usize { self.dropped.len() }

  pub fn count(&self, label: Label) -> usize {
    self.labeled.iter().filter(|r| r.label == label).count()
  }

  /// Row counts per label, indexed by `Label as usize`.
  pub fn histogram(&self) -> [usize; 3] {
    let mut counts = [0; 3];
    for row in &self.labeled {
      counts[row.label as usize] += 1;
    }
    counts
  }
}

// ─── Labeler ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum StatsMatch {
  One(f64),
  Many,
}

/// Labels aggregated revisions against the full stats table.
#[derive(Debug, Clone)]
pub struct CaseLabeler {
  lookup:     HashMap<(EntryId, i64), StatsMatch>,
  thresholds: LabelThresholds,
}

impl CaseLabeler {
  pub fn new<'a, I>(stats: I, thresholds: LabelThresholds) -> Self
  where
    I: IntoIterator<Item = &'a RevisionStat>,
  {
    let mut lookup = HashMap::new();
    for stat in stats {
      lookup
        .entry((stat.entry_id, stat.version_y))
        .and_modify(|m| *m = StatsMatch::Many)
        .or_insert(StatsMatch::One(stat.num_added));
    }
    Self { lookup, thresholds }
  }

  /// Label a single `(entity_id, version)`.
  pub fn label_for(&self, entity_id: EntryId, version: f64) -> Result<Label, DropReason> {
    if version == 0.0 {
      return Ok(Label::Unchanged);
    }

    match self.lookup.get(&(entity_id, version.trunc() as i64)) {
      Some(StatsMatch::One(num_added)) => {
        Ok(Label::classify(*num_added, &self.thresholds))
      }
      Some(StatsMatch::Many) => Err(DropReason::AmbiguousStats),
      None => Err(DropReason::MissingStats),
    }
  }

  pub fn label(&self, rows: Vec<AggregatedRevision>) -> LabelReport {
    let mut report = LabelReport::default();

    for row in rows {
      match self.label_for(row.entity_id, row.version) {
        Ok(label) => report.labeled.push(LabeledRevision {
          entity_id: row.entity_id,
          version: row.version,
          sentence: row.sentence,
          label,
        }),
        Err(reason) => report.dropped.push(DroppedRevision {
          entity_id: row.entity_id,
          version: row.version,
          reason,
        }),
      }
    }

    report
  }
}
