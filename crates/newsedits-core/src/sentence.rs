//! Sentence fragments and their aggregation into one text block per
//! materialised revision.

use serde::{Deserialize, Serialize};

use crate::{index::RevisionIndexMap, stats::EntryId};

/// One row of `split_sentences`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceFragment {
  pub entry_id: EntryId,
  /// Stored as a numeric column; integral in practice.
  pub version:  f64,
  pub sentence: String,
}

/// Concatenated sentence text of one `(entity_id, version)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRevision {
  pub entity_id: EntryId,
  pub version:   f64,
  pub sentence:  String,
}

// ─── Table ───────────────────────────────────────────────────────────────────

/// All sentence fragments, sorted ascending by `(entry_id, version)`.
///
/// The sort is stable: fragments sharing a key keep their input order, and
/// that order decides the concatenated text.
#[derive(Debug, Clone, Default)]
pub struct SentenceTable {
  fragments: Vec<SentenceFragment>,
}

impl SentenceTable {
  pub fn new(mut fragments: Vec<SentenceFragment>) -> Self {
    fragments.sort_by(|a, b| {
      a.entry_id
        .cmp(&b.entry_id)
        .then(a.version.total_cmp(&b.version))
    });
    Self { fragments }
  }

  pub fn len(&self) -> usize { self.fragments.len() }

  pub fn is_empty(&self) -> bool { self.fragments.is_empty() }

  /// The contiguous run of fragments belonging to `entry_id`.
  fn entry(&self, entry_id: EntryId) -> &[SentenceFragment] {
    let start = self.fragments.partition_point(|f| f.entry_id < entry_id);
    let end = self.fragments.partition_point(|f| f.entry_id <= entry_id);
    &self.fragments[start..end]
  }

  /// Build one [`AggregatedRevision`] per requested `(entry_id, version)`
  /// that has at least one fragment.
  ///
  /// Requested versions with no fragments are skipped without a placeholder.
  /// Rows come out ordered by entry, then version.
  pub fn aggregate(&self, indices: &RevisionIndexMap) -> Vec<AggregatedRevision> {
    let mut rows = Vec::new();

    for (entry_id, requested) in indices.iter() {
      let selected: Vec<&SentenceFragment> = self
        .entry(entry_id)
        .iter()
        .filter(|f| f.version.fract() == 0.0 && requested.contains(&(f.version as i64)))
        .collect();

      for group in selected.chunk_by(|a, b| a.version == b.version) {
        let sentence: String = group.iter().map(|f| f.sentence.as_str()).collect();
        rows.push(AggregatedRevision {
          entity_id: entry_id,
          version: group[0].version,
          sentence,
        });
      }
    }

    rows
  }
}

#[cfg(test)]
pub(crate) fn fragment(entry_id: EntryId, version: f64, sentence: &str) -> SentenceFragment {
  SentenceFragment { entry_id, version, sentence: sentence.to_owned() }
}
