//! Revision-index reconstruction.
//!
//! Each document contributes a handful of filtered transitions. From those we
//! derive the set of revision indices whose sentence text has to be
//! materialised: every transition endpoint, a baseline revision just before
//! the first edit, and (only when the run of indices is broken more than
//! once) the revision just before each jump.

use std::collections::{BTreeMap, BTreeSet};

use crate::stats::{EntryId, RevisionStat};

/// Strictly ascending revision indices for one document.
pub type RevisionIndexSet = BTreeSet<i64>;

/// A `(version_x, version_y)` pair.
pub type Transition = (i64, i64);

// ─── Grouping ────────────────────────────────────────────────────────────────

/// Group transitions by document, keeping each group's row order.
pub fn group_transitions<'a, I>(stats: I) -> BTreeMap<EntryId, Vec<Transition>>
where
  I: IntoIterator<Item = &'a RevisionStat>,
{
  let mut groups: BTreeMap<EntryId, Vec<Transition>> = BTreeMap::new();
  for stat in stats {
    groups
      .entry(stat.entry_id)
      .or_default()
      .push((stat.version_x, stat.version_y));
  }
  groups
}

// ─── Reconstruction ──────────────────────────────────────────────────────────

/// Compute the revision indices to materialise for one document.
///
/// Input order is irrelevant: endpoints are deduplicated before anything
/// else happens. An empty slice yields an empty set.
pub fn reconstruct(transitions: &[Transition]) -> RevisionIndexSet {
  let mut indices: RevisionIndexSet =
    transitions.iter().flat_map(|&(x, y)| [x, y]).collect();

  let Some(&min) = indices.first() else {
    return indices;
  };
  if min > 0 {
    indices.insert(min - 1);
  }

  let sorted: Vec<i64> = indices.iter().copied().collect();
  let markers: Vec<i64> = sorted
    .windows(2)
    .filter(|w| w[1] - w[0] > 1)
    .map(|w| w[1] - 1)
    .collect();

  // A single gap is left open; markers only go in once there are two or more.
  if markers.len() > 1 {
    indices.extend(markers);
  }

  indices
}

/// Per-document index sets, keyed and iterated in ascending `entry_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevisionIndexMap {
  entries: BTreeMap<EntryId, RevisionIndexSet>,
}

impl RevisionIndexMap {
  /// Reconstruct index sets for every document present in `stats`.
  pub fn build<'a, I>(stats: I) -> Self
  where
    I: IntoIterator<Item = &'a RevisionStat>,
  {
    let entries = group_transitions(stats)
      .into_iter()
      .map(|(entry_id, transitions)| {
        let indices = reconstruct(&transitions);
        tracing::debug!(
          entry_id,
          transitions = transitions.len(),
          indices = indices.len(),
          "reconstructed revision indices"
        );
        (entry_id, indices)
      })
      .collect();
    Self { entries }
  }

  pub fn get(&self, entry_id: EntryId) -> Option<&RevisionIndexSet> {
    self.entries.get(&entry_id)
  }

  pub fn iter(&self) -> impl Iterator<Item = (EntryId, &RevisionIndexSet)> {
    self.entries.iter().map(|(id, set)| (*id, set))
  }

  /// Number of documents.
  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  /// Total number of requested indices across all documents.
  pub fn total_indices(&self) -> usize {
    self.entries.values().map(BTreeSet::len).sum()
  }
}

impl FromIterator<(EntryId, RevisionIndexSet)> for RevisionIndexMap {
  fn from_iter<T: IntoIterator<Item = (EntryId, RevisionIndexSet)>>(iter: T) -> Self {
    Self { entries: iter.into_iter().collect() }
  }
}
