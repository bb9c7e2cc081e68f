//! SQL schema for the newsedits SQLite store.
//!
//! The two input tables are produced elsewhere and only checked, never
//! created. The output tables are created on first write.

/// Input table of per-transition statistics.
pub const DOC_LEVEL_STATS: &str = "doc_level_stats";

/// Input table of sentence fragments.
pub const SPLIT_SENTENCES: &str = "split_sentences";

/// What a required input column must be readable as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
  Numeric,
  Text,
}

impl ColumnKind {
  pub fn name(self) -> &'static str {
    match self {
      Self::Numeric => "a numeric type",
      Self::Text => "a text type",
    }
  }

  /// Whether a column declared as `declared` can hold this kind, following
  /// SQLite's type-affinity rules. Untyped columns are accepted.
  pub fn accepts(self, declared: &str) -> bool {
    let t = declared.to_ascii_uppercase();
    let has = |needle: &str| t.contains(needle);

    if t.is_empty() || has("BLOB") {
      return true;
    }
    let text = !has("INT") && (has("CHAR") || has("CLOB") || has("TEXT"));
    match self {
      Self::Numeric => !text,
      Self::Text => text,
    }
  }
}

/// Columns the pipeline reads from each input table. Extra columns are
/// ignored.
pub const REQUIRED_COLUMNS: &[(&str, &[(&str, ColumnKind)])] = &[
  (
    DOC_LEVEL_STATS,
    &[
      ("entry_id", ColumnKind::Numeric),
      ("version_x", ColumnKind::Numeric),
      ("version_y", ColumnKind::Numeric),
      ("num_sentences_y", ColumnKind::Numeric),
      ("num_added", ColumnKind::Numeric),
    ],
  ),
  (
    SPLIT_SENTENCES,
    &[
      ("entry_id", ColumnKind::Numeric),
      ("version", ColumnKind::Numeric),
      ("sentence", ColumnKind::Text),
    ],
  ),
];

/// Output DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const OUTPUT_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS labeled_revisions (
    entity_id INTEGER NOT NULL,
    version   REAL    NOT NULL,
    sentence  TEXT    NOT NULL,
    label     INTEGER NOT NULL CHECK (label IN (0, 1, 2))
);

-- One row per pipeline run that wrote output.
CREATE TABLE IF NOT EXISTS pipeline_runs (
    run_id       INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at   TEXT    NOT NULL,   -- RFC 3339 UTC
    finished_at  TEXT    NOT NULL,   -- RFC 3339 UTC
    labeled_rows INTEGER NOT NULL,
    dropped_rows INTEGER NOT NULL,
    config_json  TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS labeled_revisions_entity_idx
    ON labeled_revisions(entity_id, version);
";
