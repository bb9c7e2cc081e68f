//! [`SqliteStore`] — the SQLite implementation of [`RevisionStore`].

use std::path::Path;

use newsedits_core::{
  label::LabeledRevision,
  sentence::SentenceFragment,
  stats::RevisionStat,
  store::{RevisionStore, RunRecord},
};

use crate::{
  encode::{RawLabeledRevision, RawRevisionStat, RawRun},
  schema::{DOC_LEVEL_STATS, OUTPUT_SCHEMA, REQUIRED_COLUMNS, SPLIT_SENTENCES},
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A newsedits database backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) the database at `path`. Input tables are not touched.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Ok(Self { conn })
  }

  /// Open an in-memory database — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Ok(Self { conn })
  }

  /// Column names and declared types of `table`; empty when the table does
  /// not exist.
  pub(crate) async fn table_columns(
    &self,
    table: &'static str,
  ) -> Result<Vec<(String, String)>> {
    let columns = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare("SELECT name, type FROM pragma_table_info(?1)")?;
        let columns = stmt
          .query_map(rusqlite::params![table], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<(String, String)>>>()?;
        Ok(columns)
      })
      .await?;
    Ok(columns)
  }

  /// Read back the dataset written by the last run.
  pub async fn load_labeled(&self) -> Result<Vec<LabeledRevision>> {
    let raws: Vec<RawLabeledRevision> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT entity_id, version, sentence, label
           FROM labeled_revisions
           ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawLabeledRevision {
              entity_id: row.get(0)?,
              version:   row.get(1)?,
              sentence:  row.get(2)?,
              label:     row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLabeledRevision::into_labeled).collect()
  }

  /// Every recorded run, oldest first.
  pub async fn load_runs(&self) -> Result<Vec<RunRecord>> {
    let raws: Vec<RawRun> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT started_at, finished_at, labeled_rows, dropped_rows, config_json
           FROM pipeline_runs
           ORDER BY run_id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawRun {
              started_at:   row.get(0)?,
              finished_at:  row.get(1)?,
              labeled_rows: row.get(2)?,
              dropped_rows: row.get(3)?,
              config_json:  row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRun::into_record).collect()
  }
}

// ─── RevisionStore impl ──────────────────────────────────────────────────────

impl RevisionStore for SqliteStore {
  type Error = Error;

  async fn validate_schema(&self) -> Result<()> {
    for &(table, required) in REQUIRED_COLUMNS {
      let present = self.table_columns(table).await?;
      if present.is_empty() {
        return Err(Error::MissingTable(table));
      }
      for &(column, kind) in required {
        let Some((_, declared)) = present.iter().find(|(name, _)| name == column) else {
          return Err(Error::MissingColumn { table, column });
        };
        if !kind.accepts(declared) {
          return Err(Error::ColumnType {
            table,
            column,
            declared: declared.clone(),
            expected: kind.name(),
          });
        }
      }
    }
    Ok(())
  }

  async fn load_doc_stats(&self) -> Result<Vec<RevisionStat>> {
    // Read as REAL so integer-valued REAL columns load too; whole-number
    // checks happen in `into_stat`.
    let raws: Vec<RawRevisionStat> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT entry_id, version_x, version_y, num_sentences_y, num_added
           FROM {DOC_LEVEL_STATS}"
        ))?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawRevisionStat {
              entry_id:        row.get(0)?,
              version_x:       row.get(1)?,
              version_y:       row.get(2)?,
              num_sentences_y: row.get(3)?,
              num_added:       row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let stats = raws
      .into_iter()
      .map(RawRevisionStat::into_stat)
      .collect::<Result<Vec<_>>>()?;
    tracing::debug!(rows = stats.len(), "loaded {DOC_LEVEL_STATS}");
    Ok(stats)
  }

  async fn load_sentences(&self) -> Result<Vec<SentenceFragment>> {
    // rowid breaks ties so fragments of one revision keep insertion order.
    let fragments = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT entry_id, version, sentence
           FROM {SPLIT_SENTENCES}
           ORDER BY entry_id, version, rowid"
        ))?;
        let rows = stmt
          .query_map([], |row| {
            Ok(SentenceFragment {
              entry_id: row.get(0)?,
              version:  row.get(1)?,
              sentence: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    tracing::debug!(rows = fragments.len(), "loaded {SPLIT_SENTENCES}");
    Ok(fragments)
  }

  async fn write_labeled(&self, run: &RunRecord, rows: &[LabeledRevision]) -> Result<()> {
    let raw_run = RawRun::from_record(run)?;
    let raw_rows: Vec<RawLabeledRevision> =
      rows.iter().map(RawLabeledRevision::from_labeled).collect();
    let count = raw_rows.len();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute_batch(OUTPUT_SCHEMA)?;
        tx.execute("DELETE FROM labeled_revisions", [])?;

        {
          let mut stmt = tx.prepare(
            "INSERT INTO labeled_revisions (entity_id, version, sentence, label)
             VALUES (?1, ?2, ?3, ?4)",
          )?;
          for row in &raw_rows {
            stmt.execute(rusqlite::params![
              row.entity_id,
              row.version,
              row.sentence,
              row.label,
            ])?;
          }
        }

        tx.execute(
          "INSERT INTO pipeline_runs (
             started_at, finished_at, labeled_rows, dropped_rows, config_json
           ) VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            raw_run.started_at,
            raw_run.finished_at,
            raw_run.labeled_rows,
            raw_run.dropped_rows,
            raw_run.config_json,
          ],
        )?;

        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::info!(rows = count, "wrote labeled_revisions");
    Ok(())
  }
}
