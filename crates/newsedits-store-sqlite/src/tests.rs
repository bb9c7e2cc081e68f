//! Integration tests for `SqliteStore` against an in-memory database.

use newsedits_core::{
  config::PipelineConfig,
  label::Label,
  pipeline,
  store::RevisionStore,
};

use crate::{Error, SqliteStore};

const INPUT_TABLES: &str = "
CREATE TABLE doc_level_stats (
    entry_id        INTEGER,
    version_x       INTEGER,
    version_y       INTEGER,
    num_sentences_x INTEGER,
    num_sentences_y INTEGER,
    num_added       REAL,
    num_removed     REAL
);

CREATE TABLE split_sentences (
    entry_id    INTEGER,
    version     REAL,
    sent_idx    INTEGER,
    sentence    TEXT
);
";

type StatRow = (i64, i64, i64, i64, f64);
type SentenceRow = (i64, f64, &'static str);

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn seeded(stats: Vec<StatRow>, sentences: Vec<SentenceRow>) -> SqliteStore {
  let s = store().await;
  s.conn
    .call(move |conn| {
      conn.execute_batch(INPUT_TABLES)?;
      for (entry_id, x, y, n_y, added) in &stats {
        conn.execute(
          "INSERT INTO doc_level_stats
             (entry_id, version_x, version_y, num_sentences_x, num_sentences_y, num_added, num_removed)
           VALUES (?1, ?2, ?3, 0, ?4, ?5, 0)",
          rusqlite::params![entry_id, x, y, n_y, added],
        )?;
      }
      for (idx, (entry_id, version, sentence)) in sentences.iter().enumerate() {
        conn.execute(
          "INSERT INTO split_sentences (entry_id, version, sent_idx, sentence)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![entry_id, version, idx as i64, sentence],
        )?;
      }
      Ok(())
    })
    .await
    .expect("seed input tables");
  s
}

/// Document 3 with transitions (2,3), (5,6), (9,10) and text at 1..=3.
async fn document_three() -> SqliteStore {
  seeded(
    vec![
      (3, 2, 3, 8, 1.5),
      (3, 5, 6, 8, 0.0),
      (3, 9, 10, 8, 4.0),
      (3, 0, 1, 40, 0.5),
    ],
    vec![(3, 3.0, "c"), (3, 1.0, "a"), (3, 2.0, "b")],
  )
  .await
}

// ─── Schema validation ───────────────────────────────────────────────────────

#[tokio::test]
async fn validate_schema_accepts_seeded_tables() {
  let s = seeded(vec![], vec![]).await;
  s.validate_schema().await.unwrap();
}

#[tokio::test]
async fn validate_schema_reports_missing_table() {
  let s = store().await;
  let err = s.validate_schema().await.unwrap_err();
  assert!(matches!(err, Error::MissingTable("doc_level_stats")));
}

#[tokio::test]
async fn validate_schema_reports_missing_column() {
  let s = store().await;
  s.conn
    .call(|conn| {
      conn.execute_batch(
        "CREATE TABLE doc_level_stats (entry_id INTEGER, version_x INTEGER, version_y INTEGER, num_sentences_y INTEGER, num_added REAL);
         CREATE TABLE split_sentences (entry_id INTEGER, version REAL);",
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let err = s.validate_schema().await.unwrap_err();
  assert!(matches!(
    err,
    Error::MissingColumn { table: "split_sentences", column: "sentence" }
  ));
}

#[tokio::test]
async fn validate_schema_reports_text_typed_numeric_column() {
  let s = store().await;
  s.conn
    .call(|conn| {
      conn.execute_batch(
        "CREATE TABLE doc_level_stats (entry_id INTEGER, version_x TEXT, version_y INTEGER, num_sentences_y INTEGER, num_added REAL);
         CREATE TABLE split_sentences (entry_id INTEGER, version REAL, sentence TEXT);",
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let err = s.validate_schema().await.unwrap_err();
  assert!(matches!(
    err,
    Error::ColumnType { table: "doc_level_stats", column: "version_x", ref declared, .. }
      if declared == "TEXT"
  ));
}

#[tokio::test]
async fn validate_schema_reports_numeric_sentence_column() {
  let s = store().await;
  s.conn
    .call(|conn| {
      conn.execute_batch(
        "CREATE TABLE doc_level_stats (entry_id, version_x, version_y, num_sentences_y, num_added);
         CREATE TABLE split_sentences (entry_id INTEGER, version REAL, sentence INTEGER);",
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let err = s.validate_schema().await.unwrap_err();
  assert!(matches!(
    err,
    Error::ColumnType { table: "split_sentences", column: "sentence", .. }
  ));
}

// ─── Loading ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn load_doc_stats_reads_every_row() {
  let s = seeded(vec![(1, 0, 1, 6, 2.0)], vec![]).await;
  s.conn
    .call(|conn| {
      conn.execute(
        "INSERT INTO doc_level_stats (entry_id, version_x, version_y, num_sentences_y, num_added)
         VALUES (1, 1, 2, 7, 3)",
        [],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let stats = s.load_doc_stats().await.unwrap();
  assert_eq!(stats.len(), 2);
  assert!(stats.iter().any(|r| r.version_y == 2 && r.num_added == 3.0));
}

#[tokio::test]
async fn load_sentences_sorts_by_entry_and_version_keeping_insertion_order() {
  let s = seeded(
    vec![],
    vec![
      (2, 0.0, "x"),
      (1, 1.0, "b-first"),
      (1, 0.0, "a"),
      (1, 1.0, "b-second"),
    ],
  )
  .await;

  let got: Vec<_> = s
    .load_sentences()
    .await
    .unwrap()
    .into_iter()
    .map(|f| (f.entry_id, f.version, f.sentence))
    .collect();

  assert_eq!(
    got,
    vec![
      (1, 0.0, "a".to_owned()),
      (1, 1.0, "b-first".to_owned()),
      (1, 1.0, "b-second".to_owned()),
      (2, 0.0, "x".to_owned()),
    ]
  );
}

#[tokio::test]
async fn load_doc_stats_accepts_whole_number_real_versions() {
  let s = store().await;
  s.conn
    .call(|conn| {
      conn.execute_batch(
        "CREATE TABLE doc_level_stats (entry_id INTEGER, version_x REAL, version_y REAL, num_sentences_y REAL, num_added REAL);
         CREATE TABLE split_sentences (entry_id INTEGER, version REAL, sentence TEXT);
         INSERT INTO doc_level_stats VALUES (7, 0.0, 1.0, 6.0, 2.0), (7, 1.0, 2.0, 6.0, 4.0);
         INSERT INTO split_sentences VALUES (7, 0.0, 'a'), (7, 1.0, 'b'), (7, 2.0, 'c');",
      )?;
      Ok(())
    })
    .await
    .unwrap();

  s.validate_schema().await.unwrap();
  let stats = s.load_doc_stats().await.unwrap();
  assert_eq!(
    stats.iter().map(|r| (r.version_x, r.version_y)).collect::<Vec<_>>(),
    vec![(0, 1), (1, 2)]
  );

  let out = pipeline::execute(&s, &PipelineConfig::default(), true)
    .await
    .unwrap();
  let labels: Vec<_> = out.report.labeled.iter().map(|r| (r.version, r.label)).collect();
  assert_eq!(
    labels,
    vec![(0.0, Label::Unchanged), (1.0, Label::Minor), (2.0, Label::Major)]
  );
}

#[tokio::test]
async fn load_doc_stats_rejects_fractional_version() {
  let s = seeded(vec![], vec![]).await;
  s.conn
    .call(|conn| {
      conn.execute(
        "INSERT INTO doc_level_stats (entry_id, version_x, version_y, num_sentences_y, num_added)
         VALUES (1, 1, 1.5, 7, 3)",
        [],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let err = s.load_doc_stats().await.unwrap_err();
  assert!(matches!(
    err,
    Error::NonIntegral { table: "doc_level_stats", column: "version_y", value }
      if value == 1.5
  ));
}

#[tokio::test]
async fn null_added_count_labels_major_and_does_not_abort() {
  let s = document_three().await;
  s.conn
    .call(|conn| {
      // One row matched by a revision, one for an unrelated document.
      conn.execute_batch(
        "INSERT INTO doc_level_stats (entry_id, version_x, version_y, num_sentences_y, num_added)
         VALUES (4, 0, 1, 8, NULL), (9, 0, 1, 8, NULL);
         INSERT INTO split_sentences (entry_id, version, sentence)
         VALUES (4, 0.0, 'p'), (4, 1.0, 'q');",
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let stats = s.load_doc_stats().await.unwrap();
  assert_eq!(stats.iter().filter(|r| r.num_added.is_nan()).count(), 2);

  let out = pipeline::execute(&s, &PipelineConfig::default(), false)
    .await
    .unwrap();
  let doc_four: Vec<_> = out
    .report
    .labeled
    .iter()
    .filter(|r| r.entity_id == 4)
    .map(|r| (r.version, r.label))
    .collect();
  assert_eq!(doc_four, vec![(0.0, Label::Unchanged), (1.0, Label::Major)]);
  assert!(s.load_labeled().await.unwrap().iter().any(|r| r.entity_id == 3));
}

// ─── Pipeline against the store ──────────────────────────────────────────────

#[tokio::test]
async fn execute_writes_labeled_rows_and_run_record() {
  let s = document_three().await;

  let out = pipeline::execute(&s, &PipelineConfig::default(), false)
    .await
    .unwrap();
  assert_eq!(out.summary.aggregated_rows, 3);
  assert_eq!(out.report.dropped_count(), 1);

  let rows = s.load_labeled().await.unwrap();
  let got: Vec<_> = rows
    .iter()
    .map(|r| (r.entity_id, r.version, r.sentence.as_str(), r.label))
    .collect();
  assert_eq!(
    got,
    vec![(3, 1.0, "a", Label::Unchanged), (3, 3.0, "c", Label::Minor)]
  );

  let runs = s.load_runs().await.unwrap();
  assert_eq!(runs.len(), 1);
  assert_eq!(runs[0].labeled_rows, 2);
  assert_eq!(runs[0].dropped_rows, 1);
  assert_eq!(runs[0].config, PipelineConfig::default());
  assert!(runs[0].started_at <= runs[0].finished_at);
}

#[tokio::test]
async fn rerun_replaces_previous_output() {
  let s = document_three().await;

  pipeline::execute(&s, &PipelineConfig::default(), false)
    .await
    .unwrap();
  pipeline::execute(&s, &PipelineConfig::default(), false)
    .await
    .unwrap();

  assert_eq!(s.load_labeled().await.unwrap().len(), 2);
  assert_eq!(s.load_runs().await.unwrap().len(), 2);
}

#[tokio::test]
async fn dry_run_leaves_database_untouched() {
  let s = document_three().await;

  let out = pipeline::execute(&s, &PipelineConfig::default(), true)
    .await
    .unwrap();
  assert_eq!(out.report.labeled.len(), 2);

  assert!(s.table_columns("labeled_revisions").await.unwrap().is_empty());
  assert!(s.table_columns("pipeline_runs").await.unwrap().is_empty());
}

#[tokio::test]
async fn execute_fails_fast_on_missing_input_table() {
  let s = store().await;
  let err = pipeline::execute(&s, &PipelineConfig::default(), false)
    .await
    .unwrap_err();
  assert!(matches!(err, newsedits_core::Error::Store(_)));
  assert!(err.to_string().contains("doc_level_stats"));
}
