//! `newsedits` — builds the labeled revision dataset from a newsedits SQLite
//! database.
//!
//! Reads `newsedits.toml` (or the path given with `--config`), layers
//! `NEWSEDITS__*` environment variables on top, opens the database and runs
//! the pipeline. Output is written to the `labeled_revisions` table of the
//! same database and, with `--export`, to a JSON Lines file.
//!
//! ```
//! newsedits --db dailymail-matched-sentences.db --export labeled.jsonl
//! NEWSEDITS__PIPELINE__VERSION_CEILING=10 newsedits --dry-run
//! ```

use std::{
  fs::File,
  io::{BufWriter, Write},
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::Parser;
use newsedits_core::{config::PipelineConfig, label::LabeledRevision, pipeline};
use newsedits_store_sqlite::SqliteStore;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Build the labeled revision dataset")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "newsedits.toml")]
  config: PathBuf,

  /// SQLite database holding `doc_level_stats` and `split_sentences`.
  /// Overrides `db_path` from the config file.
  #[arg(long, value_name = "FILE")]
  db: Option<PathBuf>,

  /// Also write the labeled rows to this JSON Lines file.
  #[arg(long, value_name = "FILE")]
  export: Option<PathBuf>,

  /// Run the pipeline and print the summary without writing output tables.
  #[arg(long)]
  dry_run: bool,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the layered configuration.
#[derive(Deserialize)]
struct AppConfig {
  #[serde(default)]
  db_path:  Option<PathBuf>,
  #[serde(default)]
  pipeline: PipelineConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(
      config::Environment::with_prefix("NEWSEDITS")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .context("failed to read config file")?;

  let app_cfg: AppConfig = settings
    .try_deserialize()
    .context("failed to deserialise AppConfig")?;

  let db_path = resolve_db_path(cli.db.as_deref(), app_cfg.db_path.as_deref())?;
  if !db_path.exists() {
    anyhow::bail!("database not found at {db_path:?}");
  }

  let store = SqliteStore::open(&db_path)
    .await
    .with_context(|| format!("failed to open database at {db_path:?}"))?;

  tracing::info!(db = %db_path.display(), dry_run = cli.dry_run, "running pipeline");
  let output = pipeline::execute(&store, &app_cfg.pipeline, cli.dry_run)
    .await
    .context("pipeline failed")?;

  if let Some(path) = &cli.export {
    export_jsonl(path, &output.report.labeled)
      .with_context(|| format!("failed to export to {path:?}"))?;
    tracing::info!(path = %path.display(), rows = output.report.labeled.len(), "exported");
  }

  println!("{}", serde_json::to_string_pretty(&output.summary)?);

  Ok(())
}

/// CLI flag wins over the config value; a leading `~` is expanded.
fn resolve_db_path(flag: Option<&Path>, configured: Option<&Path>) -> anyhow::Result<PathBuf> {
  flag
    .or(configured)
    .map(expand_tilde)
    .context("no database given; pass --db or set db_path in the config")
}

/// Write one JSON object per row.
fn export_jsonl(path: &Path, rows: &[LabeledRevision]) -> anyhow::Result<()> {
  let mut out = BufWriter::new(File::create(path)?);
  for row in rows {
    serde_json::to_writer(&mut out, row)?;
    out.write_all(b"\n")?;
  }
  out.flush()?;
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
