//! `pricelog` — record price-list workbooks into a SQLite price ledger.
//!
//! # Usage
//!
//! ```
//! pricelog ingest -f prices-Moscow.xls -d prices.db
//! pricelog ingest -f prices-Moscow.xls --echo
//! pricelog history -d prices.db --city Moscow --product 1001 --metric bonus
//! ```

mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use pricelog_core::{
  city::city_from_path,
  ingest::{Progress, ingest_sheets},
  locate::HeaderLabels,
  model::{CityId, CityRef, MetricKind, ProductId},
  writer::{EchoWriter, ObservationWriter},
};
use pricelog_store_sqlite::{SqliteStore, SqliteWriter};
use pricelog_xls::Workbook;
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Record price-list workbooks into a SQLite price ledger")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "pricelog.toml", global = true)]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Ingest one workbook; every sheet is one product category.
  Ingest(IngestArgs),
  /// Print the recorded values of one product in one city.
  History(HistoryArgs),
}

#[derive(Args)]
struct IngestArgs {
  /// Price-list workbook, named `<anything>-<City>.<ext>`.
  #[arg(short, long, value_name = "FILE")]
  file: PathBuf,

  /// SQLite database to write to.
  #[arg(short, long, value_name = "DB")]
  db: Option<PathBuf>,

  /// Store the city under this id instead of looking it up by name.
  #[arg(long)]
  city_id: Option<i64>,

  /// Print rows instead of storing them.
  #[arg(long)]
  echo: bool,
}

#[derive(Args)]
struct HistoryArgs {
  /// SQLite database to read from.
  #[arg(short, long, value_name = "DB")]
  db: Option<PathBuf>,

  #[arg(long)]
  city: String,

  #[arg(long)]
  product: i64,

  #[arg(long, value_enum, default_value_t = Metric::Price)]
  metric: Metric,

  /// Print JSON instead of a table.
  #[arg(long)]
  json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Metric {
  Price,
  Bonus,
}

impl From<Metric> for MetricKind {
  fn from(m: Metric) -> Self {
    match m {
      Metric::Price => MetricKind::Price,
      Metric::Bonus => MetricKind::Bonus,
    }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;

  match cli.command {
    Command::Ingest(args) => ingest(args, &settings).await,
    Command::History(args) => history(args, &settings).await,
  }
}

// ─── ingest ───────────────────────────────────────────────────────────────────

async fn ingest(args: IngestArgs, settings: &Settings) -> anyhow::Result<()> {
  let city = city_from_path(&args.file)?;
  let mut book = Workbook::open(&args.file)
    .with_context(|| format!("failed to open workbook {:?}", args.file))?;

  if args.echo {
    let mut writer = EchoWriter::stdout();
    ingest_workbook(&mut book, &settings.labels, &mut writer).await;
    writer.close().await?;
    return Ok(());
  }

  let store_path = settings.store_path(args.db)?;
  let mut city = CityRef::named(city);
  if let Some(id) = args.city_id {
    city = city.with_id(CityId(id));
  }

  let mut writer = SqliteWriter::new(&store_path, city);
  ingest_workbook(&mut book, &settings.labels, &mut writer).await;
  writer
    .close()
    .await
    .with_context(|| format!("failed to commit to {store_path:?}"))?;
  Ok(())
}

/// Run every sheet through `writer`, printing one summary per sheet.
async fn ingest_workbook<W: ObservationWriter>(
  book: &mut Workbook,
  labels: &HeaderLabels,
  writer: &mut W,
) {
  ingest_sheets(book.sheets(), labels, writer, |progress| match progress {
    Progress::Started(name) => println!("Processing \"{name}\"..."),
    Progress::Finished(outcome) => println!("{outcome}"),
  })
  .await;
}

// ─── history ──────────────────────────────────────────────────────────────────

async fn history(args: HistoryArgs, settings: &Settings) -> anyhow::Result<()> {
  let store_path = settings.store_path(args.db)?;
  anyhow::ensure!(store_path.exists(), "store {store_path:?} does not exist");

  let store = SqliteStore::open_read_only(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let product_id = ProductId(args.product);
  let Some(city_id) = store.city_id(&args.city).await? else {
    anyhow::bail!("unknown city {:?}", args.city);
  };
  let product = store.product(product_id).await?;
  let observations = store.history(product_id, city_id, args.metric.into()).await?;
  store.close().await?;

  if args.json {
    println!("{}", serde_json::to_string_pretty(&observations)?);
    return Ok(());
  }

  let name = product.and_then(|p| p.name).unwrap_or_default();
  println!("{product_id} {name} ({}, {})", args.city, MetricKind::from(args.metric));
  for o in &observations {
    println!("{}  {:>9}", o.observed_at.format("%Y-%m-%d %H:%M:%S"), o.value);
  }
  Ok(())
}
