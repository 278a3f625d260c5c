//! quarry-ingest - document preparation and publishing pipeline
//!
//! This is the entry point for the quarry ingestion tool, which provides:
//! - Chunking of extracted document text into payload files (`process`)
//! - Loading payloads into Postgres with stable keys (`load-db`)
//! - Pushing chunk records to the Meilisearch chunks index (`index`)

use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use quarry_search::MeiliClient;

mod chunker;
mod db_writer;
mod indexer;
mod payload;
mod process;

#[derive(Parser, Debug)]
#[command(
    name = "quarry-ingest",
    author,
    version,
    about = "Document ingestion pipeline for the quarry search stack",
    long_about = "Chunk extracted document text into payload files, load them into \
                  Postgres, and publish chunk records to the Meilisearch index that \
                  backs the search API."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Chunk extracted text files into processed payloads
    Process(ProcessArgs),
    /// Load processed payloads into Postgres
    LoadDb(LoadDbArgs),
    /// Push processed chunks to the Meilisearch index
    Index(IndexArgs),
}

#[derive(Parser, Debug)]
struct ProcessArgs {
    /// Directory of extracted .txt files (form feeds between pages)
    #[arg(long = "in", value_name = "DIR")]
    input: PathBuf,

    /// Directory for processed payload files
    #[arg(long = "out", value_name = "DIR", default_value = "processed")]
    output: PathBuf,
}

#[derive(Parser, Debug)]
struct LoadDbArgs {
    /// Directory of processed payload files
    #[arg(long, value_name = "DIR", default_value = "processed")]
    processed_dir: PathBuf,

    /// Postgres connection string (falls back to DATABASE_URL)
    #[arg(long, value_name = "URL")]
    database_url: Option<String>,

    /// Create the documents and chunks tables if they are missing
    #[arg(long)]
    init_schema: bool,

    /// Load at most this many payload files
    #[arg(long, value_name = "N")]
    max_docs: Option<usize>,
}

#[derive(Parser, Debug)]
struct IndexArgs {
    /// Directory of processed payload files
    #[arg(long, value_name = "DIR", default_value = "processed")]
    processed_dir: PathBuf,

    /// Meilisearch base URL (falls back to MEILI_HOST)
    #[arg(long, value_name = "URL")]
    meili_host: Option<String>,

    /// Meilisearch master key (falls back to MEILI_MASTER_KEY)
    #[arg(long, value_name = "KEY")]
    meili_master_key: Option<String>,

    /// Records per batch pushed to the index
    #[arg(long, value_name = "N", default_value_t = indexer::DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Index at most this many payload files
    #[arg(long, value_name = "N")]
    max_docs: Option<usize>,
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Process(args) => run_process(args)?,
        Commands::LoadDb(args) => run_load_db(args).await?,
        Commands::Index(args) => run_index(args).await?,
    }
    Ok(())
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn run_process(args: ProcessArgs) -> Result<()> {
    let summary = process::process_dir(&args.input, &args.output)?;
    println!(
        "Processed {} files into {} chunks (skipped {})",
        summary.processed, summary.chunks, summary.skipped
    );
    Ok(())
}

async fn run_load_db(args: LoadDbArgs) -> Result<()> {
    let Some(database_url) = args.database_url.or_else(|| env_non_empty("DATABASE_URL")) else {
        bail!("DATABASE_URL is required (or pass --database-url)");
    };

    let summary = db_writer::load_processed_into_db(
        &database_url,
        &args.processed_dir,
        args.max_docs,
        args.init_schema,
    )
    .await?;

    if summary.skipped > 0 {
        tracing::warn!("Skipped {} payloads without a source_url", summary.skipped);
    }
    println!("Loaded {} documents into Postgres", summary.documents);
    Ok(())
}

async fn run_index(args: IndexArgs) -> Result<()> {
    let host = args.meili_host.or_else(|| env_non_empty("MEILI_HOST"));
    let master_key = args
        .meili_master_key
        .or_else(|| env_non_empty("MEILI_MASTER_KEY"));
    let (Some(host), Some(master_key)) = (host, master_key) else {
        bail!("MEILI_HOST and MEILI_MASTER_KEY are required");
    };

    let client = MeiliClient::new(host, master_key);
    tracing::info!("Indexing into {}", client.host());

    let summary =
        indexer::index_processed(&client, &args.processed_dir, args.batch_size, args.max_docs)
            .await?;
    println!("Indexed {} chunks into Meilisearch", summary.chunks);
    Ok(())
}
