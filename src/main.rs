use clap::{Args, Parser, Subcommand};
use shopfeed_pipeline::config::{load_config, Destination};
use shopfeed_pipeline::model::{InvocationResponse, PipelineError, TriggerEvent};
use shopfeed_pipeline::pipeline::{run_flatten, run_load};
use shopfeed_pipeline::storage::LocalObjectStore;
use shopfeed_pipeline::upsert::{RestUpserter, SqliteUpserter, Upserter};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "shopfeed", about = "Flattens storefront product feeds and loads them into a products table")]
struct Cli {
    /// Root directory of the object store
    #[arg(long, env = "SHOPFEED_BUCKET_DIR", default_value = "bucket", global = true)]
    bucket_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Explode a raw NDJSON batch into per-variant records
    Flatten(Trigger),
    /// Upsert a flattened artifact into the destination table
    Load(Trigger),
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct Trigger {
    /// Object key to process
    #[arg(long)]
    key: Option<String>,
    /// Path to a storage notification event (JSON); only its first record is used
    #[arg(long)]
    event: Option<PathBuf>,
}

impl Trigger {
    fn into_event(self) -> Result<TriggerEvent, PipelineError> {
        match (self.key, self.event) {
            (Some(key), _) => Ok(TriggerEvent::for_key(&key)),
            (None, Some(path)) => {
                let text = fs::read_to_string(&path).map_err(|e| PipelineError::Store(e.into()))?;
                Ok(serde_json::from_str(&text)?)
            }
            (None, None) => Err(PipelineError::EmptyEvent),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let store = LocalObjectStore::new(&cli.bucket_dir);

    let response = match cli.command {
        Command::Flatten(trigger) => flatten(trigger, &store),
        Command::Load(trigger) => load(trigger, &store).await,
    };

    match serde_json::to_string(&response) {
        Ok(json) => println!("{}", json),
        Err(e) => warn!("Could not encode response: {}", e),
    }
    if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn flatten(trigger: Trigger, store: &LocalObjectStore) -> InvocationResponse {
    let result = trigger.into_event().and_then(|event| run_flatten(&event, store));
    match result {
        Ok(summary) => {
            info!(
                "{} documents, {} malformed lines, {} records",
                summary.documents, summary.malformed_lines, summary.records
            );
            summary.response()
        }
        Err(e) => {
            error!("Flatten failed: {}", e);
            InvocationResponse::new(500, e.to_string())
        }
    }
}

async fn load(trigger: Trigger, store: &LocalObjectStore) -> InvocationResponse {
    // Destination settings are checked before anything is read.
    let config = match load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return InvocationResponse::new(500, e.to_string());
        }
    };
    let event = match trigger.into_event() {
        Ok(event) => event,
        Err(e) => {
            error!("Invalid trigger: {}", e);
            return InvocationResponse::new(400, e.to_string());
        }
    };

    match &config.destination {
        Destination::Rest { url, api_key } => match RestUpserter::new(url, api_key) {
            Ok(upserter) => run_with(&event, store, &upserter, &config.table).await,
            Err(e) => {
                error!("Failed to create HTTP client: {}", e);
                InvocationResponse::new(500, e.to_string())
            }
        },
        Destination::Sqlite { path } => match SqliteUpserter::new(path) {
            Ok(upserter) => {
                let response = run_with(&event, store, &upserter, &config.table).await;
                match upserter.row_count(&config.table) {
                    Ok(n) => info!("Table {} now holds {} rows", config.table, n),
                    Err(e) => warn!("Row count failed: {}", e),
                }
                response
            }
            Err(e) => {
                error!("Failed to initialize storage: {}", e);
                InvocationResponse::new(500, e.to_string())
            }
        },
    }
}

async fn run_with(
    event: &TriggerEvent,
    store: &LocalObjectStore,
    upserter: &dyn Upserter,
    table: &str,
) -> InvocationResponse {
    let (response, summary) = run_load(event, store, upserter, table).await;
    info!(
        "Load finished: {} total, {} inserted, {} skipped, {} failed",
        summary.total, summary.inserted, summary.skipped, summary.failed
    );
    response
}
