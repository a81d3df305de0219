use std::error::Error as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use thiserror::Error;

use pickup_report::config::{self, ConfigError, ReportConfig};
use pickup_report::models::{
    ModelError, PickupRecord, PickupStatus, Priority, ReportFilters, ReportOptions, FILTER_ALL,
};
use pickup_report::snapshot::FileSnapshotSource;
use pickup_report::{ReportError, ReportGenerator, ReportOutput, ReportService};

/// Pickup Reports - printable PDFs for scheduled pickups
#[derive(Parser)]
#[command(name = "pickup-report")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory the PDF is written to
    #[arg(long, global = true, env = "PICKUP_REPORT_EXPORT_DIR")]
    out_dir: Option<PathBuf>,

    /// JSON file overriding page geometry and UTC offset
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Paginated table of pickups with a status summary
    List {
        /// JSON array of pickup records
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        title: Option<String>,

        /// Status filter shown in the header (display only): a status name or "all"
        #[arg(long)]
        status: Option<String>,

        /// Priority filter shown in the header (display only): a priority name or "all"
        #[arg(long)]
        priority: Option<String>,

        /// Search term shown in the header (display only)
        #[arg(long)]
        search: Option<String>,
    },

    /// Detail sheet for one pickup
    Single {
        /// JSON object of a single pickup record
        #[arg(long)]
        input: PathBuf,
    },

    /// Tile a pre-rendered region image over A4 pages
    Snapshot {
        /// Directory holding `<target>.png` / `.jpg`
        #[arg(long)]
        source_dir: PathBuf,

        #[arg(long)]
        target: String,

        #[arg(long)]
        file_name: Option<String>,
    },
}

#[derive(Error, Debug)]
enum CliError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Filter(#[from] ModelError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("Cannot print result: {0}")]
    Output(#[from] serde_json::Error),
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CliError::Json {
        path: path.to_owned(),
        source,
    })
}

/// Accepts `all` or any wire name of `T`.
fn check_filter<T>(value: Option<&str>) -> Result<(), ModelError>
where
    T: FromStr<Err = ModelError>,
{
    match value {
        Some(v) if !v.is_empty() && v != FILTER_ALL => T::from_str(v).map(|_| ()),
        _ => Ok(()),
    }
}

fn list_options(
    title: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    search: Option<String>,
) -> Result<ReportOptions, CliError> {
    check_filter::<PickupStatus>(status.as_deref())?;
    check_filter::<Priority>(priority.as_deref())?;

    let include_filters = status.is_some() || priority.is_some() || search.is_some();
    Ok(ReportOptions {
        title,
        include_filters,
        filters: include_filters.then(|| ReportFilters {
            status,
            priority,
            search_term: search,
        }),
    })
}

async fn run(cli: Cli) -> Result<ReportOutput, CliError> {
    let report_config = match &cli.config {
        Some(path) => ReportConfig::load(path)?,
        None => ReportConfig::default(),
    };
    let out_dir = cli.out_dir.unwrap_or_else(config::exports_dir);
    tracing::debug!(out_dir = %out_dir.display(), "Using export directory");

    let service = ReportService::new(ReportGenerator::pdf(out_dir, report_config));

    let output = match cli.command {
        Commands::List {
            input,
            title,
            status,
            priority,
            search,
        } => {
            let options = list_options(title, status, priority, search)?;
            let records: Vec<PickupRecord> = read_json(&input)?;
            service.list_report(records, options).await?
        }
        Commands::Single { input } => {
            let record: PickupRecord = read_json(&input)?;
            service.single_report(record).await?
        }
        Commands::Snapshot {
            source_dir,
            target,
            file_name,
        } => {
            let source = Arc::new(FileSnapshotSource::new(source_dir));
            service.snapshot_report(source, target, file_name).await?
        }
    };
    Ok(output)
}

#[tokio::main]
async fn main() -> ExitCode {
    pickup_report::init_tracing();
    tracing::info!("{} v{}", config::APP_NAME, config::APP_VERSION);

    let cli = Cli::parse();
    let result = match run(cli).await {
        Ok(output) => serde_json::to_string_pretty(&output)
            .map(|json| println!("{json}"))
            .map_err(CliError::from),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            let mut cause = e.source();
            while let Some(inner) = cause {
                eprintln!("  caused by: {inner}");
                cause = inner.source();
            }
            ExitCode::FAILURE
        }
    }
}
