use anyhow::{Context, Result};
use charts_server::chart_store::{ChartStore, SqliteChartStore};
use charts_server::config::{AppConfig, CliConfig, FileConfig};
use charts_server::server::{self, metrics, RequestsLoggingLevel, ServerConfig};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite chart database file.
    #[clap(value_parser = parse_path)]
    pub chart_db: Option<PathBuf>,

    /// Path to an optional TOML config file. File values override CLI values.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3002)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9092)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Number of read-only database connections.
    #[clap(long, default_value_t = 4)]
    pub read_pool_size: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        db_path: cli_args.chart_db,
        port: cli_args.port,
        metrics_port: cli_args.metrics_port,
        logging_level: cli_args.logging_level,
        read_pool_size: cli_args.read_pool_size,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Opening SQLite chart database at {:?}...", config.db_path);
    let chart_store = Arc::new(SqliteChartStore::new(&config.db_path, config.read_pool_size)?);

    info!("Initializing metrics...");
    metrics::init_metrics();
    metrics::init_dataset_metrics(
        chart_store.get_tracks_count(),
        chart_store.get_regions_count(),
        chart_store.get_global_entries_count(),
        chart_store.get_region_entries_count(),
    );

    let metrics_port = config.metrics_port;
    tokio::spawn(async move {
        if let Err(err) = metrics::run_metrics_server(metrics_port).await {
            error!("Metrics server failed: {}", err);
        }
    });

    info!("Ready to serve at port {}!", config.port);
    info!("Metrics available at port {}!", config.metrics_port);
    server::run_server(
        chart_store,
        ServerConfig {
            requests_logging_level: config.logging_level,
            port: config.port,
        },
    )
    .await
}
