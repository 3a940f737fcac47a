use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use survey_wizard::{
    catalog::Catalog,
    config::{Config, StorageBackend},
    server::{AppState, SurveyServer},
    storage::open_store,
};

/// Web survey wizard.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Response store: sqlite, file or memory (overrides STORAGE_BACKEND)
    #[arg(long)]
    storage: Option<StorageBackend>,

    /// Listen address (overrides SURVEY_BIND_ADDR)
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// JSON question catalog (overrides SURVEY_CATALOG_PATH)
    #[arg(long)]
    catalog: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(backend) = cli.storage {
        config.storage.backend = backend;
    }
    if let Some(bind) = cli.bind {
        config.server.bind_addr = bind;
    }
    if cli.catalog.is_some() {
        config.catalog.path = cli.catalog;
    }

    // Initialize logging
    init_logging(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        backend = %config.storage.backend,
        "Survey server starting..."
    );

    let catalog = match &config.catalog.path {
        Some(path) => match Catalog::load(path) {
            Ok(c) => c,
            Err(e) => {
                error!(error = %e, "Failed to load question catalog");
                return Err(e.into());
            }
        },
        None => Catalog::builtin(),
    };

    // Initialize storage
    let store = match open_store(&config.storage).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to initialize response store");
            return Err(e.into());
        }
    };

    let addr = config.server.bind_addr;
    let state = Arc::new(AppState::new(config, catalog, store));
    let server = SurveyServer::new(state);

    if let Err(e) = server.run(addr).await {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        survey_wizard::config::LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        survey_wizard::config::LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
