use std::sync::Arc;

use tracing::{error, info};

use devdigest::article::{ArticleRepository, ArticleStore};
use devdigest::enrich::{Enricher, OpenAiEnricher};
use devdigest::ingest::{pacer_from_millis, sources_from_config, IngestPipeline, IngestScheduler};
use devdigest::web::{AppState, WebServer};
use devdigest::{Config, Database};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    // Load configuration
    let config = match Config::load_with_env(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    // Initialize logging
    if let Err(e) = devdigest::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        devdigest::logging::init_console_only(&config.logging.level);
    }

    info!("DevDigest - curated developer news");
    info!(mode = %config.runtime.mode, "Starting");

    if let Err(e) = run(config).await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> devdigest::Result<()> {
    let db = Database::connect(&config.database.url).await?;
    info!("Database ready at {}", config.database.url);

    let store: Arc<dyn ArticleStore> = Arc::new(ArticleRepository::new(db.pool()));
    let enricher: Arc<dyn Enricher> = Arc::new(OpenAiEnricher::new(config.enrichment.clone())?);
    let sources = sources_from_config(&config, enricher.clone())?;
    info!("Configured {} content sources", sources.len());

    let pipeline = Arc::new(IngestPipeline::new(
        store.clone(),
        enricher.clone(),
        sources,
        config.ingest.batch_size,
        pacer_from_millis(config.ingest.batch_pause_ms),
    ));

    if config.scheduler.enabled {
        IngestScheduler::with_interval(pipeline.clone(), config.scheduler.interval_secs).spawn();
    }

    let app_state = Arc::new(AppState::new(
        store,
        enricher,
        pipeline,
        config.runtime.clone(),
    ));
    let server = WebServer::new(&config.server, app_state)?;
    server.run().await?;

    Ok(())
}
