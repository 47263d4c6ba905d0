//! Recipes: a JSON CRUD service for recipes.
//!
//! This is the application entry point. It loads configuration from a TOML
//! file, initializes tracing, connects the recipe store once, builds the Axum
//! router around it, and starts the HTTP server.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recipes::config::{AppConfig, StorageBackend, DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILTER};
use recipes::store::{MemoryStore, MongoStore, RecipeStore};
use recipes::templates::init_templates;
use recipes::{create_router, AppState};

/// Recipes: a JSON CRUD service for recipes
#[derive(Parser, Debug)]
#[command(name = "recipes", version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Log level filter (e.g., "recipes=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,

    /// Keep recipes in memory instead of MongoDB
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = AppConfig::load(&args.config)?;
    if args.memory {
        config.database.backend = StorageBackend::Memory;
    }

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let json = config.logging.is_json();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&log_filter))
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();

    tracing::info!(config = %args.config, "Loaded configuration");

    let store: Arc<dyn RecipeStore> = match config.database.backend {
        StorageBackend::Mongodb => Arc::new(MongoStore::connect(&config.database).await?),
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage - recipes are lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let tera = init_templates()?;
    tracing::info!("Initialized templates");

    let state = AppState::new(config.clone(), tera, store);
    let app = create_router(state);

    recipes::http::start_server(app, &config).await?;

    Ok(())
}
