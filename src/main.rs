use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use veg_index_server::config::Args;
use veg_index_server::credentials::TokenProvider;
use veg_index_server::handlers;
use veg_index_server::models::ServiceAccountKey;
use veg_index_server::service::EarthEngineClient;
use veg_index_server::state::AppState;

fn init_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if args.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Builds the Earth Engine client and proves the credentials work
async fn connect(args: &Args) -> Result<EarthEngineClient> {
    let key = ServiceAccountKey::decode(&args.credentials)?;
    let project = args
        .project
        .clone()
        .or_else(|| key.project_id.clone())
        .context("No Earth Engine project: set EE_PROJECT or use a key with project_id")?;

    let http = EarthEngineClient::http_client()?;
    let tokens = TokenProvider::new(http.clone(), key)?;
    let client = EarthEngineClient::new(http, tokens, &args.api_base, &project);
    client.verify_credentials().await?;

    tracing::info!("Using Earth Engine project {}", project);
    Ok(client)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args);

    tracing::info!("Starting vegetation index server");

    let client = match connect(&args).await {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!("Failed to initialize Earth Engine: {:#}", e);
            std::process::exit(1);
        }
    };

    let config = args.backfill_config();
    match config.reference_date {
        Some(date) => tracing::info!("Month scan anchored at fixed date {}", date),
        None => tracing::info!("Month scan anchored at the current date"),
    }

    let state = Arc::new(AppState::new(client, config));
    let app = handlers::router(state);

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
