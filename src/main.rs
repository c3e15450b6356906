mod config;
mod error;
mod handlers;
mod inference_service;
mod orchestrator;
mod pipeline;
mod routes;
mod state;
mod summarize;
mod translate;
mod utils;

use anyhow::Result;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::pipeline::PipelineTask;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("textproc_backend=debug,tower_http=debug")),
        )
        .init();

    // Load configuration - try multiple paths
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| std::path::PathBuf::from("."));

    let config_paths: Vec<String> = vec![
        std::env::var("CONFIG_PATH").ok(),
        Some("conf.yaml".to_string()),
        Some("conf.json".to_string()),
        exe_dir.join("conf.yaml").canonicalize().ok().and_then(|p| p.to_str().map(|s| s.to_string())),
    ]
    .into_iter()
    .flatten()
    .collect();

    let mut config = None;
    let mut loaded_path = String::new();

    for path in &config_paths {
        match Config::load(path) {
            Ok(cfg) => {
                config = Some(cfg);
                loaded_path = path.clone();
                break;
            }
            Err(e) => {
                tracing::debug!("Failed to load config from {}: {}", path, e);
                continue;
            }
        }
    }

    let config = config.ok_or_else(|| anyhow::anyhow!(
        "Could not find config file. Tried: {:?}", config_paths
    ))?;

    info!("Loaded configuration from: {}", loaded_path);

    // Initialize app state
    let app_state = AppState::new(config.clone()).await?;

    // Warm pipelines in the background so the server answers immediately
    let orchestrator = app_state.orchestrator.clone();
    tokio::spawn(async move {
        let keys = orchestrator.preload_keys();
        let results = orchestrator.registry().preload(&keys).await;
        for ((task, model), result) in keys.iter().zip(results) {
            match result {
                Ok(handle) => info!("Preloaded {} pipeline {}", task, handle.model),
                Err(e) if *task == PipelineTask::Summarization => {
                    error!("Summarization unavailable until {} loads: {}", model, e)
                }
                Err(e) => warn!("Could not preload {}: {}", model, e),
            }
        }
    });

    // Build application
    let app = Router::new()
        .merge(routes::create_routes(app_state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let system_config = &config.system_config;
    info!("Starting server on {}:{}", system_config.host, system_config.port);

    let listener =
        tokio::net::TcpListener::bind((system_config.host.as_str(), system_config.port)).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
