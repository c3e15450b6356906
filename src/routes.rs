use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::handlers;
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router<AppState> {
    let system_config = &state.config.system_config;

    Router::new()
        // Health check
        .route("/api/health", get(handlers::health_check))

        // Reference data
        .route("/api/languages", get(handlers::list_languages))
        .route("/api/models", get(handlers::list_models))

        // Workflows
        .route("/api/summarize", post(handlers::summarize))
        .route("/api/translate", post(handlers::translate))

        // Front end
        .fallback_service(ServeDir::new(&system_config.static_dir))
}
