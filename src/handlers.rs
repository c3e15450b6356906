use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::error::ProcessError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SummarizeBody {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct TranslateBody {
    #[serde(default)]
    pub text: String,
    /// Target language code or display name
    #[serde(default = "default_target")]
    pub target: String,
}

fn default_target() -> String {
    "en".to_string()
}

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let inference_healthy = state.orchestrator.backend_healthy().await;
    Json(json!({
        "status": "ok",
        "inference_service": inference_healthy
    }))
}

pub async fn list_languages(State(state): State<AppState>) -> Json<Value> {
    Json(json!(state.orchestrator.languages()))
}

pub async fn list_models(State(state): State<AppState>) -> Json<Value> {
    let orchestrator = &state.orchestrator;
    Json(json!({
        "summarization_model": orchestrator.summarization_model(),
        "summarizer_ready": orchestrator.summarizer_ready(),
        "loaded": orchestrator.registry().loaded(),
    }))
}

pub async fn summarize(
    State(state): State<AppState>,
    Json(body): Json<SummarizeBody>,
) -> Result<Json<Value>, ProcessError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("summarize", %request_id);

    let outcome = state
        .orchestrator
        .summarize(&body.text)
        .instrument(span)
        .await?;

    info!("Summary request {} completed", request_id);
    Ok(Json(json!({
        "status": "success",
        "request_id": request_id,
        "message": "Summary generated!",
        "data": outcome
    })))
}

pub async fn translate(
    State(state): State<AppState>,
    Json(body): Json<TranslateBody>,
) -> Result<Json<Value>, ProcessError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("translate", %request_id, target = %body.target);

    let outcome = state
        .orchestrator
        .translate(&body.text, &body.target)
        .instrument(span)
        .await?;

    info!("Translation request {} completed", request_id);
    Ok(Json(json!({
        "status": "success",
        "request_id": request_id,
        "message": format!("Translation to {} succeeded!", outcome.target.name),
        "data": outcome
    })))
}
