use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, warn};

use crate::pipeline::PipelineTask;

/// How a failure should be presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// Failures of a single summarize or translate interaction.
///
/// None of these are fatal to the process: each one is scoped to the request
/// that raised it.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Please enter some text first.")]
    EmptyInput,

    #[error("The {task} model '{model}' could not be loaded: {reason}")]
    ModelLoadFailure {
        task: PipelineTask,
        model: String,
        reason: String,
    },

    #[error("The summarization model '{model}' is unavailable: {reason}")]
    SummarizerUnavailable { model: String, reason: String },

    #[error("Could not detect the source language. The text may be too short or ambiguous: {0}")]
    DetectionFailure(String),

    #[error("Detected language '{detected}' is not supported as a translation source.")]
    UnresolvedLanguage { detected: String },

    #[error("The detected source language and the target language are identical ({code}).")]
    IdenticalLanguages { code: String },

    #[error("Unknown target language '{0}'.")]
    UnknownTargetLanguage(String),

    #[error("Unexpected result shape from model '{model}': missing '{field}'")]
    MalformedResult {
        model: String,
        field: &'static str,
        payload: Value,
    },

    #[error("Inference with model '{model}' failed: {reason}")]
    ServiceFailure { model: String, reason: String },

    #[error("Inference service did not answer within {secs}s ({operation})")]
    ServiceTimeout { operation: String, secs: u64 },
}

impl ProcessError {
    /// Stable machine-readable identifier used in API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessError::EmptyInput => "empty_input",
            ProcessError::ModelLoadFailure { .. } => "model_load_failure",
            ProcessError::SummarizerUnavailable { .. } => "summarizer_unavailable",
            ProcessError::DetectionFailure(_) => "detection_failure",
            ProcessError::UnresolvedLanguage { .. } => "unresolved_language",
            ProcessError::IdenticalLanguages { .. } => "identical_languages",
            ProcessError::UnknownTargetLanguage(_) => "unknown_target_language",
            ProcessError::MalformedResult { .. } => "malformed_result",
            ProcessError::ServiceFailure { .. } => "service_failure",
            ProcessError::ServiceTimeout { .. } => "service_timeout",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            ProcessError::EmptyInput
            | ProcessError::UnresolvedLanguage { .. }
            | ProcessError::IdenticalLanguages { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ProcessError::EmptyInput
            | ProcessError::UnresolvedLanguage { .. }
            | ProcessError::IdenticalLanguages { .. }
            | ProcessError::DetectionFailure(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ProcessError::UnknownTargetLanguage(_) => StatusCode::BAD_REQUEST,
            ProcessError::ModelLoadFailure { .. } | ProcessError::SummarizerUnavailable { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ProcessError::MalformedResult { .. } | ProcessError::ServiceFailure { .. } => {
                StatusCode::BAD_GATEWAY
            }
            ProcessError::ServiceTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Diagnostic detail shown next to the message, if any.
    pub fn detail(&self) -> Option<Value> {
        match self {
            ProcessError::MalformedResult { payload, .. } => Some(payload.clone()),
            ProcessError::UnresolvedLanguage { detected } => Some(json!({ "detected": detected })),
            _ => None,
        }
    }
}

impl IntoResponse for ProcessError {
    fn into_response(self) -> Response {
        match self.severity() {
            Severity::Warning => warn!("{}", self),
            Severity::Error => error!("{}", self),
        }

        let mut body = json!({
            "status": self.severity().as_str(),
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Some(detail) = self.detail() {
            body["detail"] = detail;
        }

        (self.status_code(), Json(body)).into_response()
    }
}
