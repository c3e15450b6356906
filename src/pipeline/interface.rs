/// Pipeline interface - actual models are hosted by the inference service

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of work a pipeline performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineTask {
    Summarization,
    Translation,
}

impl PipelineTask {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineTask::Summarization => "summarization",
            PipelineTask::Translation => "translation",
        }
    }
}

impl fmt::Display for PipelineTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a pipeline loaded by the inference service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelHandle {
    pub task: PipelineTask,
    pub model: String,
    pub pipeline_id: String,
    pub loaded_at: DateTime<Utc>,
}

/// Generation bounds passed to a summarization pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizationParams {
    pub min_length: usize,
    pub max_length: usize,
    pub do_sample: bool,
}

/// Backend able to load and run pipelines.
///
/// Inference methods return the raw pipeline output; callers are responsible
/// for checking its shape.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Load (or attach to) a pipeline and return its identifier
    async fn load_pipeline(&self, task: PipelineTask, model: &str) -> Result<String, anyhow::Error>;

    async fn summarize(
        &self,
        handle: &ModelHandle,
        text: &str,
        params: SummarizationParams,
    ) -> Result<serde_json::Value, anyhow::Error>;

    async fn translate(
        &self,
        handle: &ModelHandle,
        text: &str,
        max_length: usize,
    ) -> Result<serde_json::Value, anyhow::Error>;

    /// Whether the backend is reachable
    async fn health_check(&self) -> Result<bool, anyhow::Error> {
        Ok(true)
    }
}

/// Language identification
#[async_trait]
pub trait LanguageDetector: Send + Sync {
    /// Detect the language of `text`, returning an ISO-like code such as
    /// `en` or `zh-cn`
    async fn detect(&self, text: &str) -> Result<String, anyhow::Error>;
}
