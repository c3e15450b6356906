use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::pipeline::{
    InferenceBackend, LanguageDetector, ModelHandle, PipelineTask, SummarizationParams,
};

/// HTTP client for the model-serving service hosting the pipelines
#[derive(Debug, Clone)]
pub struct InferenceServiceClient {
    client: Client,
    base_url: String,
    detection_seed: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoadPipelineRequest {
    pub task: PipelineTask,
    pub model: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoadPipelineResponse {
    pub success: bool,
    pub pipeline_id: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummarizeRequest {
    pub model: String,
    pub text: String,
    pub min_length: usize,
    pub max_length: usize,
    pub do_sample: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub model: String,
    pub text: String,
    pub max_length: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DetectRequest {
    pub text: String,
    pub seed: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DetectResponse {
    pub success: bool,
    pub language: Option<String>,
    pub error: Option<String>,
}

impl InferenceServiceClient {
    pub fn new(base_url: String, timeout: Duration, detection_seed: u64) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            detection_seed,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("{} returned {}: {}", url, status, text);
        }
        Ok(response.json().await?)
    }

}

#[async_trait]
impl InferenceBackend for InferenceServiceClient {
    async fn load_pipeline(&self, task: PipelineTask, model: &str) -> Result<String, anyhow::Error> {
        let request = LoadPipelineRequest {
            task,
            model: model.to_string(),
        };
        let value = self.post_json("/pipelines/load", &request).await?;
        let response: LoadPipelineResponse = serde_json::from_value(value)?;

        match (response.success, response.pipeline_id) {
            (true, Some(pipeline_id)) => Ok(pipeline_id),
            (true, None) => Ok(model.to_string()),
            (false, _) => Err(anyhow::anyhow!(
                "{}",
                response.error.unwrap_or_else(|| "Unknown error".to_string())
            )),
        }
    }

    async fn summarize(
        &self,
        handle: &ModelHandle,
        text: &str,
        params: SummarizationParams,
    ) -> Result<serde_json::Value, anyhow::Error> {
        debug!(
            "Summarize request: model={}, min_length={}, max_length={}",
            handle.model, params.min_length, params.max_length
        );
        let request = SummarizeRequest {
            model: handle.model.clone(),
            text: text.to_string(),
            min_length: params.min_length,
            max_length: params.max_length,
            do_sample: params.do_sample,
        };
        self.post_json("/summarize", &request).await
    }

    async fn translate(
        &self,
        handle: &ModelHandle,
        text: &str,
        max_length: usize,
    ) -> Result<serde_json::Value, anyhow::Error> {
        debug!("Translate request: model={}, max_length={}", handle.model, max_length);
        let request = TranslateRequest {
            model: handle.model.clone(),
            text: text.to_string(),
            max_length,
        };
        self.post_json("/translate", &request).await
    }

    async fn health_check(&self) -> Result<bool, anyhow::Error> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        Ok(response.status().is_success())
    }
}

#[async_trait]
impl LanguageDetector for InferenceServiceClient {
    async fn detect(&self, text: &str) -> Result<String, anyhow::Error> {
        let request = DetectRequest {
            text: text.to_string(),
            seed: self.detection_seed,
        };
        let value = self.post_json("/detect", &request).await?;
        let response: DetectResponse = serde_json::from_value(value)?;

        match response.language {
            Some(language) if response.success && !language.is_empty() => Ok(language),
            _ => Err(anyhow::anyhow!(
                "{}",
                response.error.unwrap_or_else(|| "No language detected".to_string())
            )),
        }
    }
}
