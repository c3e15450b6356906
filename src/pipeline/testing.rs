//! In-memory stand-ins for the inference service, shared by unit tests.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::interface::{
    InferenceBackend, LanguageDetector, ModelHandle, PipelineTask, SummarizationParams,
};

pub struct FakeBackend {
    pub loads: AtomicUsize,
    pub summarize_calls: AtomicUsize,
    pub translate_calls: AtomicUsize,
    pub last_summary_params: Mutex<Option<SummarizationParams>>,
    pub last_translation: Mutex<Option<(String, usize)>>,
    unavailable: Vec<String>,
    summary_output: Value,
    translation_output: Value,
    inference_error: Option<String>,
    delay: Option<Duration>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            loads: AtomicUsize::new(0),
            summarize_calls: AtomicUsize::new(0),
            translate_calls: AtomicUsize::new(0),
            last_summary_params: Mutex::new(None),
            last_translation: Mutex::new(None),
            unavailable: Vec::new(),
            summary_output: json!([{ "summary_text": "A fox jumps over a dog." }]),
            translation_output: json!([{ "translation_text": "Le renard saute." }]),
            inference_error: None,
            delay: None,
        }
    }
}

impl FakeBackend {
    /// Make loading `model` fail
    pub fn unavailable(mut self, model: &str) -> Self {
        self.unavailable.push(model.to_string());
        self
    }

    pub fn with_summary_output(mut self, output: Value) -> Self {
        self.summary_output = output;
        self
    }

    pub fn with_translation_output(mut self, output: Value) -> Self {
        self.translation_output = output;
        self
    }

    pub fn failing_inference(mut self, reason: &str) -> Self {
        self.inference_error = Some(reason.to_string());
        self
    }

    /// Delay every call, including loads
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn inference_calls(&self) -> usize {
        self.summarize_calls.load(Ordering::SeqCst) + self.translate_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn inference_result(&self, output: &Value) -> Result<Value, anyhow::Error> {
        match &self.inference_error {
            Some(reason) => Err(anyhow::anyhow!("{}", reason)),
            None => Ok(output.clone()),
        }
    }
}

#[async_trait]
impl InferenceBackend for FakeBackend {
    async fn load_pipeline(&self, task: PipelineTask, model: &str) -> Result<String, anyhow::Error> {
        let n = self.loads.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.unavailable.iter().any(|m| m == model) {
            anyhow::bail!("model {} not found", model);
        }
        Ok(format!("{}:{}:{}", task, model, n))
    }

    async fn summarize(
        &self,
        _handle: &ModelHandle,
        _text: &str,
        params: SummarizationParams,
    ) -> Result<Value, anyhow::Error> {
        self.summarize_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_summary_params.lock().unwrap() = Some(params);
        self.pause().await;
        self.inference_result(&self.summary_output)
    }

    async fn translate(
        &self,
        handle: &ModelHandle,
        _text: &str,
        max_length: usize,
    ) -> Result<Value, anyhow::Error> {
        self.translate_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_translation.lock().unwrap() = Some((handle.model.clone(), max_length));
        self.pause().await;
        self.inference_result(&self.translation_output)
    }
}

pub struct FakeDetector {
    pub calls: AtomicUsize,
    result: Result<String, String>,
}

impl FakeDetector {
    pub fn detecting(code: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            result: Ok(code.to_string()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            result: Err(reason.to_string()),
        }
    }
}

#[async_trait]
impl LanguageDetector for FakeDetector {
    async fn detect(&self, _text: &str) -> Result<String, anyhow::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone().map_err(|reason| anyhow::anyhow!(reason))
    }
}
