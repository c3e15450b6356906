use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ModelConfig;
use crate::error::ProcessError;
use crate::pipeline::{
    InferenceBackend, LanguageDetector, ModelHandle, ModelRegistry, PipelineTask,
    SummarizationParams,
};
use crate::summarize::{compute_budget, translation_max_length};
use crate::translate::{
    find_by_code, find_by_name, model_pair, SupportedLanguage, TranslationRequest,
    SUPPORTED_LANGUAGES,
};
use crate::utils::text::{first_text_field, word_count};

#[derive(Debug, Clone, Serialize)]
pub struct SummaryOutcome {
    pub summary: String,
    pub model: String,
    pub word_count: usize,
    pub min_length: usize,
    pub max_length: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranslationOutcome {
    pub translation: String,
    pub model: String,
    pub detected: String,
    pub source: SupportedLanguage,
    pub target: SupportedLanguage,
    pub max_length: usize,
}

/// Drives the summarize and translate workflows.
///
/// Owns no model state of its own: loaded pipelines live in the shared
/// [`ModelRegistry`], so the orchestrator can be cloned into every request.
#[derive(Clone)]
pub struct Orchestrator {
    registry: Arc<ModelRegistry>,
    backend: Arc<dyn InferenceBackend>,
    detector: Arc<dyn LanguageDetector>,
    models: ModelConfig,
    languages: &'static [SupportedLanguage],
}

impl Orchestrator {
    pub fn new(
        registry: Arc<ModelRegistry>,
        backend: Arc<dyn InferenceBackend>,
        detector: Arc<dyn LanguageDetector>,
        models: ModelConfig,
    ) -> Self {
        Self {
            registry,
            backend,
            detector,
            models,
            languages: &SUPPORTED_LANGUAGES,
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn summarization_model(&self) -> &str {
        &self.models.summarization_model
    }

    pub fn summarizer_ready(&self) -> bool {
        self.registry
            .is_loaded(PipelineTask::Summarization, &self.models.summarization_model)
    }

    pub fn languages(&self) -> &'static [SupportedLanguage] {
        self.languages
    }

    pub async fn backend_healthy(&self) -> bool {
        self.backend.health_check().await.unwrap_or(false)
    }

    /// Model keys to warm at startup
    pub fn preload_keys(&self) -> Vec<(PipelineTask, String)> {
        let mut keys = Vec::new();
        if self.models.preload_summarizer {
            keys.push((
                PipelineTask::Summarization,
                self.models.summarization_model.clone(),
            ));
        }
        for pair in &self.models.preload_translation_pairs {
            keys.push((PipelineTask::Translation, self.models.translation_model(pair)));
        }
        keys
    }

    pub async fn summarize(&self, text: &str) -> Result<SummaryOutcome, ProcessError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ProcessError::EmptyInput);
        }

        let word_count = word_count(text);
        let budget = compute_budget(word_count)?;
        debug!(
            "Summary budget for {} words: min={}, max={}",
            word_count, budget.min_length, budget.max_length
        );

        let model = self.models.summarization_model.clone();
        let handle = self
            .load(PipelineTask::Summarization, &model)
            .await
            .map_err(|e| match e {
                ProcessError::ModelLoadFailure { model, reason, .. } => {
                    ProcessError::SummarizerUnavailable { model, reason }
                }
                other => other,
            })?;

        let params = SummarizationParams {
            min_length: budget.min_length,
            max_length: budget.max_length,
            do_sample: false,
        };
        let output = with_timeout("summarization", self.models.inference_timeout(), async {
            self.backend
                .summarize(&handle, text, params)
                .await
                .map_err(|e| service_failure(&handle, e))
        })
        .await?;

        let summary = first_text_field(&output, "summary_text").ok_or_else(|| {
            ProcessError::MalformedResult {
                model: model.clone(),
                field: "summary_text",
                payload: output.clone(),
            }
        })?;

        info!("Summary generated with {} ({} words in)", model, word_count);
        Ok(SummaryOutcome {
            summary,
            model,
            word_count,
            min_length: budget.min_length,
            max_length: budget.max_length,
        })
    }

    /// Detect the source language of `text` and translate it into `target`,
    /// given as a language code or display name
    pub async fn translate(
        &self,
        text: &str,
        target: &str,
    ) -> Result<TranslationOutcome, ProcessError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ProcessError::EmptyInput);
        }

        let target = find_by_code(target)
            .or_else(|| find_by_name(target))
            .ok_or_else(|| ProcessError::UnknownTargetLanguage(target.to_string()))?;

        let detected = with_timeout(
            "language detection",
            self.models.inference_timeout(),
            async {
                self.detector
                    .detect(text)
                    .await
                    .map_err(|e| ProcessError::DetectionFailure(e.to_string()))
            },
        )
        .await?;

        let mut request = TranslationRequest::new(text, target);
        request.resolve_source(&detected, self.languages);
        if let Some(source) = request.source {
            info!("Detected source language: {} ({})", source.name, source.code);
        }

        self.translate_request(&request).await
    }

    /// Run an already-resolved translation request
    pub async fn translate_request(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationOutcome, ProcessError> {
        let detected = request.detected.clone().unwrap_or_default();
        let source = request
            .source
            .ok_or_else(|| ProcessError::UnresolvedLanguage {
                detected: detected.clone(),
            })?;
        let target = request.target;

        if source.code == target.code {
            return Err(ProcessError::IdenticalLanguages {
                code: source.code.to_string(),
            });
        }

        let model = self
            .models
            .translation_model(&model_pair(source.code, target.code));
        let handle = self.load(PipelineTask::Translation, &model).await?;

        let max_length = translation_max_length(word_count(&request.text));
        let output = with_timeout("translation", self.models.inference_timeout(), async {
            self.backend
                .translate(&handle, &request.text, max_length)
                .await
                .map_err(|e| service_failure(&handle, e))
        })
        .await?;

        let translation = first_text_field(&output, "translation_text").ok_or_else(|| {
            ProcessError::MalformedResult {
                model: model.clone(),
                field: "translation_text",
                payload: output.clone(),
            }
        })?;

        info!("Translated {} -> {} with {}", source.code, target.code, model);
        Ok(TranslationOutcome {
            translation,
            model,
            detected,
            source: *source,
            target: *target,
            max_length,
        })
    }

    async fn load(&self, task: PipelineTask, model: &str) -> Result<ModelHandle, ProcessError> {
        with_timeout(
            &format!("loading {}", model),
            self.models.load_timeout(),
            self.registry.get_or_load(task, model),
        )
        .await
    }
}

fn service_failure(handle: &ModelHandle, error: anyhow::Error) -> ProcessError {
    ProcessError::ServiceFailure {
        model: handle.model.clone(),
        reason: format!("{:#}", error),
    }
}

async fn with_timeout<T, F>(operation: &str, limit: Duration, fut: F) -> Result<T, ProcessError>
where
    F: Future<Output = Result<T, ProcessError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| ProcessError::ServiceTimeout {
            operation: operation.to_string(),
            secs: limit.as_secs(),
        })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{FakeBackend, FakeDetector};
    use serde_json::json;
    use std::sync::atomic::Ordering;

    const FOX: &str = "The quick brown fox jumps over the lazy dog";

    fn orchestrator(backend: Arc<FakeBackend>, detector: Arc<FakeDetector>) -> Orchestrator {
        orchestrator_with(backend, detector, ModelConfig::default())
    }

    fn orchestrator_with(
        backend: Arc<FakeBackend>,
        detector: Arc<FakeDetector>,
        models: ModelConfig,
    ) -> Orchestrator {
        let registry = Arc::new(ModelRegistry::new(backend.clone()));
        Orchestrator::new(registry, backend, detector, models)
    }

    #[tokio::test]
    async fn summarize_uses_budget_and_greedy_decoding() {
        let backend = Arc::new(FakeBackend::default());
        let orchestrator = orchestrator(backend.clone(), Arc::new(FakeDetector::detecting("en")));

        let outcome = orchestrator.summarize(&format!("  {}  ", FOX)).await.unwrap();

        assert_eq!(outcome.summary, "A fox jumps over a dog.");
        assert_eq!(outcome.word_count, 9);
        assert_eq!((outcome.min_length, outcome.max_length), (4, 19));
        assert_eq!(
            *backend.last_summary_params.lock().unwrap(),
            Some(SummarizationParams {
                min_length: 4,
                max_length: 19,
                do_sample: false
            })
        );
        assert!(orchestrator.summarizer_ready());
    }

    #[tokio::test]
    async fn summarizer_is_loaded_once() {
        let backend = Arc::new(FakeBackend::default());
        let orchestrator = orchestrator(backend.clone(), Arc::new(FakeDetector::detecting("en")));

        orchestrator.summarize(FOX).await.unwrap();
        orchestrator.summarize(FOX).await.unwrap();

        assert_eq!(backend.loads.load(Ordering::SeqCst), 1);
        assert_eq!(backend.summarize_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn blank_input_makes_no_service_calls() {
        let backend = Arc::new(FakeBackend::default());
        let detector = Arc::new(FakeDetector::detecting("en"));
        let orchestrator = orchestrator(backend.clone(), detector.clone());

        assert!(matches!(orchestrator.summarize("   \n\t").await, Err(ProcessError::EmptyInput)));
        assert!(matches!(orchestrator.translate("", "fr").await, Err(ProcessError::EmptyInput)));

        assert_eq!(backend.loads.load(Ordering::SeqCst), 0);
        assert_eq!(backend.inference_calls(), 0);
        assert_eq!(detector.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn summarizer_load_failure_is_reported() {
        let backend = Arc::new(FakeBackend::default().unavailable("facebook/bart-large-cnn"));
        let orchestrator = orchestrator(backend.clone(), Arc::new(FakeDetector::detecting("en")));

        let err = orchestrator.summarize(FOX).await.unwrap_err();
        assert!(matches!(err, ProcessError::SummarizerUnavailable { .. }));
        assert!(!orchestrator.summarizer_ready());
        assert_eq!(backend.summarize_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_summary_keeps_payload() {
        let backend =
            Arc::new(FakeBackend::default().with_summary_output(json!([{ "generated_text": "x" }])));
        let orchestrator = orchestrator(backend, Arc::new(FakeDetector::detecting("en")));

        match orchestrator.summarize(FOX).await.unwrap_err() {
            ProcessError::MalformedResult { field, payload, .. } => {
                assert_eq!(field, "summary_text");
                assert_eq!(payload, json!([{ "generated_text": "x" }]));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn inference_exception_is_reported() {
        let backend = Arc::new(FakeBackend::default().failing_inference("CUDA out of memory"));
        let orchestrator = orchestrator(backend, Arc::new(FakeDetector::detecting("en")));

        let err = orchestrator.summarize(FOX).await.unwrap_err();
        assert!(matches!(err, ProcessError::ServiceFailure { .. }));
        assert!(err.to_string().contains("CUDA out of memory"));
    }

    #[tokio::test]
    async fn slow_inference_times_out() {
        let backend = Arc::new(FakeBackend::default().with_delay(Duration::from_millis(1500)));
        let models = ModelConfig {
            inference_timeout_secs: 1,
            ..ModelConfig::default()
        };
        let orchestrator =
            orchestrator_with(backend, Arc::new(FakeDetector::detecting("en")), models);

        let err = orchestrator.summarize(FOX).await.unwrap_err();
        assert!(matches!(err, ProcessError::ServiceTimeout { secs: 1, .. }));
    }

    #[tokio::test]
    async fn translates_english_to_french() {
        let backend = Arc::new(FakeBackend::default());
        let orchestrator = orchestrator(backend.clone(), Arc::new(FakeDetector::detecting("en")));

        let outcome = orchestrator.translate(FOX, "fr").await.unwrap();

        assert_eq!(outcome.translation, "Le renard saute.");
        assert_eq!(outcome.model, "Helsinki-NLP/opus-mt-en-fr");
        assert_eq!(outcome.source.code, "en");
        assert_eq!(outcome.max_length, 36);
        assert_eq!(
            *backend.last_translation.lock().unwrap(),
            Some(("Helsinki-NLP/opus-mt-en-fr".to_string(), 36))
        );
    }

    #[tokio::test]
    async fn target_may_be_a_display_name() {
        let backend = Arc::new(FakeBackend::default());
        let orchestrator = orchestrator(backend, Arc::new(FakeDetector::detecting("zh-cn")));

        let outcome = orchestrator.translate("你好，世界", "Japanese").await.unwrap();
        assert_eq!(outcome.model, "Helsinki-NLP/opus-mt-zh-jap");
        assert_eq!(outcome.detected, "zh-cn");
    }

    #[tokio::test]
    async fn identical_languages_skip_model_load() {
        let backend = Arc::new(FakeBackend::default());
        let orchestrator = orchestrator(backend.clone(), Arc::new(FakeDetector::detecting("fr")));

        let err = orchestrator.translate("Bonjour tout le monde", "fr").await.unwrap_err();
        assert!(matches!(err, ProcessError::IdenticalLanguages { ref code } if code == "fr"));
        assert_eq!(backend.loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unsupported_source_is_blocked() {
        let backend = Arc::new(FakeBackend::default());
        let orchestrator = orchestrator(backend.clone(), Arc::new(FakeDetector::detecting("sw")));

        let err = orchestrator.translate("Habari ya asubuhi", "en").await.unwrap_err();
        assert!(matches!(err, ProcessError::UnresolvedLanguage { ref detected } if detected == "sw"));
        assert_eq!(backend.loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn detection_failure_stops_translation() {
        let backend = Arc::new(FakeBackend::default());
        let orchestrator =
            orchestrator(backend.clone(), Arc::new(FakeDetector::failing("No features in text.")));

        let err = orchestrator.translate("42", "fr").await.unwrap_err();
        assert!(matches!(err, ProcessError::DetectionFailure(_)));
        assert_eq!(backend.loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_target_is_rejected_before_detection() {
        let detector = Arc::new(FakeDetector::detecting("en"));
        let orchestrator = orchestrator(Arc::new(FakeBackend::default()), detector.clone());

        let err = orchestrator.translate(FOX, "klingon").await.unwrap_err();
        assert!(matches!(err, ProcessError::UnknownTargetLanguage(_)));
        assert_eq!(detector.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_pair_only_fails_that_request() {
        let backend = Arc::new(FakeBackend::default().unavailable("Helsinki-NLP/opus-mt-en-jap"));
        let orchestrator = orchestrator(backend.clone(), Arc::new(FakeDetector::detecting("en")));

        let err = orchestrator.translate(FOX, "jap").await.unwrap_err();
        assert!(matches!(err, ProcessError::ModelLoadFailure { .. }));

        // Other pairs keep working
        assert!(orchestrator.translate(FOX, "de").await.is_ok());
    }

    #[tokio::test]
    async fn malformed_translation_is_reported() {
        let backend = Arc::new(FakeBackend::default().with_translation_output(json!([])));
        let orchestrator = orchestrator(backend, Arc::new(FakeDetector::detecting("en")));

        let err = orchestrator.translate(FOX, "es").await.unwrap_err();
        assert!(matches!(err, ProcessError::MalformedResult { field: "translation_text", .. }));
    }

    #[test]
    fn preload_keys_follow_config() {
        let models = ModelConfig {
            preload_translation_pairs: vec!["en-fr".to_string()],
            ..ModelConfig::default()
        };
        let orchestrator = orchestrator_with(
            Arc::new(FakeBackend::default()),
            Arc::new(FakeDetector::detecting("en")),
            models,
        );

        assert_eq!(
            orchestrator.preload_keys(),
            vec![
                (PipelineTask::Summarization, "facebook/bart-large-cnn".to_string()),
                (PipelineTask::Translation, "Helsinki-NLP/opus-mt-en-fr".to_string()),
            ]
        );
    }
}
