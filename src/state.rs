use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::inference_service::InferenceServiceClient;
use crate::orchestrator::Orchestrator;
use crate::pipeline::{InferenceBackend, LanguageDetector, ModelRegistry};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub orchestrator: Orchestrator,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let models = &config.model_config;
        let service_url = std::env::var("INFERENCE_SERVICE_URL")
            .unwrap_or_else(|_| models.service_url.clone());
        // Loads can outlast inference calls, so the transport bound covers both
        let transport_timeout = models.inference_timeout().max(models.load_timeout());
        let service = Arc::new(InferenceServiceClient::new(
            service_url,
            transport_timeout,
            models.detection_seed,
        )?);
        info!("Using inference service at {}", service.base_url());

        Ok(Self::with_services(config, service.clone(), service))
    }

    /// Build state around explicit backends
    pub fn with_services(
        config: Config,
        backend: Arc<dyn InferenceBackend>,
        detector: Arc<dyn LanguageDetector>,
    ) -> Self {
        let registry = Arc::new(ModelRegistry::new(backend.clone()));
        let orchestrator =
            Orchestrator::new(registry, backend, detector, config.model_config.clone());

        Self {
            config,
            orchestrator,
        }
    }
}
