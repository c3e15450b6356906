use chrono::Utc;
use dashmap::DashMap;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::interface::{InferenceBackend, ModelHandle, PipelineTask};
use crate::error::ProcessError;

type ModelKey = (PipelineTask, String);

/// Process-wide cache of loaded pipelines.
///
/// Handles are created lazily on first request and kept for the lifetime of
/// the process. Failed loads are never cached, so a later request retries.
/// No lock is held while a pipeline loads: two concurrent first requests for
/// the same key may both reach the backend, and whichever handle is inserted
/// first is returned to both callers.
pub struct ModelRegistry {
    backend: Arc<dyn InferenceBackend>,
    handles: DashMap<ModelKey, ModelHandle>,
}

impl ModelRegistry {
    pub fn new(backend: Arc<dyn InferenceBackend>) -> Self {
        Self {
            backend,
            handles: DashMap::new(),
        }
    }

    pub async fn get_or_load(
        &self,
        task: PipelineTask,
        model: &str,
    ) -> Result<ModelHandle, ProcessError> {
        let key = (task, model.to_string());

        let cached = self.handles.get(&key).map(|entry| entry.value().clone());
        if let Some(handle) = cached {
            debug!("Using cached {} pipeline: {}", task, model);
            return Ok(handle);
        }

        info!("Loading {} pipeline: {}", task, model);
        let pipeline_id = self
            .backend
            .load_pipeline(task, model)
            .await
            .map_err(|e| {
                warn!("Failed to load {} pipeline {}: {}", task, model, e);
                ProcessError::ModelLoadFailure {
                    task,
                    model: model.to_string(),
                    reason: e.to_string(),
                }
            })?;

        let handle = ModelHandle {
            task,
            model: model.to_string(),
            pipeline_id,
            loaded_at: Utc::now(),
        };

        // First insert wins; a concurrent duplicate load is discarded
        let handle = self.handles.entry(key).or_insert(handle).value().clone();
        info!("Pipeline ready: {} ({})", handle.model, handle.pipeline_id);
        Ok(handle)
    }

    /// Warm several pipelines concurrently
    pub async fn preload(
        &self,
        keys: &[(PipelineTask, String)],
    ) -> Vec<Result<ModelHandle, ProcessError>> {
        join_all(
            keys.iter()
                .map(|(task, model)| self.get_or_load(*task, model)),
        )
        .await
    }

    pub fn is_loaded(&self, task: PipelineTask, model: &str) -> bool {
        self.handles.contains_key(&(task, model.to_string()))
    }

    /// Snapshot of cached handles, ordered by task then model
    pub fn loaded(&self) -> Vec<ModelHandle> {
        let mut handles: Vec<ModelHandle> =
            self.handles.iter().map(|e| e.value().clone()).collect();
        handles.sort_by(|a, b| (a.task, &a.model).cmp(&(b.task, &b.model)));
        handles
    }
}
