pub mod interface;
pub mod registry;

#[cfg(test)]
pub mod testing;

pub use interface::{
    InferenceBackend, LanguageDetector, ModelHandle, PipelineTask, SummarizationParams,
};
pub use registry::ModelRegistry;
