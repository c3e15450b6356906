/// Translation request types

use serde::Serialize;

use super::languages::{resolve, SupportedLanguage};

/// One translation interaction, built per user action.
///
/// `source` stays `None` until a detected language resolves onto the
/// supported set.
#[derive(Debug, Clone, Serialize)]
pub struct TranslationRequest {
    pub text: String,
    /// Raw code returned by language detection
    pub detected: Option<String>,
    pub source: Option<&'static SupportedLanguage>,
    pub target: &'static SupportedLanguage,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, target: &'static SupportedLanguage) -> Self {
        Self {
            text: text.into(),
            detected: None,
            source: None,
            target,
        }
    }

    /// Record the detected code and resolve it against `supported`
    pub fn resolve_source(&mut self, detected: &str, supported: &'static [SupportedLanguage]) {
        self.source = resolve(detected, supported);
        self.detected = Some(detected.to_string());
    }
}

/// Model pair identifier for an ordered (source, target) combination, e.g. `en-fr`
pub fn model_pair(source_code: &str, target_code: &str) -> String {
    format!("{}-{}", source_code, target_code)
}
