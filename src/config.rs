use anyhow::{Context, Result};
use config::{Environment, File, FileFormat};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Prefix for environment overrides, e.g. `TEXTPROC__SYSTEM_CONFIG__PORT=9000`
pub const ENV_PREFIX: &str = "TEXTPROC";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub system_config: SystemConfig,
    #[serde(default)]
    pub model_config: ModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding the browser front end
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_static_dir() -> String {
    "static".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Base URL of the inference service
    #[serde(default = "default_service_url")]
    pub service_url: String,
    #[serde(default = "default_summarization_model")]
    pub summarization_model: String,
    /// Prepended to `<source>-<target>` to name a translation model
    #[serde(default = "default_translation_model_prefix")]
    pub translation_model_prefix: String,
    /// Fixed seed so language detection is reproducible
    #[serde(default)]
    pub detection_seed: u64,
    #[serde(default = "default_inference_timeout_secs")]
    pub inference_timeout_secs: u64,
    /// Loading a pipeline may download weights, so it gets its own bound
    #[serde(default = "default_load_timeout_secs")]
    pub load_timeout_secs: u64,
    #[serde(default = "default_true")]
    pub preload_summarizer: bool,
    /// Pairs such as `en-fr` to load at startup
    #[serde(default)]
    pub preload_translation_pairs: Vec<String>,
}

fn default_service_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_summarization_model() -> String {
    "facebook/bart-large-cnn".to_string()
}

fn default_translation_model_prefix() -> String {
    "Helsinki-NLP/opus-mt-".to_string()
}

fn default_inference_timeout_secs() -> u64 {
    120
}

fn default_load_timeout_secs() -> u64 {
    600
}

fn default_true() -> bool {
    true
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            summarization_model: default_summarization_model(),
            translation_model_prefix: default_translation_model_prefix(),
            detection_seed: 0,
            inference_timeout_secs: default_inference_timeout_secs(),
            load_timeout_secs: default_load_timeout_secs(),
            preload_summarizer: true,
            preload_translation_pairs: Vec::new(),
        }
    }
}

impl ModelConfig {
    /// Full translation model name for a pair such as `en-fr`
    pub fn translation_model(&self, pair: &str) -> String {
        format!("{}{}", self.translation_model_prefix, pair)
    }

    pub fn inference_timeout(&self) -> Duration {
        Duration::from_secs(self.inference_timeout_secs)
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }
}

impl Config {
    /// Load configuration from a YAML, JSON or TOML file.
    ///
    /// `${VAR}` placeholders are replaced from the environment, then
    /// `TEXTPROC__*` variables override individual keys.
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            anyhow::bail!("Configuration file not found: {}", path);
        }

        let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path))?;
        let content = substitute_env_vars(&decode_config_text(&bytes))?;

        let config: Config = config::Config::builder()
            .add_source(File::from_str(&content, file_format(path)))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.system_config.port == 0 {
            anyhow::bail!("Port must be between 1 and 65535");
        }
        let models = &self.model_config;
        if models.summarization_model.trim().is_empty() {
            anyhow::bail!("summarization_model must not be empty");
        }
        if models.inference_timeout_secs == 0 || models.load_timeout_secs == 0 {
            anyhow::bail!("Timeouts must be greater than 0 seconds");
        }
        for pair in &models.preload_translation_pairs {
            if pair.split('-').count() != 2 {
                anyhow::bail!("Invalid translation pair '{}', expected <source>-<target>", pair);
            }
        }
        Ok(())
    }
}

fn file_format(path: &str) -> FileFormat {
    let path_lower = path.to_lowercase();
    if path_lower.ends_with(".json") || path_lower.ends_with(".jsonld") {
        FileFormat::Json
    } else if path_lower.ends_with(".toml") {
        FileFormat::Toml
    } else {
        FileFormat::Yaml
    }
}

/// Decode config bytes, honouring a BOM and falling back to GBK for
/// non-UTF-8 files
fn decode_config_text(bytes: &[u8]) -> String {
    if let Some((encoding, bom_len)) = encoding_rs::Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return text.into_owned();
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (text, _, _) = encoding_rs::GBK.decode(bytes);
            text.into_owned()
        }
    }
}

/// Replace `${VAR_NAME}` with the variable's value; unknown variables are
/// left untouched
fn substitute_env_vars(content: &str) -> Result<String> {
    let pattern = Regex::new(r"\$\{(\w+)\}")?;
    let replaced = pattern.replace_all(content, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    });
    Ok(replaced.into_owned())
}
