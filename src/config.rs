use serde::{Deserialize, Serialize};

use crate::error::{BriefAnalyzerError, Result};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

const API_KEY_VARS: [&str; 2] = ["OPENAI_API_KEY", "VITE_OPENAI_API_KEY"];

/// Settings threaded from the caller into the client. There is no global state.
#[derive(Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_endpoint(),
            model: default_model(),
            temperature: default_temperature(),
        }
    }
}

impl std::fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl AnalyzerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            api_key: API_KEY_VARS.iter().find_map(|&key| lookup(key)),
            ..Self::default()
        };
        if let Some(endpoint) = lookup("BRIEF_ANALYZER_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Some(model) = lookup("BRIEF_ANALYZER_MODEL") {
            config.model = model;
        }
        if let Some(temperature) = lookup("BRIEF_ANALYZER_TEMPERATURE") {
            match temperature.parse() {
                Ok(t) => config.temperature = t,
                Err(_) => log::warn!(
                    "Ignoring unparsable BRIEF_ANALYZER_TEMPERATURE={:?}",
                    temperature
                ),
            }
        }
        config
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// The configured credential, if any non-blank one is set.
    pub fn credential(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(BriefAnalyzerError::MissingCredential)
    }
}
