//! Credentials and endpoints per provider.
//!
//! Resolution order is explicit override, then environment, then built-in default.
use std::collections::HashMap;
use std::time::Duration;

use ::config::{Config, Environment};
use serde::Deserialize;

use crate::errors::LlmResult;

pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const AZURE_OPENAI_API_KEY: &str = "AZURE_OPENAI_API_KEY";

const ENV_KEYS: &[&str] = &[
    ANTHROPIC_API_KEY,
    "ANTHROPIC_BASE_URL",
    OPENAI_API_KEY,
    "OPENAI_BASE_URL",
    AZURE_OPENAI_API_KEY,
    "OLLAMA_HOST",
    "GOLDENAI_TIMEOUT_SECS",
];

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    pub anthropic_base_url: String,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    #[serde(default)]
    pub azure_openai_api_key: Option<String>,
    pub ollama_host: String,
    #[serde(rename = "goldenai_timeout_secs")]
    pub timeout_secs: u64,
}

impl Settings {
    /// Settings from the process environment
    pub fn new() -> LlmResult<Self> {
        Self::with_overrides(HashMap::<String, String>::new())
    }

    /// Settings from the process environment, with `overrides` taking precedence.
    ///
    /// Override keys use the environment variable names, e.g. `OPENAI_API_KEY`.
    pub fn with_overrides<I, K, V>(overrides: I) -> LlmResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let environment: ::config::Map<String, String> = ENV_KEYS
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value)))
            .filter(|(_, value)| !value.is_empty())
            .collect();

        let mut builder = Config::builder()
            .set_default("anthropic_base_url", default_anthropic_base_url())?
            .set_default("openai_base_url", default_openai_base_url())?
            .set_default("ollama_host", default_ollama_host())?
            .set_default("goldenai_timeout_secs", default_timeout_secs())?
            .add_source(Environment::default().source(Some(environment)));

        for (key, value) in overrides {
            builder = builder.set_override(key.as_ref().to_lowercase(), value.into())?;
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        tracing::debug!(
            anthropic_base_url = %settings.anthropic_base_url,
            openai_base_url = %settings.openai_base_url,
            ollama_host = %settings.ollama_host,
            "loaded settings"
        );
        Ok(settings)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            anthropic_api_key: None,
            anthropic_base_url: default_anthropic_base_url(),
            openai_api_key: None,
            openai_base_url: default_openai_base_url(),
            azure_openai_api_key: None,
            ollama_host: default_ollama_host(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_timeout_secs() -> u64 {
    600
}
