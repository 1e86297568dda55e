use async_trait::async_trait;
use serde_json::Value;
use strum_macros::Display;
use thiserror::Error;

use crate::config::Settings;
use crate::errors::{LlmError, LlmResult};
use crate::response::LLMResponse;

/// Failures coming back from the wire, kept as the provider reported them
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    /// A successful HTTP exchange whose body reports an error
    #[error("API error in response body: {0}")]
    ErrorBody(String),
}

/// The concrete HTTP flavors a request can be routed through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TransportKind {
    Anthropic,
    OpenAi,
    AzureOpenAi,
    Ollama,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    None,
    ApiKey(String),
}

impl Credentials {
    /// An API key that must be configured, named by its environment variable
    pub fn required(api_key: Option<&String>, env_var: &str) -> LlmResult<Self> {
        api_key
            .filter(|key| !key.is_empty())
            .map(|key| Credentials::ApiKey(key.clone()))
            .ok_or_else(|| LlmError::MissingCredential {
                env_var: env_var.to_string(),
            })
    }
}

/// Where a payload is posted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub base_url: String,
    pub path: String,
}

impl Endpoint {
    pub fn new<B: Into<String>, P: Into<String>>(base_url: B, path: P) -> Self {
        Self {
            base_url: base_url.into(),
            path: path.into(),
        }
    }

    pub fn url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }
}

/// A resolved destination for one call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub kind: TransportKind,
    pub credentials: Credentials,
    pub endpoint: Endpoint,
}

/// Which entry point issued the call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Exchange {
    Send,
    Chat,
}

/// How a request variant is encoded, routed and read back.
///
/// `payload` runs before `route`, so encoding errors surface before credential lookup and
/// neither touches the network.
pub trait Dispatch {
    fn payload(&self, exchange: Exchange) -> LlmResult<Value>;

    fn route(&self, settings: &Settings, exchange: Exchange) -> LlmResult<Route>;

    fn parse(&self, exchange: Exchange, body: Value) -> LlmResult<LLMResponse>;
}

/// Moves one encoded payload to a provider and returns its JSON body
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(
        &self,
        payload: &Value,
        credentials: &Credentials,
        endpoint: &Endpoint,
    ) -> LlmResult<Value>;
}
