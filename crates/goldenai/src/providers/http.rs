use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use super::base::{Credentials, Endpoint, Transport, TransportError, TransportKind};
use crate::errors::LlmResult;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";
const OLLAMA_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// reqwest backed transport, one per [`TransportKind`]
pub struct HttpTransport {
    kind: TransportKind,
    client: Client,
}

impl HttpTransport {
    pub fn new(kind: TransportKind, timeout: Duration) -> LlmResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::from)?;

        Ok(Self { kind, client })
    }

    pub fn kind(&self) -> TransportKind {
        self.kind
    }

    fn authorize(&self, builder: RequestBuilder, credentials: &Credentials) -> RequestBuilder {
        let api_key = match credentials {
            Credentials::ApiKey(api_key) => api_key,
            Credentials::None => return builder,
        };
        match self.kind {
            TransportKind::Anthropic => builder
                .header("x-api-key", api_key)
                .header("anthropic-version", ANTHROPIC_VERSION),
            TransportKind::OpenAi => builder.bearer_auth(api_key),
            TransportKind::AzureOpenAi => builder.header("api-key", api_key),
            TransportKind::Ollama => builder,
        }
    }

    /// Ollama runs locally and may simply not be up, so check before posting
    async fn probe_ollama(&self, endpoint: &Endpoint) -> LlmResult<()> {
        let url = Endpoint::new(endpoint.base_url.as_str(), "api/version").url();
        let response = self
            .client
            .get(&url)
            .timeout(OLLAMA_PROBE_TIMEOUT)
            .send()
            .await
            .map_err(TransportError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(TransportError::from)?;
            tracing::warn!(%url, status = status.as_u16(), "ollama version probe failed");
            return Err(TransportError::Api {
                status: status.as_u16(),
                body,
            }
            .into());
        }
        Ok(())
    }

    async fn post(&self, payload: &Value, credentials: &Credentials, url: &str) -> LlmResult<Value> {
        let builder = self.client.post(url).json(payload);
        let response = self
            .authorize(builder, credentials)
            .send()
            .await
            .map_err(TransportError::from)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<Value>().await.map_err(TransportError::from)?);
        }

        let body = response.text().await.map_err(TransportError::from)?;
        tracing::warn!(transport = %self.kind, %url, status = status.as_u16(), "request failed");
        Err(TransportError::Api {
            status: status.as_u16(),
            body,
        }
        .into())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(
        &self,
        payload: &Value,
        credentials: &Credentials,
        endpoint: &Endpoint,
    ) -> LlmResult<Value> {
        if self.kind == TransportKind::Ollama {
            self.probe_ollama(endpoint).await?;
        }

        let url = endpoint.url();
        tracing::debug!(transport = %self.kind, %url, "posting request");
        self.post(payload, credentials, &url).await
    }
}
