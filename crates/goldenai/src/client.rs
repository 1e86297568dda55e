//! Dispatch: pick the transport for a request variant, call it, normalize the answer.
use std::sync::Arc;

use crate::config::Settings;
use crate::errors::LlmResult;
use crate::providers::base::{Dispatch, Exchange, Transport, TransportKind};
use crate::providers::http::HttpTransport;
use crate::request::{ProviderRequest, Request};
use crate::response::LLMResponse;
use crate::token_counter;

#[derive(Clone)]
struct Transports {
    anthropic: Arc<dyn Transport>,
    openai: Arc<dyn Transport>,
    azure_openai: Arc<dyn Transport>,
    ollama: Arc<dyn Transport>,
}

impl Transports {
    fn http(settings: &Settings) -> LlmResult<Self> {
        let http = |kind| -> LlmResult<Arc<dyn Transport>> {
            Ok(Arc::new(HttpTransport::new(kind, settings.timeout())?))
        };
        Ok(Self {
            anthropic: http(TransportKind::Anthropic)?,
            openai: http(TransportKind::OpenAi)?,
            azure_openai: http(TransportKind::AzureOpenAi)?,
            ollama: http(TransportKind::Ollama)?,
        })
    }

    fn slot(&mut self, kind: TransportKind) -> &mut Arc<dyn Transport> {
        match kind {
            TransportKind::Anthropic => &mut self.anthropic,
            TransportKind::OpenAi => &mut self.openai,
            TransportKind::AzureOpenAi => &mut self.azure_openai,
            TransportKind::Ollama => &mut self.ollama,
        }
    }

    fn get(&self, kind: TransportKind) -> &dyn Transport {
        match kind {
            TransportKind::Anthropic => self.anthropic.as_ref(),
            TransportKind::OpenAi => self.openai.as_ref(),
            TransportKind::AzureOpenAi => self.azure_openai.as_ref(),
            TransportKind::Ollama => self.ollama.as_ref(),
        }
    }
}

/// Sends requests to their provider. Cheap to clone and safe to share across tasks.
#[derive(Clone)]
pub struct Client {
    settings: Settings,
    transports: Transports,
}

impl Client {
    /// A client configured from the environment
    pub fn new() -> LlmResult<Self> {
        Self::from_settings(Settings::new()?)
    }

    pub fn from_settings(settings: Settings) -> LlmResult<Self> {
        let transports = Transports::http(&settings)?;
        Ok(Self {
            settings,
            transports,
        })
    }

    /// Replace the transport used for `kind`
    pub fn with_transport(mut self, kind: TransportKind, transport: Arc<dyn Transport>) -> Self {
        *self.transports.slot(kind) = transport;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// One round trip. The request is left untouched.
    pub async fn send(&self, request: &Request) -> LlmResult<LLMResponse> {
        self.dispatch(request, Exchange::Send).await
    }

    /// One round trip carrying the request's whole conversation. Fold the answer back with
    /// [`Request::add_response`] to continue.
    pub async fn chat(&self, request: &Request) -> LlmResult<LLMResponse> {
        self.dispatch(request, Exchange::Chat).await
    }

    /// Offline estimate of the request's input tokens
    pub fn count_tokens(&self, request: &Request) -> usize {
        token_counter::count_tokens(request)
    }

    async fn dispatch(&self, request: &Request, exchange: Exchange) -> LlmResult<LLMResponse> {
        match request {
            Request::Anthropic(request) => self.dispatch_variant(request, exchange).await,
            Request::OpenAi(request) => self.dispatch_variant(request, exchange).await,
            Request::Ollama(request) => self.dispatch_variant(request, exchange).await,
        }
    }

    async fn dispatch_variant<R>(&self, request: &R, exchange: Exchange) -> LlmResult<LLMResponse>
    where
        R: Dispatch + ProviderRequest + Sync,
    {
        let payload = request.payload(exchange)?;
        let route = request.route(&self.settings, exchange)?;

        tracing::debug!(
            provider = %R::PROVIDER,
            model = request.model(),
            transport = %route.kind,
            %exchange,
            "dispatching request"
        );
        let body = self
            .transports
            .get(route.kind)
            .call(&payload, &route.credentials, &route.endpoint)
            .await?;

        let response = request.parse(exchange, body)?;
        tracing::debug!(
            model = %response.model,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "received response"
        );
        Ok(response)
    }
}

/// [`Client::send`] with a client configured from the environment
pub async fn send(request: &Request) -> LlmResult<LLMResponse> {
    Client::new()?.send(request).await
}

/// [`Client::chat`] with a client configured from the environment
pub async fn chat(request: &Request) -> LlmResult<LLMResponse> {
    Client::new()?.chat(request).await
}
