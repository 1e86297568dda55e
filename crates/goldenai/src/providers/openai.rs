use serde_json::Value;

use super::base::{Credentials, Dispatch, Endpoint, Exchange, Route, TransportKind};
use crate::config::{Settings, AZURE_OPENAI_API_KEY, OPENAI_API_KEY};
use crate::errors::LlmResult;
use crate::request::{OpenAIRequest, ProviderRequest};
use crate::response::LLMResponse;

const RESPONSES_PATH: &str = "responses";

impl Dispatch for OpenAIRequest {
    fn payload(&self, _exchange: Exchange) -> LlmResult<Value> {
        self.to_wire()
    }

    /// An endpoint override mentioning `azure` goes through the Azure transport and key.
    /// Any other override keeps the default transport and key at the given URL.
    fn route(&self, settings: &Settings, _exchange: Exchange) -> LlmResult<Route> {
        let route = match self.endpoint() {
            Some(endpoint) if self.is_azure() => Route {
                kind: TransportKind::AzureOpenAi,
                credentials: Credentials::required(
                    settings.azure_openai_api_key.as_ref(),
                    AZURE_OPENAI_API_KEY,
                )?,
                endpoint: Endpoint::new(endpoint, RESPONSES_PATH),
            },
            endpoint => Route {
                kind: TransportKind::OpenAi,
                credentials: Credentials::required(
                    settings.openai_api_key.as_ref(),
                    OPENAI_API_KEY,
                )?,
                endpoint: Endpoint::new(
                    endpoint.unwrap_or(&settings.openai_base_url),
                    RESPONSES_PATH,
                ),
            },
        };
        Ok(route)
    }

    fn parse(&self, _exchange: Exchange, body: Value) -> LlmResult<LLMResponse> {
        LLMResponse::from_openai(self.model(), body)
    }
}
