use serde_json::Value;

use super::base::{Credentials, Dispatch, Endpoint, Exchange, Route, TransportKind};
use crate::config::{Settings, ANTHROPIC_API_KEY};
use crate::errors::LlmResult;
use crate::request::{AnthropicRequest, ProviderRequest};
use crate::response::LLMResponse;

const MESSAGES_PATH: &str = "v1/messages";

impl Dispatch for AnthropicRequest {
    fn payload(&self, _exchange: Exchange) -> LlmResult<Value> {
        self.to_wire()
    }

    fn route(&self, settings: &Settings, _exchange: Exchange) -> LlmResult<Route> {
        Ok(Route {
            kind: TransportKind::Anthropic,
            credentials: Credentials::required(
                settings.anthropic_api_key.as_ref(),
                ANTHROPIC_API_KEY,
            )?,
            endpoint: Endpoint::new(settings.anthropic_base_url.as_str(), MESSAGES_PATH),
        })
    }

    fn parse(&self, _exchange: Exchange, body: Value) -> LlmResult<LLMResponse> {
        LLMResponse::from_anthropic(self.model(), body)
    }
}
