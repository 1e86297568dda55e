use serde_json::Value;

use super::base::{Credentials, Dispatch, Endpoint, Exchange, Route, TransportKind};
use crate::config::Settings;
use crate::errors::LlmResult;
use crate::request::{OllamaRequest, ProviderRequest};
use crate::response::LLMResponse;

const GENERATE_PATH: &str = "api/generate";
const CHAT_PATH: &str = "api/chat";

/// `send` is a one-shot completion over `/api/generate`, `chat` replays the conversation
/// over `/api/chat`.
impl Dispatch for OllamaRequest {
    fn payload(&self, exchange: Exchange) -> LlmResult<Value> {
        match exchange {
            Exchange::Send => self.to_generate_wire(),
            Exchange::Chat => self.to_wire(),
        }
    }

    fn route(&self, settings: &Settings, exchange: Exchange) -> LlmResult<Route> {
        let path = match exchange {
            Exchange::Send => GENERATE_PATH,
            Exchange::Chat => CHAT_PATH,
        };
        Ok(Route {
            kind: TransportKind::Ollama,
            credentials: Credentials::None,
            endpoint: Endpoint::new(self.url().unwrap_or(&settings.ollama_host), path),
        })
    }

    fn parse(&self, exchange: Exchange, body: Value) -> LlmResult<LLMResponse> {
        match exchange {
            Exchange::Send => LLMResponse::from_ollama_generate(self.model(), body),
            Exchange::Chat => LLMResponse::from_ollama_chat(self.model(), body),
        }
    }
}
