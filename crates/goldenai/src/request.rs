//! Requests accumulate a conversation plus provider options, and know how to encode
//! themselves for their provider.
//!
//! [`Request`] is a closed union over the three provider variants. Dispatch matches on the
//! variant; each variant implements [`ProviderRequest`] for its option schema and wire format.
pub mod anthropic;
pub mod ollama;
pub mod openai;
pub mod options;

use serde_json::Value;

pub use anthropic::AnthropicRequest;
pub use ollama::OllamaRequest;
pub use openai::OpenAIRequest;
pub use options::{OptionKey, OptionSpec, RequestOption, RequestOptions, TextFormat};

use crate::errors::{LlmError, LlmResult};
use crate::models::message::Message;
use crate::models::provider::ProviderKind;
use crate::response::LLMResponse;

/// Capabilities shared by every request variant
pub trait ProviderRequest {
    const PROVIDER: ProviderKind;

    /// Options this variant recognizes
    const OPTIONS: &'static [OptionSpec];

    fn model(&self) -> &str;

    fn messages(&self) -> &[Message];

    fn messages_mut(&mut self) -> &mut Vec<Message>;

    fn options(&self) -> &RequestOptions;

    /// Encode the whole conversation in the provider's wire format
    fn to_wire(&self) -> LlmResult<Value>;

    fn validate_options(_model: &str, options: &RequestOptions) -> LlmResult<()> {
        options.validate(Self::OPTIONS, Self::PROVIDER)
    }

    /// Append a message after checking its content can be sent to this provider
    fn add_message(&mut self, message: Message) -> LlmResult<()> {
        message.check_target(Self::PROVIDER)?;
        self.messages_mut().push(message);
        Ok(())
    }

    /// Carry a previous answer forward as an assistant turn
    fn add_response(&mut self, response: &LLMResponse) {
        self.messages_mut()
            .push(Message::assistant().with_text(response.output_text()));
    }
}

pub(crate) fn check_messages(messages: &[Message], provider: ProviderKind) -> LlmResult<()> {
    messages
        .iter()
        .try_for_each(|message| message.check_target(provider))
}

pub(crate) fn ensure_not_empty<T>(entries: &[T], provider: ProviderKind) -> LlmResult<()> {
    if entries.is_empty() {
        return Err(LlmError::EmptyConversation(provider.to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Anthropic(AnthropicRequest),
    OpenAi(OpenAIRequest),
    Ollama(OllamaRequest),
}

impl Request {
    pub fn provider(&self) -> ProviderKind {
        match self {
            Request::Anthropic(_) => AnthropicRequest::PROVIDER,
            Request::OpenAi(_) => OpenAIRequest::PROVIDER,
            Request::Ollama(_) => OllamaRequest::PROVIDER,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Request::Anthropic(request) => request.model(),
            Request::OpenAi(request) => request.model(),
            Request::Ollama(request) => request.model(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        match self {
            Request::Anthropic(request) => request.messages(),
            Request::OpenAi(request) => request.messages(),
            Request::Ollama(request) => request.messages(),
        }
    }

    pub fn options(&self) -> &RequestOptions {
        match self {
            Request::Anthropic(request) => request.options(),
            Request::OpenAi(request) => request.options(),
            Request::Ollama(request) => request.options(),
        }
    }

    pub fn add_message(&mut self, message: Message) -> LlmResult<()> {
        match self {
            Request::Anthropic(request) => request.add_message(message),
            Request::OpenAi(request) => request.add_message(message),
            Request::Ollama(request) => request.add_message(message),
        }
    }

    pub fn add_response(&mut self, response: &LLMResponse) {
        match self {
            Request::Anthropic(request) => request.add_response(response),
            Request::OpenAi(request) => request.add_response(response),
            Request::Ollama(request) => request.add_response(response),
        }
    }

    pub fn to_wire(&self) -> LlmResult<Value> {
        match self {
            Request::Anthropic(request) => request.to_wire(),
            Request::OpenAi(request) => request.to_wire(),
            Request::Ollama(request) => request.to_wire(),
        }
    }
}

impl From<AnthropicRequest> for Request {
    fn from(request: AnthropicRequest) -> Self {
        Request::Anthropic(request)
    }
}

impl From<OpenAIRequest> for Request {
    fn from(request: OpenAIRequest) -> Self {
        Request::OpenAi(request)
    }
}

impl From<OllamaRequest> for Request {
    fn from(request: OllamaRequest) -> Self {
        Request::Ollama(request)
    }
}
