//! Normalized answers. Every provider's reply is parsed into one [`LLMResponse`] shape, with
//! the untouched provider body kept alongside.
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{LlmError, LlmResult};
use crate::models::provider::ProviderKind;
use crate::pricing;
use crate::providers::base::TransportError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl Usage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    fn from_value(usage: &Value, input_key: &str, output_key: &str) -> Self {
        let count = |key: &str| {
            usage
                .get(key)
                .and_then(Value::as_u64)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(0)
        };
        Self::new(count(input_key), count(output_key))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LLMResponse {
    pub provider: ProviderKind,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    output_text: String,
    pub usage: Usage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
    /// Provider body as received
    #[serde(default)]
    pub raw: Value,
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(String::from)
}

impl LLMResponse {
    pub fn new<M: Into<String>, T: Into<String>>(
        provider: ProviderKind,
        model: M,
        output_text: T,
        usage: Usage,
        raw: Value,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            id: None,
            output_text: output_text.into(),
            usage,
            stop_reason: None,
            raw,
        }
    }

    /// The generated text, parts concatenated in the order the provider returned them
    pub fn output_text(&self) -> &str {
        &self.output_text
    }

    /// Deserialize the output text, for answers produced under a `text_format` schema
    pub fn output_json<T: DeserializeOwned>(&self) -> LlmResult<T> {
        serde_json::from_str(&self.output_text).map_err(|e| {
            LlmError::invalid_response(
                self.provider,
                format!("output is not the expected JSON: {}", e),
            )
        })
    }

    /// Dollar cost of this exchange from the price table
    pub fn cost(&self) -> LlmResult<f64> {
        pricing::cost(&self.model, self.usage)
    }

    /// Parse a Messages API body. Only `text` blocks contribute to the output text.
    pub fn from_anthropic(requested_model: &str, body: Value) -> LlmResult<Self> {
        let blocks = body
            .get("content")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                LlmError::invalid_response(ProviderKind::Anthropic, "missing `content` array")
            })?;

        let text = blocks
            .iter()
            .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
            .filter_map(|block| block.get("text").and_then(Value::as_str))
            .collect::<String>();

        let usage = body
            .get("usage")
            .map(|usage| Usage::from_value(usage, "input_tokens", "output_tokens"))
            .unwrap_or_default();
        let model = str_field(&body, "model").unwrap_or_else(|| requested_model.to_string());

        Ok(Self {
            id: str_field(&body, "id"),
            stop_reason: str_field(&body, "stop_reason"),
            ..Self::new(ProviderKind::Anthropic, model, text, usage, body)
        })
    }

    /// Parse a Responses API body.
    ///
    /// Only `message` output items are read, so reasoning items never leak into the text. A
    /// populated `error` object is surfaced as an API error.
    pub fn from_openai(requested_model: &str, body: Value) -> LlmResult<Self> {
        if let Some(error) = body.get("error").filter(|error| !error.is_null()) {
            return Err(TransportError::ErrorBody(error.to_string()).into());
        }

        let output = body
            .get("output")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                LlmError::invalid_response(ProviderKind::OpenAi, "missing `output` array")
            })?;

        let text = output
            .iter()
            .filter(|item| item.get("type").and_then(Value::as_str) == Some("message"))
            .filter_map(|item| item.get("content").and_then(Value::as_array))
            .flatten()
            .filter(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect::<String>();

        let usage = body
            .get("usage")
            .map(|usage| Usage::from_value(usage, "input_tokens", "output_tokens"))
            .unwrap_or_default();
        let model = str_field(&body, "model").unwrap_or_else(|| requested_model.to_string());
        let stop_reason = body
            .get("incomplete_details")
            .and_then(|details| str_field(details, "reason"))
            .or_else(|| str_field(&body, "status"));

        Ok(Self {
            id: str_field(&body, "id"),
            stop_reason,
            ..Self::new(ProviderKind::OpenAi, model, text, usage, body)
        })
    }

    /// Parse an `/api/generate` body
    pub fn from_ollama_generate(requested_model: &str, body: Value) -> LlmResult<Self> {
        let text = str_field(&body, "response").ok_or_else(|| {
            LlmError::invalid_response(ProviderKind::Ollama, "missing `response` field")
        })?;
        Ok(Self::from_ollama(requested_model, text, body))
    }

    /// Parse an `/api/chat` body
    pub fn from_ollama_chat(requested_model: &str, body: Value) -> LlmResult<Self> {
        let text = body
            .get("message")
            .and_then(|message| str_field(message, "content"))
            .ok_or_else(|| {
                LlmError::invalid_response(ProviderKind::Ollama, "missing `message.content`")
            })?;
        Ok(Self::from_ollama(requested_model, text, body))
    }

    fn from_ollama(requested_model: &str, text: String, body: Value) -> Self {
        // prompt_eval_count counts the prompt, eval_count the generated tokens
        let usage = Usage::from_value(&body, "prompt_eval_count", "eval_count");
        let model = str_field(&body, "model").unwrap_or_else(|| requested_model.to_string());
        Self {
            stop_reason: str_field(&body, "done_reason"),
            ..Self::new(ProviderKind::Ollama, model, text, usage, body)
        }
    }
}

impl fmt::Display for LLMResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.output_text)
    }
}
