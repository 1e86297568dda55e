use serde_json::{json, Value};

use super::options::{OptionKey, OptionSpec, RequestOptions};
use super::{check_messages, ensure_not_empty, ProviderRequest};
use crate::errors::{LlmError, LlmResult};
use crate::models::content::{Content, DocumentKind};
use crate::models::message::Message;
use crate::models::provider::ProviderKind;
use crate::models::role::Role;

/// A Messages API request. `max_tokens` is mandatory for this family.
#[derive(Debug, Clone, PartialEq)]
pub struct AnthropicRequest {
    model: String,
    messages: Vec<Message>,
    options: RequestOptions,
}

impl AnthropicRequest {
    pub fn new<S: Into<String>>(
        model: S,
        messages: Vec<Message>,
        options: RequestOptions,
    ) -> LlmResult<Self> {
        let model = model.into();
        Self::validate_options(&model, &options)?;
        check_messages(&messages, Self::PROVIDER)?;
        Ok(Self {
            model,
            messages,
            options,
        })
    }

    pub fn max_tokens(&self) -> u32 {
        // Presence is enforced by the option schema
        self.options.max_tokens().unwrap_or_default()
    }

    /// Prompt followed by the text of any system-role messages
    fn system(&self) -> LlmResult<Option<String>> {
        let mut parts: Vec<String> = self.options.prompt().map(String::from).into_iter().collect();
        for message in self.messages.iter().filter(|m| m.role == Role::System) {
            if message.content.iter().any(|c| c.as_document().is_some()) {
                return Err(LlmError::UnsupportedContentKind(
                    "anthropic system messages can only carry text".to_string(),
                ));
            }
            parts.push(message.text());
        }
        Ok((!parts.is_empty()).then(|| parts.join("\n\n")))
    }
}

fn content_to_anthropic_spec(content: &Content) -> LlmResult<Value> {
    content.check_target(ProviderKind::Anthropic)?;
    let block = match content {
        Content::Text(text) => json!({
            "type": "text",
            "text": text.text,
        }),
        Content::Document(document) => {
            let block_type = match document.kind() {
                DocumentKind::Image => "image",
                DocumentKind::Pdf => "document",
            };
            json!({
                "type": block_type,
                "source": {
                    "type": "base64",
                    "media_type": document.mime_type(),
                    "data": document.data(),
                }
            })
        }
    };
    Ok(block)
}

impl ProviderRequest for AnthropicRequest {
    const PROVIDER: ProviderKind = ProviderKind::Anthropic;

    const OPTIONS: &'static [OptionSpec] = &[
        OptionSpec::required(OptionKey::MaxTokens),
        OptionSpec::optional(OptionKey::Prompt),
        OptionSpec::optional(OptionKey::Temperature),
    ];

    fn model(&self) -> &str {
        &self.model
    }

    fn messages(&self) -> &[Message] {
        &self.messages
    }

    fn messages_mut(&mut self) -> &mut Vec<Message> {
        &mut self.messages
    }

    fn options(&self) -> &RequestOptions {
        &self.options
    }

    fn to_wire(&self) -> LlmResult<Value> {
        let mut messages = Vec::new();
        for message in self.messages.iter().filter(|m| m.role != Role::System) {
            // The Messages API rejects empty text blocks
            let content = message
                .content
                .iter()
                .filter(|content| content.as_text() != Some(""))
                .map(content_to_anthropic_spec)
                .collect::<LlmResult<Vec<_>>>()?;
            if content.is_empty() {
                continue;
            }
            messages.push(json!({
                "role": message.role,
                "content": content,
            }));
        }
        ensure_not_empty(&messages, Self::PROVIDER)?;

        let mut payload = json!({
            "model": self.model,
            "max_tokens": self.max_tokens(),
            "messages": messages,
        });

        if let Some(system) = self.system()? {
            payload["system"] = json!(system);
        }
        if let Some(temperature) = self.options.temperature() {
            payload["temperature"] = json!(temperature);
        }

        Ok(payload)
    }
}
