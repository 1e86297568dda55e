use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};

use super::options::{OptionKey, OptionSpec, RequestOptions};
use super::{check_messages, ensure_not_empty, ProviderRequest};
use crate::errors::{LlmError, LlmResult};
use crate::models::content::Content;
use crate::models::message::Message;
use crate::models::provider::ProviderKind;
use crate::models::role::Role;

lazy_static! {
    static ref REASONING_MODEL: Regex = Regex::new(r"^o[134]|gpt-5").unwrap();
}

/// True for models that accept a `reasoning` block
pub fn is_reasoning_model(model: &str) -> bool {
    REASONING_MODEL.is_match(model)
}

/// A Responses API request, for OpenAI or an Azure OpenAI deployment.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAIRequest {
    model: String,
    messages: Vec<Message>,
    options: RequestOptions,
}

impl OpenAIRequest {
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

    /// Base URL override, if any
    pub fn endpoint(&self) -> Option<&str> {
        self.options.endpoint()
    }

    /// Whether the endpoint override points at an Azure deployment
    pub fn is_azure(&self) -> bool {
        self.endpoint()
            .map(|endpoint| endpoint.to_lowercase().contains("azure"))
            .unwrap_or(false)
    }

    /// Append a previous answer given as plain text
    pub fn add_response_text<S: Into<String>>(&mut self, text: S) {
        self.messages.push(Message::assistant().with_text(text));
    }

    fn reasoning(&self) -> Option<Value> {
        if !is_reasoning_model(&self.model) {
            return None;
        }
        let mut reasoning = json!({
            "effort": self.options.reasoning_effort().unwrap_or_default(),
        });
        if let Some(summary) = self.options.reasoning_summary() {
            reasoning["summary"] = json!(summary);
        }
        Some(reasoning)
    }
}

fn content_to_openai_spec(content: &Content, role: Role) -> LlmResult<Value> {
    content.check_target(ProviderKind::OpenAi)?;
    let item = match content {
        Content::Text(text) => {
            let item_type = match role {
                Role::Assistant => "output_text",
                Role::User | Role::System => "input_text",
            };
            json!({
                "type": item_type,
                "text": text.text,
            })
        }
        Content::Document(document) => json!({
            "type": "input_file",
            "filename": document.filename().unwrap_or("document.pdf"),
            "file_data": document.data_url(),
        }),
    };
    Ok(item)
}

impl ProviderRequest for OpenAIRequest {
    const PROVIDER: ProviderKind = ProviderKind::OpenAi;

    const OPTIONS: &'static [OptionSpec] = &[
        OptionSpec::optional(OptionKey::MaxTokens),
        OptionSpec::optional(OptionKey::Prompt),
        OptionSpec::optional(OptionKey::Temperature),
        OptionSpec::optional(OptionKey::Endpoint),
        OptionSpec::optional(OptionKey::ReasoningEffort),
        OptionSpec::optional(OptionKey::ReasoningSummary),
        OptionSpec::optional(OptionKey::TextFormat),
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

    fn validate_options(model: &str, options: &RequestOptions) -> LlmResult<()> {
        options.validate(Self::OPTIONS, Self::PROVIDER)?;

        let wants_reasoning = options.contains(OptionKey::ReasoningEffort)
            || options.contains(OptionKey::ReasoningSummary);
        if wants_reasoning && !is_reasoning_model(model) {
            return Err(LlmError::InvalidOption(format!(
                "reasoning options are not supported by {}",
                model
            )));
        }
        Ok(())
    }

    fn to_wire(&self) -> LlmResult<Value> {
        let mut input = Vec::with_capacity(self.messages.len());
        for message in &self.messages {
            let content = message
                .content
                .iter()
                .map(|content| content_to_openai_spec(content, message.role))
                .collect::<LlmResult<Vec<_>>>()?;
            input.push(json!({
                "role": message.role,
                "content": content,
            }));
        }
        ensure_not_empty(&input, Self::PROVIDER)?;

        let mut payload = json!({
            "model": self.model,
            "input": input,
        });

        if let Some(prompt) = self.options.prompt() {
            payload["instructions"] = json!(prompt);
        }
        if let Some(max_tokens) = self.options.max_tokens() {
            payload["max_output_tokens"] = json!(max_tokens);
        }
        if let Some(temperature) = self.options.temperature() {
            payload["temperature"] = json!(temperature);
        }
        if let Some(reasoning) = self.reasoning() {
            payload["reasoning"] = reasoning;
        }
        if let Some(format) = self.options.text_format() {
            payload["text"] = json!({
                "format": {
                    "type": "json_schema",
                    "name": format.name,
                    "schema": format.schema,
                    "strict": format.strict,
                }
            });
        }

        Ok(payload)
    }
}
