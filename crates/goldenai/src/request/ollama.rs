use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::{json, Value};

use super::options::{OptionKey, OptionSpec, RequestOptions};
use super::{check_messages, ensure_not_empty, ProviderRequest};
use crate::document::{DocumentLoader, FsDocumentLoader};
use crate::errors::{LlmError, LlmResult};
use crate::models::message::Message;
use crate::models::provider::ProviderKind;
use crate::models::role::Role;

/// A request for a local Ollama server.
///
/// Ollama takes text messages only. An image travels through the `image` option, which is
/// read once when the request is built and attached to the first user message.
#[derive(Debug, Clone, PartialEq)]
pub struct OllamaRequest {
    model: String,
    messages: Vec<Message>,
    options: RequestOptions,
    image: Option<String>,
}

impl OllamaRequest {
    pub fn new<S: Into<String>>(
        model: S,
        messages: Vec<Message>,
        options: RequestOptions,
    ) -> LlmResult<Self> {
        Self::new_with_loader(&FsDocumentLoader, model, messages, options)
    }

    pub fn new_with_loader<S: Into<String>>(
        loader: &dyn DocumentLoader,
        model: S,
        messages: Vec<Message>,
        options: RequestOptions,
    ) -> LlmResult<Self> {
        let model = model.into();
        Self::validate_options(&model, &options)?;
        check_messages(&messages, Self::PROVIDER)?;

        let image = match options.image() {
            Some(path) => {
                let document = loader.read(path)?;
                if !document.mime_type.starts_with("image/") {
                    return Err(LlmError::UnsupportedContentKind(format!(
                        "ollama `image` must be an image, got {}",
                        document.mime_type
                    )));
                }
                Some(BASE64.encode(&document.bytes))
            }
            None => None,
        };

        Ok(Self {
            model,
            messages,
            options,
            image,
        })
    }

    /// Server URL given with the request, if any
    pub fn url(&self) -> Option<&str> {
        self.options.url()
    }

    /// Base64 image attached to the request
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    fn sampling_options(&self) -> Option<Value> {
        self.options
            .temperature()
            .map(|temperature| json!({ "temperature": temperature }))
    }

    /// Single-prompt body for `/api/generate`, built from the latest user message
    pub fn to_generate_wire(&self) -> LlmResult<Value> {
        let latest = self
            .messages
            .iter()
            .rev()
            .find(|message| message.role == Role::User)
            .ok_or_else(|| LlmError::EmptyConversation(Self::PROVIDER.to_string()))?;

        let mut payload = json!({
            "model": self.model,
            "prompt": latest.text(),
            "stream": false,
        });
        if let Some(prompt) = self.options.prompt() {
            payload["system"] = json!(prompt);
        }
        if let Some(image) = &self.image {
            payload["images"] = json!([image]);
        }
        if let Some(options) = self.sampling_options() {
            payload["options"] = options;
        }
        Ok(payload)
    }
}

impl ProviderRequest for OllamaRequest {
    const PROVIDER: ProviderKind = ProviderKind::Ollama;

    const OPTIONS: &'static [OptionSpec] = &[
        OptionSpec::optional(OptionKey::Url),
        OptionSpec::optional(OptionKey::Prompt),
        OptionSpec::optional(OptionKey::Image),
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

    /// Body for `/api/chat`
    fn to_wire(&self) -> LlmResult<Value> {
        check_messages(&self.messages, Self::PROVIDER)?;
        ensure_not_empty(&self.messages, Self::PROVIDER)?;

        let mut messages = Vec::with_capacity(self.messages.len() + 1);
        if let Some(prompt) = self.options.prompt() {
            messages.push(json!({
                "role": Role::System,
                "content": prompt,
            }));
        }

        let mut image = self.image.as_ref();
        for message in &self.messages {
            let mut entry = json!({
                "role": message.role,
                "content": message.text(),
            });
            if message.role == Role::User {
                if let Some(image) = image.take() {
                    entry["images"] = json!([image]);
                }
            }
            messages.push(entry);
        }

        let mut payload = json!({
            "model": self.model,
            "messages": messages,
            "stream": false,
        });
        if let Some(options) = self.sampling_options() {
            payload["options"] = options;
        }
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{LoadedDocument, MockDocumentLoader};
    use crate::models::content::Content;
    use mockall::predicate::eq;
    use std::path::PathBuf;

    fn hello() -> Vec<Message> {
        vec![Message::user().with_text("Hello, Claude!")]
    }

    fn image_loader(mime_type: &'static str) -> MockDocumentLoader {
        let mut loader = MockDocumentLoader::new();
        loader
            .expect_read()
            .with(eq(PathBuf::from("white.jpg")))
            .times(1)
            .returning(move |_| {
                Ok(LoadedDocument {
                    bytes: b"jpeg".to_vec(),
                    mime_type: mime_type.to_string(),
                    filename: Some("white.jpg".to_string()),
                })
            });
        loader
    }

    #[test]
    fn test_chat_wire_format() {
        let request = OllamaRequest::new(
            "qwen2.5vl:latest",
            hello(),
            RequestOptions::new()
                .with_url("http://localhost:11434")
                .with_prompt("Please answer in Chinese"),
        )
        .unwrap();

        assert_eq!(request.url(), Some("http://localhost:11434"));
        assert_eq!(
            request.to_wire().unwrap(),
            json!({
                "model": "qwen2.5vl:latest",
                "stream": false,
                "messages": [
                    {"role": "system", "content": "Please answer in Chinese"},
                    {"role": "user", "content": "Hello, Claude!"}
                ]
            })
        );
    }

    #[test]
    fn test_url_is_optional() {
        let request = OllamaRequest::new("llama3.2", hello(), RequestOptions::new()).unwrap();
        assert_eq!(request.url(), None);
    }

    #[test]
    fn test_image_is_attached_to_first_user_message() {
        let loader = image_loader("image/jpeg");
        let mut request = OllamaRequest::new_with_loader(
            &loader,
            "qwen2.5vl:latest",
            vec![Message::user().with_text("What is the color of this image?")],
            RequestOptions::new().with_image("white.jpg"),
        )
        .unwrap();
        request
            .messages_mut()
            .push(Message::assistant().with_text("White."));
        request
            .add_message(Message::user().with_text("Are you sure?"))
            .unwrap();

        let encoded = BASE64.encode(b"jpeg");
        assert_eq!(request.image(), Some(encoded.as_str()));

        let wire = request.to_wire().unwrap();
        assert_eq!(wire["messages"][0]["images"], json!([encoded]));
        assert!(wire["messages"][2].get("images").is_none());

        let generate = request.to_generate_wire().unwrap();
        assert_eq!(generate["prompt"], "Are you sure?");
        assert_eq!(generate["images"], json!([encoded]));
    }

    #[test]
    fn test_image_option_must_be_an_image() {
        let loader = image_loader("application/pdf");
        let err = OllamaRequest::new_with_loader(
            &loader,
            "qwen2.5vl:latest",
            hello(),
            RequestOptions::new().with_image("white.jpg"),
        )
        .unwrap_err();
        assert!(matches!(err, LlmError::UnsupportedContentKind(_)));
    }

    #[test]
    fn test_document_content_is_rejected() {
        let image = Content::from_document_bytes(b"jpeg", "image/jpeg", None, None).unwrap();
        let err = OllamaRequest::new(
            "qwen2.5vl:latest",
            vec![Message::user().with_content(image.clone())],
            RequestOptions::new(),
        )
        .unwrap_err();
        assert!(matches!(err, LlmError::UnsupportedContentKind(_)));

        let mut request =
            OllamaRequest::new("qwen2.5vl:latest", hello(), RequestOptions::new()).unwrap();
        let err = request
            .add_message(Message::user().with_content(image))
            .unwrap_err();
        assert!(matches!(err, LlmError::UnsupportedContentKind(_)));
        assert_eq!(request.messages().len(), 1);
    }

    #[test]
    fn test_generate_wire_format() {
        let request = OllamaRequest::new(
            "llama3.2",
            hello(),
            RequestOptions::new()
                .with_prompt("Please answer in Chinese")
                .with_temperature(0.2),
        )
        .unwrap();

        let wire = request.to_generate_wire().unwrap();
        assert_eq!(wire["model"], "llama3.2");
        assert_eq!(wire["prompt"], "Hello, Claude!");
        assert_eq!(wire["system"], "Please answer in Chinese");
        assert_eq!(wire["stream"], false);
        assert!(wire["options"]["temperature"].as_f64().is_some());
    }

    #[test]
    fn test_openai_options_are_rejected() {
        let err = OllamaRequest::new(
            "llama3.2",
            hello(),
            RequestOptions::new().with_max_tokens(100),
        )
        .unwrap_err();
        assert!(matches!(err, LlmError::InvalidOption(_)));
    }

    #[test]
    fn test_empty_conversation_fails() {
        let request = OllamaRequest::new("llama3.2", vec![], RequestOptions::new()).unwrap();
        assert!(matches!(
            request.to_wire(),
            Err(LlmError::EmptyConversation(_))
        ));
        assert!(matches!(
            request.to_generate_wire(),
            Err(LlmError::EmptyConversation(_))
        ));
    }
}
