//! Provider options a request can carry, and the schema each request variant accepts.
//!
//! Options are validated once, when the request is built. An option the variant does not
//! recognize is an [`LlmError::InvalidOption`], it is never dropped on the floor.
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::errors::{LlmError, LlmResult};
use crate::models::provider::ProviderKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum OptionKey {
    /// Upper bound on generated tokens (`max_tokens`, `max_output_tokens` for OpenAI)
    MaxTokens,
    /// System prompt (`system` for Anthropic, `instructions` for OpenAI, a leading system
    /// message or `system` field for Ollama)
    Prompt,
    /// Sampling temperature
    Temperature,
    /// OpenAI base URL override. URLs containing `azure` route through the Azure transport
    Endpoint,
    /// `reasoning.effort`, reasoning-capable OpenAI models only
    ReasoningEffort,
    /// `reasoning.summary`, reasoning-capable OpenAI models only
    ReasoningSummary,
    /// Ollama base URL
    Url,
    /// Path to an image attached to an Ollama request as base64
    Image,
    /// JSON schema the answer must follow, OpenAI only
    TextFormat,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReasoningEffort {
    Minimal,
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReasoningSummary {
    Auto,
    Concise,
    Detailed,
}

/// A named JSON schema for structured output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFormat {
    pub name: String,
    pub schema: Value,
    #[serde(default = "default_strict")]
    pub strict: bool,
}

fn default_strict() -> bool {
    true
}

impl TextFormat {
    /// A strict schema
    pub fn new<S: Into<String>>(name: S, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
            strict: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestOption {
    MaxTokens(u32),
    Prompt(String),
    Temperature(f64),
    Endpoint(String),
    ReasoningEffort(ReasoningEffort),
    ReasoningSummary(ReasoningSummary),
    Url(String),
    Image(PathBuf),
    TextFormat(TextFormat),
}

impl RequestOption {
    pub fn key(&self) -> OptionKey {
        match self {
            RequestOption::MaxTokens(_) => OptionKey::MaxTokens,
            RequestOption::Prompt(_) => OptionKey::Prompt,
            RequestOption::Temperature(_) => OptionKey::Temperature,
            RequestOption::Endpoint(_) => OptionKey::Endpoint,
            RequestOption::ReasoningEffort(_) => OptionKey::ReasoningEffort,
            RequestOption::ReasoningSummary(_) => OptionKey::ReasoningSummary,
            RequestOption::Url(_) => OptionKey::Url,
            RequestOption::Image(_) => OptionKey::Image,
            RequestOption::TextFormat(_) => OptionKey::TextFormat,
        }
    }
}

/// One entry of a variant's option schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    pub key: OptionKey,
    pub required: bool,
}

impl OptionSpec {
    pub const fn optional(key: OptionKey) -> Self {
        Self {
            key,
            required: false,
        }
    }

    pub const fn required(key: OptionKey) -> Self {
        Self {
            key,
            required: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    options: Vec<RequestOption>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, option: RequestOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn with_max_tokens(self, max_tokens: u32) -> Self {
        self.with(RequestOption::MaxTokens(max_tokens))
    }

    pub fn with_prompt<S: Into<String>>(self, prompt: S) -> Self {
        self.with(RequestOption::Prompt(prompt.into()))
    }

    pub fn with_temperature(self, temperature: f64) -> Self {
        self.with(RequestOption::Temperature(temperature))
    }

    pub fn with_endpoint<S: Into<String>>(self, endpoint: S) -> Self {
        self.with(RequestOption::Endpoint(endpoint.into()))
    }

    pub fn with_reasoning_effort(self, effort: ReasoningEffort) -> Self {
        self.with(RequestOption::ReasoningEffort(effort))
    }

    pub fn with_reasoning_summary(self, summary: ReasoningSummary) -> Self {
        self.with(RequestOption::ReasoningSummary(summary))
    }

    pub fn with_url<S: Into<String>>(self, url: S) -> Self {
        self.with(RequestOption::Url(url.into()))
    }

    pub fn with_image<P: Into<PathBuf>>(self, path: P) -> Self {
        self.with(RequestOption::Image(path.into()))
    }

    pub fn with_text_format(self, format: TextFormat) -> Self {
        self.with(RequestOption::TextFormat(format))
    }

    /// Parse options from a JSON object such as `{"max_tokens": 1024, "prompt": "..."}`.
    ///
    /// `null` values are treated as absent.
    pub fn from_json(value: &Value) -> LlmResult<Self> {
        let object = value.as_object().ok_or_else(|| {
            LlmError::InvalidOption("request options must be a JSON object".to_string())
        })?;

        let mut options = Self::new();
        for (name, value) in object {
            if value.is_null() {
                continue;
            }
            let key = OptionKey::from_str(name)
                .map_err(|_| LlmError::InvalidOption(format!("unknown option `{}`", name)))?;
            options = options.with(parse_option(key, value)?);
        }
        Ok(options)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RequestOption> {
        self.options.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn contains(&self, key: OptionKey) -> bool {
        self.options.iter().any(|option| option.key() == key)
    }

    pub fn max_tokens(&self) -> Option<u32> {
        self.options.iter().find_map(|option| match option {
            RequestOption::MaxTokens(value) => Some(*value),
            _ => None,
        })
    }

    pub fn prompt(&self) -> Option<&str> {
        self.options.iter().find_map(|option| match option {
            RequestOption::Prompt(value) => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn temperature(&self) -> Option<f64> {
        self.options.iter().find_map(|option| match option {
            RequestOption::Temperature(value) => Some(*value),
            _ => None,
        })
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.options.iter().find_map(|option| match option {
            RequestOption::Endpoint(value) => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn reasoning_effort(&self) -> Option<ReasoningEffort> {
        self.options.iter().find_map(|option| match option {
            RequestOption::ReasoningEffort(value) => Some(*value),
            _ => None,
        })
    }

    pub fn reasoning_summary(&self) -> Option<ReasoningSummary> {
        self.options.iter().find_map(|option| match option {
            RequestOption::ReasoningSummary(value) => Some(*value),
            _ => None,
        })
    }

    pub fn url(&self) -> Option<&str> {
        self.options.iter().find_map(|option| match option {
            RequestOption::Url(value) => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn image(&self) -> Option<&Path> {
        self.options.iter().find_map(|option| match option {
            RequestOption::Image(value) => Some(value.as_path()),
            _ => None,
        })
    }

    pub fn text_format(&self) -> Option<&TextFormat> {
        self.options.iter().find_map(|option| match option {
            RequestOption::TextFormat(value) => Some(value),
            _ => None,
        })
    }

    /// Check every option against `schema`: known, not repeated, well formed, and every
    /// required key present.
    pub(crate) fn validate(&self, schema: &[OptionSpec], provider: ProviderKind) -> LlmResult<()> {
        let mut seen = HashSet::new();
        for option in &self.options {
            let key = option.key();
            if !schema.iter().any(|spec| spec.key == key) {
                return Err(LlmError::InvalidOption(format!(
                    "`{}` is not supported by {} requests",
                    key, provider
                )));
            }
            if !seen.insert(key) {
                return Err(LlmError::InvalidOption(format!(
                    "`{}` was given more than once",
                    key
                )));
            }
            check_value(option)?;
        }

        if let Some(missing) = schema
            .iter()
            .find(|spec| spec.required && !seen.contains(&spec.key))
        {
            return Err(LlmError::InvalidOption(format!(
                "`{}` is required by {} requests",
                missing.key, provider
            )));
        }
        Ok(())
    }
}

impl FromIterator<RequestOption> for RequestOptions {
    fn from_iter<I: IntoIterator<Item = RequestOption>>(iter: I) -> Self {
        Self {
            options: iter.into_iter().collect(),
        }
    }
}

fn check_value(option: &RequestOption) -> LlmResult<()> {
    match option {
        RequestOption::MaxTokens(0) => Err(LlmError::InvalidOption(
            "`max_tokens` must be greater than zero".to_string(),
        )),
        RequestOption::Temperature(value) if !(0.0..=2.0).contains(value) => Err(
            LlmError::InvalidOption(format!("`temperature` {} is outside 0.0..=2.0", value)),
        ),
        RequestOption::Endpoint(value) | RequestOption::Url(value) => url::Url::parse(value)
            .map(|_| ())
            .map_err(|e| {
                LlmError::InvalidOption(format!("`{}` is not a valid URL: {}", option.key(), e))
            }),
        RequestOption::TextFormat(format) if format.name.trim().is_empty() => Err(
            LlmError::InvalidOption("`text_format` needs a schema name".to_string()),
        ),
        RequestOption::TextFormat(format) if !format.schema.is_object() => Err(
            LlmError::InvalidOption("`text_format` schema must be a JSON object".to_string()),
        ),
        _ => Ok(()),
    }
}

fn parse_option(key: OptionKey, value: &Value) -> LlmResult<RequestOption> {
    let invalid = |expected: &str| {
        LlmError::InvalidOption(format!("`{}` must be {}, got {}", key, expected, value))
    };
    let as_string = || value.as_str().map(String::from).ok_or_else(|| invalid("a string"));

    let option = match key {
        OptionKey::MaxTokens => RequestOption::MaxTokens(
            value
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| invalid("a positive integer"))?,
        ),
        OptionKey::Prompt => RequestOption::Prompt(as_string()?),
        OptionKey::Temperature => {
            RequestOption::Temperature(value.as_f64().ok_or_else(|| invalid("a number"))?)
        }
        OptionKey::Endpoint => RequestOption::Endpoint(as_string()?),
        OptionKey::ReasoningEffort => RequestOption::ReasoningEffort(
            ReasoningEffort::from_str(&as_string()?)
                .map_err(|_| invalid("one of minimal, low, medium, high"))?,
        ),
        OptionKey::ReasoningSummary => RequestOption::ReasoningSummary(
            ReasoningSummary::from_str(&as_string()?)
                .map_err(|_| invalid("one of auto, concise, detailed"))?,
        ),
        OptionKey::Url => RequestOption::Url(as_string()?),
        OptionKey::Image => RequestOption::Image(PathBuf::from(as_string()?)),
        OptionKey::TextFormat => RequestOption::TextFormat(
            serde_json::from_value(value.clone())
                .map_err(|_| invalid("an object with `name` and `schema`"))?,
        ),
    };
    Ok(option)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SCHEMA: &[OptionSpec] = &[
        OptionSpec::required(OptionKey::MaxTokens),
        OptionSpec::optional(OptionKey::Prompt),
    ];

    #[test]
    fn test_from_json() {
        let options = RequestOptions::from_json(&json!({
            "max_tokens": 1024,
            "prompt": "Please answer in Chinese",
            "reasoning_effort": "high",
            "endpoint": null
        }))
        .unwrap();

        assert_eq!(options.max_tokens(), Some(1024));
        assert_eq!(options.prompt(), Some("Please answer in Chinese"));
        assert_eq!(options.reasoning_effort(), Some(ReasoningEffort::High));
        assert!(!options.contains(OptionKey::Endpoint));
    }

    #[test]
    fn test_from_json_unknown_key() {
        let err = RequestOptions::from_json(&json!({"top_k": 3})).unwrap_err();
        assert!(matches!(err, LlmError::InvalidOption(msg) if msg.contains("top_k")));
    }

    #[test]
    fn test_from_json_wrong_type() {
        let err = RequestOptions::from_json(&json!({"max_tokens": "lots"})).unwrap_err();
        assert!(matches!(err, LlmError::InvalidOption(_)));

        let err = RequestOptions::from_json(&json!({"reasoning_summary": "long"})).unwrap_err();
        assert!(matches!(err, LlmError::InvalidOption(_)));
    }

    #[test]
    fn test_validate_rejects_unrecognized() {
        let options = RequestOptions::new()
            .with_max_tokens(10)
            .with_endpoint("https://example.com");
        let err = options
            .validate(SCHEMA, ProviderKind::Anthropic)
            .unwrap_err();
        assert!(
            matches!(err, LlmError::InvalidOption(msg) if msg == "`endpoint` is not supported by anthropic requests")
        );
    }

    #[test]
    fn test_validate_requires_keys() {
        let options = RequestOptions::new().with_prompt("hi");
        let err = options
            .validate(SCHEMA, ProviderKind::Anthropic)
            .unwrap_err();
        assert!(matches!(err, LlmError::InvalidOption(msg) if msg.contains("max_tokens")));
    }

    #[test]
    fn test_validate_rejects_duplicates_and_bad_values() {
        let duplicated = RequestOptions::new().with_max_tokens(10).with_max_tokens(20);
        assert!(duplicated.validate(SCHEMA, ProviderKind::Anthropic).is_err());

        let zero = RequestOptions::new().with_max_tokens(0);
        assert!(zero.validate(SCHEMA, ProviderKind::Anthropic).is_err());
    }

    #[test]
    fn test_validate_checks_temperature_range() {
        let schema = &[OptionSpec::optional(OptionKey::Temperature)];
        for ok in [0.0, 0.7, 2.0] {
            let options = RequestOptions::new().with_temperature(ok);
            assert!(options.validate(schema, ProviderKind::OpenAi).is_ok());
        }
        for bad in [-0.1, 2.5] {
            let err = RequestOptions::new()
                .with_temperature(bad)
                .validate(schema, ProviderKind::OpenAi)
                .unwrap_err();
            assert!(matches!(err, LlmError::InvalidOption(msg) if msg.contains("temperature")));
        }
    }

    #[test]
    fn test_validate_rejects_malformed_urls() {
        let schema = &[
            OptionSpec::optional(OptionKey::Endpoint),
            OptionSpec::optional(OptionKey::Url),
        ];
        let err = RequestOptions::new()
            .with_endpoint("not a url")
            .validate(schema, ProviderKind::OpenAi)
            .unwrap_err();
        assert!(matches!(err, LlmError::InvalidOption(msg) if msg.contains("endpoint")));

        let err = RequestOptions::new()
            .with_url("localhost 11434")
            .validate(schema, ProviderKind::Ollama)
            .unwrap_err();
        assert!(matches!(err, LlmError::InvalidOption(msg) if msg.contains("url")));

        let options = RequestOptions::new()
            .with_endpoint("https://api.openai.com/v1")
            .with_url("http://localhost:11434");
        assert!(options.validate(schema, ProviderKind::OpenAi).is_ok());
    }

    #[test]
    fn test_text_format_from_json_and_validation() {
        let options = RequestOptions::from_json(&json!({
            "text_format": {
                "name": "invoice",
                "schema": {"type": "object", "properties": {"total": {"type": "number"}}}
            }
        }))
        .unwrap();
        let format = options.text_format().unwrap();
        assert_eq!(format.name, "invoice");
        assert!(format.strict);

        let err = RequestOptions::from_json(&json!({"text_format": "invoice"})).unwrap_err();
        assert!(matches!(err, LlmError::InvalidOption(_)));

        let schema = &[OptionSpec::optional(OptionKey::TextFormat)];
        let err = RequestOptions::new()
            .with_text_format(TextFormat::new("invoice", json!("object")))
            .validate(schema, ProviderKind::OpenAi)
            .unwrap_err();
        assert!(matches!(err, LlmError::InvalidOption(_)));
    }

    #[test]
    fn test_option_key_names() {
        assert_eq!(OptionKey::ReasoningSummary.to_string(), "reasoning_summary");
        assert_eq!(OptionKey::from_str("max_tokens").unwrap(), OptionKey::MaxTokens);
    }
}
