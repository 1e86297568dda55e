pub mod blocking;
pub mod client;
pub mod config;
pub mod document;
pub mod errors;
pub mod models;
pub mod pricing;
pub mod providers;
pub mod request;
pub mod response;
pub mod token_counter;

pub use client::{chat, send, Client};
pub use crate::config::Settings;
pub use errors::{LlmError, LlmResult};
pub use models::content::Content;
pub use models::message::Message;
pub use models::provider::ProviderKind;
pub use models::role::Role;
pub use request::{
    AnthropicRequest, OllamaRequest, OpenAIRequest, ProviderRequest, Request, RequestOptions,
    TextFormat,
};
pub use response::{LLMResponse, Usage};
pub use token_counter::count_tokens;
