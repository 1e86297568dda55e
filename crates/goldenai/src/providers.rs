//! Everything between an encoded request and a provider's HTTP API.
pub mod anthropic;
pub mod base;
pub mod http;
pub mod ollama;
pub mod openai;

#[cfg(test)]
pub mod mock;
