//! Synchronous wrappers for callers without an async runtime.
//!
//! Each call builds a current-thread tokio runtime, so these must not be used from inside
//! an existing runtime.
use crate::client::Client;
use crate::errors::{LlmError, LlmResult};
use crate::request::Request;
use crate::response::LLMResponse;

fn block_on<F: std::future::Future<Output = LlmResult<LLMResponse>>>(
    future: F,
) -> LlmResult<LLMResponse> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(LlmError::Runtime)?;
    runtime.block_on(future)
}

pub fn send(request: &Request) -> LlmResult<LLMResponse> {
    let client = Client::new()?;
    block_on(client.send(request))
}

pub fn chat(request: &Request) -> LlmResult<LLMResponse> {
    let client = Client::new()?;
    block_on(client.chat(request))
}

/// Blocking calls through an existing client
pub trait BlockingClient {
    fn send_blocking(&self, request: &Request) -> LlmResult<LLMResponse>;

    fn chat_blocking(&self, request: &Request) -> LlmResult<LLMResponse>;
}

impl BlockingClient for Client {
    fn send_blocking(&self, request: &Request) -> LlmResult<LLMResponse> {
        block_on(self.send(request))
    }

    fn chat_blocking(&self, request: &Request) -> LlmResult<LLMResponse> {
        block_on(self.chat(request))
    }
}
