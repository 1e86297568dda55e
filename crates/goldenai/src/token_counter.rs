//! Offline token estimates. Text is encoded with tiktoken BPEs; images and PDFs use fixed
//! per-item estimates since their real cost is decided server side.
use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::bytes::Regex;
use tiktoken_rs::CoreBPE;

use crate::models::content::{Content, DocumentKind};
use crate::models::message::Message;
use crate::request::Request;

const O200K_TOKENIZER_KEY: &str = "o200k_base";
const CL100K_TOKENIZER_KEY: &str = "cl100k_base";

/// Role markers and separators wrapped around every message
const TOKENS_PER_MESSAGE: usize = 3;
/// Priming for the assistant reply
const REPLY_TOKENS: usize = 3;
const IMAGE_TOKENS: usize = 1_600;
const PDF_PAGE_TOKENS: usize = 1_500;

lazy_static! {
    static ref COUNTER: TokenCounter = TokenCounter::new();
    static ref PDF_PAGE: Regex = Regex::new(r"/Type\s*/Page\b").unwrap();
}

pub struct TokenCounter {
    tokenizers: HashMap<&'static str, CoreBPE>,
}

impl Default for TokenCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCounter {
    fn load_tokenizer(&mut self, tokenizer_key: &'static str) {
        let tokenizer = match tokenizer_key {
            O200K_TOKENIZER_KEY => tiktoken_rs::o200k_base(),
            _ => tiktoken_rs::cl100k_base(),
        };

        match tokenizer {
            Ok(tokenizer) => {
                self.tokenizers.insert(tokenizer_key, tokenizer);
            }
            Err(e) => {
                tracing::warn!(tokenizer = tokenizer_key, error = %e, "failed to load tokenizer");
            }
        }
    }

    pub fn new() -> Self {
        let mut counter = TokenCounter {
            tokenizers: HashMap::new(),
        };
        for tokenizer_key in [O200K_TOKENIZER_KEY, CL100K_TOKENIZER_KEY] {
            counter.load_tokenizer(tokenizer_key);
        }
        counter
    }

    fn model_to_tokenizer_key(model_name: Option<&str>) -> &'static str {
        let model_name = model_name.unwrap_or("gpt-4o").to_lowercase();
        let is_o200k = ["gpt-4o", "gpt-4.1", "gpt-5", "o1", "o3", "o4"]
            .iter()
            .any(|prefix| model_name.starts_with(prefix));
        if is_o200k {
            O200K_TOKENIZER_KEY
        } else {
            CL100K_TOKENIZER_KEY
        }
    }

    pub fn count_tokens(&self, text: &str, model_name: Option<&str>) -> usize {
        let tokenizer_key = Self::model_to_tokenizer_key(model_name);
        match self.tokenizers.get(tokenizer_key) {
            Some(tokenizer) => tokenizer.encode_with_special_tokens(text).len(),
            // Rough average for English text
            None => text.chars().count().div_ceil(4),
        }
    }

    fn count_content_tokens(&self, content: &Content, model_name: Option<&str>) -> usize {
        match content {
            Content::Text(text) => self.count_tokens(&text.text, model_name),
            Content::Document(document) => match document.kind() {
                DocumentKind::Image => IMAGE_TOKENS,
                DocumentKind::Pdf => {
                    let pages = document.decoded().map_or(1, |bytes| pdf_page_count(&bytes));
                    pages * PDF_PAGE_TOKENS
                }
            },
        }
    }

    /// Estimate for a whole conversation plus an optional system prompt
    pub fn count_chat_tokens(
        &self,
        model_name: &str,
        prompt: Option<&str>,
        messages: &[Message],
    ) -> usize {
        let model_name = Some(model_name);
        let prompt_tokens = prompt
            .map(|prompt| TOKENS_PER_MESSAGE + self.count_tokens(prompt, model_name))
            .unwrap_or(0);

        let message_tokens: usize = messages
            .iter()
            .map(|message| {
                TOKENS_PER_MESSAGE
                    + message
                        .content
                        .iter()
                        .map(|content| self.count_content_tokens(content, model_name))
                        .sum::<usize>()
            })
            .sum();

        prompt_tokens + message_tokens + REPLY_TOKENS
    }
}

fn pdf_page_count(bytes: &[u8]) -> usize {
    PDF_PAGE.find_iter(bytes).count().max(1)
}

/// Estimate the input tokens of a request without contacting the provider
pub fn count_tokens(request: &Request) -> usize {
    let prompt = request.options().prompt();
    let tokens = COUNTER.count_chat_tokens(request.model(), prompt, request.messages());
    match request {
        Request::Ollama(ollama) if ollama.image().is_some() => tokens + IMAGE_TOKENS,
        _ => tokens,
    }
}
