//! AI assistant
//!
//! Two hosted models are used:
//! - Gemini, through function calling, drives the chat assistant
//! - OpenRouter (OpenAI-compatible) turns free text and receipt photos
//!   into transactions
//!
//! The chat loop only depends on the [`ChatModel`] trait, so it runs
//! against a scripted model in tests.

pub mod chat;
pub mod gemini;
pub mod openrouter;
pub mod prompt;
pub mod tools;
pub mod types;

pub use chat::{ChatReply, ChatSession};
pub use gemini::GeminiClient;
pub use openrouter::{OpenRouterClient, ParsedTransaction, ReceiptData, ReceiptItem};
pub use tools::{ToolExecutor, ToolOutcome};
pub use types::{
    trim_history, ChatMessage, ChatRequest, FunctionCall, ModelReply, ToolDeclaration, ToolResult,
};

use crate::error::{DompetError, DompetResult};

/// A model that can answer a conversation, optionally by calling tools
pub trait ChatModel {
    fn generate(&self, request: &ChatRequest) -> DompetResult<ModelReply>;
}

impl<M: ChatModel + ?Sized> ChatModel for &M {
    fn generate(&self, request: &ChatRequest) -> DompetResult<ModelReply> {
        (**self).generate(request)
    }
}

impl<M: ChatModel + ?Sized> ChatModel for Box<M> {
    fn generate(&self, request: &ChatRequest) -> DompetResult<ModelReply> {
        (**self).generate(request)
    }
}

/// Build the blocking HTTP client shared by both providers
pub(crate) fn http_client(timeout_secs: u64) -> DompetResult<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs.max(1)))
        .user_agent(concat!("dompet/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| DompetError::Http(format!("Failed to build HTTP client: {}", e)))
}

/// Read a response body, mapping non-2xx statuses to `Http` errors
pub(crate) fn read_response(response: reqwest::blocking::Response) -> DompetResult<serde_json::Value> {
    let status = response.status();
    let body = response.text()?;

    if !status.is_success() {
        return Err(DompetError::Http(format!(
            "{}: {}",
            status,
            provider_error_message(&body)
        )));
    }

    serde_json::from_str(&body)
        .map_err(|e| DompetError::Ai(format!("Provider returned invalid JSON: {}", e)))
}

/// Pull `error.message` out of a provider error body, else the raw body
pub(crate) fn provider_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
