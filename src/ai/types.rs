//! Provider-neutral conversation types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A function the model asked us to run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

/// The answer to one function call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub name: String,
    pub response: Value,
}

/// One turn of the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ChatMessage {
    User {
        text: String,
    },
    Model {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        calls: Vec<FunctionCall>,
    },
    ToolResults {
        results: Vec<ToolResult>,
    },
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::User { text: text.into() }
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self::Model {
            text: Some(text.into()),
            calls: Vec::new(),
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Self::User { .. })
    }
}

/// A tool offered to the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object
    pub parameters: Value,
}

/// Everything the model needs for one generation
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub system: String,
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDeclaration>,
}

/// What the model produced: text, function calls, or both
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub text: Option<String>,
    pub calls: Vec<FunctionCall>,
}

impl ModelReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            calls: Vec::new(),
        }
    }

    pub fn calls(calls: Vec<FunctionCall>) -> Self {
        Self { text: None, calls }
    }
}

/// Keep at most `limit` of the most recent messages
///
/// The kept history always starts at a user turn, so a tool result is never
/// separated from the call that produced it. When the latest exchange alone
/// is longer than `limit`, that exchange is kept whole.
pub fn trim_history(messages: &mut Vec<ChatMessage>, limit: usize) {
    let window = messages.len().saturating_sub(limit);
    let start = match messages[window..].iter().position(ChatMessage::is_user) {
        Some(offset) => window + offset,
        None => messages
            .iter()
            .rposition(ChatMessage::is_user)
            .unwrap_or(messages.len()),
    };
    messages.drain(..start);
}
