//! Gemini client for the tool-calling chat assistant

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::{DompetError, DompetResult};

use super::types::{ChatMessage, ChatRequest, FunctionCall, ModelReply};
use super::{http_client, read_response, ChatModel};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const DEFAULT_TEMPERATURE: f32 = 0.4;

pub struct GeminiClient {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> DompetResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(DompetError::Config(
                "GEMINI_API_KEY is not set".to_string(),
            ));
        }

        Ok(Self {
            http: http_client(timeout_secs)?,
            base_url: GEMINI_BASE_URL.to_string(),
            api_key,
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
        })
    }

    /// Point the client at another host, e.g. a proxy
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

impl ChatModel for GeminiClient {
    fn generate(&self, request: &ChatRequest) -> DompetResult<ModelReply> {
        let body = build_request_body(request, self.temperature);
        debug!(
            model = %self.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "gemini generateContent"
        );

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()?;

        parse_response(&read_response(response)?)
    }
}

/// Build a `generateContent` request body
pub fn build_request_body(request: &ChatRequest, temperature: f32) -> Value {
    let contents: Vec<Value> = request.messages.iter().map(message_content).collect();

    let mut body = Map::new();
    if !request.system.trim().is_empty() {
        body.insert(
            "systemInstruction".to_string(),
            json!({ "parts": [{ "text": request.system }] }),
        );
    }
    body.insert("contents".to_string(), Value::Array(contents));
    if !request.tools.is_empty() {
        body.insert(
            "tools".to_string(),
            json!([{ "functionDeclarations": request.tools }]),
        );
    }
    body.insert(
        "generationConfig".to_string(),
        json!({ "temperature": temperature }),
    );

    Value::Object(body)
}

fn message_content(message: &ChatMessage) -> Value {
    match message {
        ChatMessage::User { text } => json!({
            "role": "user",
            "parts": [{ "text": text }],
        }),
        ChatMessage::Model { text, calls } => {
            let mut parts = Vec::new();
            if let Some(text) = text.as_deref().filter(|t| !t.is_empty()) {
                parts.push(json!({ "text": text }));
            }
            for call in calls {
                parts.push(json!({
                    "functionCall": { "name": call.name, "args": object_or_empty(&call.args) }
                }));
            }
            json!({ "role": "model", "parts": parts })
        }
        ChatMessage::ToolResults { results } => {
            let parts: Vec<Value> = results
                .iter()
                .map(|r| {
                    // functionResponse.response must be a JSON object
                    let response = if r.response.is_object() {
                        r.response.clone()
                    } else {
                        json!({ "result": r.response })
                    };
                    json!({ "functionResponse": { "name": r.name, "response": response } })
                })
                .collect();
            json!({ "role": "user", "parts": parts })
        }
    }
}

fn object_or_empty(value: &Value) -> Value {
    if value.is_object() {
        value.clone()
    } else {
        json!({})
    }
}

/// Interpret a `generateContent` response
pub fn parse_response(body: &Value) -> DompetResult<ModelReply> {
    if let Some(reason) = body
        .pointer("/promptFeedback/blockReason")
        .and_then(Value::as_str)
    {
        return Err(DompetError::Ai(format!("Prompt was blocked: {}", reason)));
    }

    let candidate = body
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|c| c.first())
        .ok_or_else(|| DompetError::Ai("Gemini returned no candidates".to_string()))?;

    let parts = candidate
        .pointer("/content/parts")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut texts = Vec::new();
    let mut calls = Vec::new();
    for part in &parts {
        if let Some(text) = part.get("text").and_then(Value::as_str) {
            if part.get("thought").and_then(Value::as_bool) != Some(true) {
                texts.push(text.to_string());
            }
        }
        if let Some(call) = part.get("functionCall") {
            let name = call
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| DompetError::Ai("functionCall without a name".to_string()))?;
            calls.push(FunctionCall {
                name: name.to_string(),
                args: call.get("args").cloned().unwrap_or_else(|| json!({})),
            });
        }
    }

    let text = texts.concat();
    let text = if text.trim().is_empty() { None } else { Some(text) };

    if text.is_none() && calls.is_empty() {
        let finish = candidate
            .get("finishReason")
            .and_then(Value::as_str)
            .unwrap_or("UNKNOWN");
        return Err(DompetError::Ai(format!(
            "Gemini returned an empty answer (finish reason {})",
            finish
        )));
    }

    Ok(ModelReply { text, calls })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::types::{ToolDeclaration, ToolResult};

    #[test]
    fn test_request_body_shape() {
        let request = ChatRequest {
            system: "Kamu asisten keuangan".to_string(),
            messages: vec![
                ChatMessage::user("catat makan 25rb"),
                ChatMessage::Model {
                    text: None,
                    calls: vec![FunctionCall {
                        name: "add_transaction".to_string(),
                        args: json!({"amount": 25000}),
                    }],
                },
                ChatMessage::ToolResults {
                    results: vec![ToolResult {
                        name: "add_transaction".to_string(),
                        response: json!(["not", "an", "object"]),
                    }],
                },
            ],
            tools: vec![ToolDeclaration {
                name: "add_transaction".to_string(),
                description: "Catat transaksi".to_string(),
                parameters: json!({"type": "object"}),
            }],
        };

        let body = build_request_body(&request, 0.2);

        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "Kamu asisten keuangan"
        );
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(
            body["contents"][1]["parts"][0]["functionCall"]["args"]["amount"],
            25000
        );
        assert_eq!(body["contents"][2]["role"], "user");
        assert_eq!(
            body["contents"][2]["parts"][0]["functionResponse"]["response"]["result"][0],
            "not"
        );
        assert_eq!(
            body["tools"][0]["functionDeclarations"][0]["name"],
            "add_transaction"
        );
        assert!((body["generationConfig"]["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_request_without_tools_or_system() {
        let request = ChatRequest {
            messages: vec![ChatMessage::user("halo")],
            ..Default::default()
        };
        let body = build_request_body(&request, 0.4);
        assert!(body.get("tools").is_none());
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_parse_text_and_calls() {
        let body = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "Baik, "},
                        {"text": "saya catat."},
                        {"functionCall": {"name": "get_budget_status", "args": {"month": "2025-01"}}},
                        {"functionCall": {"name": "get_goals"}}
                    ]
                },
                "finishReason": "STOP"
            }]
        });

        let reply = parse_response(&body).unwrap();
        assert_eq!(reply.text.as_deref(), Some("Baik, saya catat."));
        assert_eq!(reply.calls.len(), 2);
        assert_eq!(reply.calls[0].args["month"], "2025-01");
        assert_eq!(reply.calls[1].args, json!({}));
    }

    #[test]
    fn test_parse_errors() {
        let blocked = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        assert!(matches!(parse_response(&blocked), Err(DompetError::Ai(m)) if m.contains("SAFETY")));

        let empty = json!({"candidates": []});
        assert!(matches!(parse_response(&empty), Err(DompetError::Ai(_))));

        let no_parts = json!({"candidates": [{"finishReason": "MAX_TOKENS"}]});
        assert!(matches!(parse_response(&no_parts), Err(DompetError::Ai(m)) if m.contains("MAX_TOKENS")));
    }

    #[test]
    fn test_new_requires_key() {
        assert!(matches!(
            GeminiClient::new("  ", "gemini-2.0-flash", 30),
            Err(DompetError::Config(_))
        ));
    }

    #[test]
    fn test_transport_error_hides_api_key() {
        let client = GeminiClient::new("SECRETKEY123", "m", 5)
            .unwrap()
            .with_base_url("http://127.0.0.1:9/");
        let request = ChatRequest {
            system: String::new(),
            messages: vec![ChatMessage::user("halo")],
            tools: Vec::new(),
        };

        let err = client.generate(&request).unwrap_err();
        assert!(matches!(err, DompetError::Http(_)));
        assert!(!err.to_string().contains("SECRETKEY123"), "{}", err);
        assert!(!err.to_string().contains("127.0.0.1"), "{}", err);
    }
}
