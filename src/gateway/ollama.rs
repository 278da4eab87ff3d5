use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::types::{ChatTurn, LlmClient};
use super::LlmError;

/// Temperature for schema-bound answers (triage, medicine lookup).
const STRUCTURED_TEMPERATURE: f32 = 0.2;

/// Ollama-compatible HTTP client for text generation.
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    /// Create a client for `model` at `base_url`.
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LlmError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn post<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, LlmError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.client.post(&url).json(body).send().map_err(|e| {
            if e.is_connect() {
                LlmError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                LlmError::HttpClient(format!("Request timed out after {}s", self.timeout_secs))
            } else {
                LlmError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))
    }
}

#[derive(Serialize)]
struct GenerationOptions {
    temperature: f32,
}

/// Request body for `/api/generate`
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a serde_json::Value>,
    options: GenerationOptions,
}

/// Response body from `/api/generate`
#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Serialize)]
struct ChatMessageBody<'a> {
    role: &'a str,
    content: &'a str,
}

/// Request body for `/api/chat`
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessageBody<'a>>,
    stream: bool,
    options: GenerationOptions,
}

/// Response body from `/api/chat`
#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ChatResponseMessage>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

impl LlmClient for OllamaClient {
    fn generate(
        &self,
        system: &str,
        prompt: &str,
        schema: Option<&serde_json::Value>,
    ) -> Result<String, LlmError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            system,
            stream: false,
            format: schema,
            options: GenerationOptions {
                temperature: STRUCTURED_TEMPERATURE,
            },
        };
        let parsed: GenerateResponse = self.post("/api/generate", &body)?;
        Ok(parsed.response)
    }

    fn chat(
        &self,
        system: &str,
        turns: &[ChatTurn],
        temperature: f32,
    ) -> Result<String, LlmError> {
        let mut messages = Vec::with_capacity(turns.len() + 1);
        messages.push(ChatMessageBody {
            role: "system",
            content: system,
        });
        messages.extend(turns.iter().map(|t| ChatMessageBody {
            role: t.role.as_str(),
            content: &t.text,
        }));

        let body = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: GenerationOptions { temperature },
        };
        let parsed: ChatResponse = self.post("/api/chat", &body)?;
        Ok(parsed.message.map(|m| m.content).unwrap_or_default())
    }
}

/// A call seen by `MockLlmClient`.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: String,
    pub prompt: String,
    pub has_schema: bool,
    pub turns: Vec<ChatTurn>,
}

/// Mock LLM client for testing: returns a configurable response.
pub struct MockLlmClient {
    response: Result<String, String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails as if the service were unreachable.
    pub fn unreachable() -> Self {
        Self {
            response: Err("http://localhost:11434".to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn respond(&self, call: RecordedCall) -> Result<String, LlmError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        self.response.clone().map_err(LlmError::Connection)
    }
}

impl LlmClient for MockLlmClient {
    fn generate(
        &self,
        system: &str,
        prompt: &str,
        schema: Option<&serde_json::Value>,
    ) -> Result<String, LlmError> {
        self.respond(RecordedCall {
            system: system.to_string(),
            prompt: prompt.to_string(),
            has_schema: schema.is_some(),
            turns: Vec::new(),
        })
    }

    fn chat(
        &self,
        system: &str,
        turns: &[ChatTurn],
        _temperature: f32,
    ) -> Result<String, LlmError> {
        self.respond(RecordedCall {
            system: system.to_string(),
            prompt: String::new(),
            has_schema: false,
            turns: turns.to_vec(),
        })
    }
}
