use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tool the model may ask to call, described by a JSON schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub input: serde_json::Value,
}

/// One single-turn model request.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub prompt: String,
    pub system: Option<String>,
    pub tools: Vec<ToolSpec>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Invocation {
    pub const DEFAULT_MAX_TOKENS: u32 = 4096;
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;

    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            tools: Vec::new(),
            max_tokens: Self::DEFAULT_MAX_TOKENS,
            temperature: Self::DEFAULT_TEMPERATURE,
        }
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Transport(String),

    #[error("model returned HTTP {status}")]
    Status { status: u16, body: String },

    #[error("invalid model response: {0}")]
    InvalidResponse(String),
}

/// Language-model invocation client.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn invoke(&self, req: Invocation) -> Result<Completion, ModelError>;

    /// Fixed-length embedding of `text`.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ModelError>;
}
