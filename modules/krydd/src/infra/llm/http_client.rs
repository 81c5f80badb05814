use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{instrument, Instrument, Level};
use url::Url;

use crate::domain::ports::{Completion, Invocation, LanguageModel, ModelError, ToolCall};

/// Version tag sent with every messages request.
pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

#[derive(Debug, Clone)]
pub struct HttpModelConfig {
    pub base_url: Url,
    pub api_key: Option<String>,
    pub chat_model_id: String,
    pub embedding_model_id: String,
    pub embedding_dimensions: usize,
    pub timeout: Duration,
}

/// Model-runtime client: `POST {base}/model/{model_id}/invoke` with a JSON body.
pub struct HttpModelClient {
    client: reqwest::Client,
    config: HttpModelConfig,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Option<Vec<ContentBlock>>,
    #[serde(default)]
    completion: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

impl HttpModelClient {
    pub fn new(config: HttpModelConfig) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ModelError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn invoke_url(&self, model_id: &str) -> Result<Url, ModelError> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ModelError::Transport("invalid model base URL".into()))?
            .pop_if_empty()
            .extend(["model", model_id, "invoke"]);
        Ok(url)
    }

    /// Send one request inside an `outgoing_http` span and decode the JSON reply.
    async fn post<T: DeserializeOwned>(&self, url: Url, body: Value) -> Result<T, ModelError> {
        let span = tracing::span!(
            Level::INFO, "outgoing_http",
            http.method = "POST",
            http.url = %url,
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
        );

        let mut req = self
            .client
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body);
        if let Some(key) = &self.config.api_key {
            req = req.bearer_auth(key);
        }

        async {
            let response = req
                .send()
                .await
                .map_err(|e| ModelError::Transport(e.to_string()))?;

            let status = response.status();
            tracing::Span::current().record("http.status_code", status.as_u16());
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ModelError::Status {
                    status: status.as_u16(),
                    body,
                });
            }
            response
                .json::<T>()
                .await
                .map_err(|e| ModelError::InvalidResponse(e.to_string()))
        }
        .instrument(span)
        .await
    }
}

/// Messages request body for `req`.
pub fn messages_body(req: &Invocation) -> Value {
    let mut body = json!({
        "anthropic_version": ANTHROPIC_VERSION,
        "max_tokens": req.max_tokens,
        "temperature": req.temperature,
        "messages": [{ "role": "user", "content": req.prompt }],
    });
    if let Some(system) = &req.system {
        body["system"] = json!(system);
    }
    if !req.tools.is_empty() {
        body["tools"] = json!(req.tools);
    }
    body
}

#[async_trait]
impl LanguageModel for HttpModelClient {
    #[instrument(
        name = "krydd.http.model.invoke",
        skip_all,
        fields(model_id = %self.config.chat_model_id, max_tokens = req.max_tokens)
    )]
    async fn invoke(&self, req: Invocation) -> Result<Completion, ModelError> {
        let url = self.invoke_url(&self.config.chat_model_id)?;
        let reply: MessagesResponse = self.post(url, messages_body(&req)).await?;

        let Some(blocks) = reply.content else {
            return Ok(Completion {
                text: reply.completion.or(reply.text).unwrap_or_default(),
                tool_calls: Vec::new(),
            });
        };
        let mut completion = Completion::default();
        for block in blocks {
            match block {
                ContentBlock::Text { text } => completion.text.push_str(&text),
                ContentBlock::ToolUse { name, input } => {
                    completion.tool_calls.push(ToolCall { name, input })
                }
                ContentBlock::Other => {}
            }
        }
        Ok(completion)
    }

    #[instrument(
        name = "krydd.http.model.embed",
        skip_all,
        fields(model_id = %self.config.embedding_model_id)
    )]
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ModelError> {
        let url = self.invoke_url(&self.config.embedding_model_id)?;
        let body = json!({
            "inputText": text,
            "dimensions": self.config.embedding_dimensions,
        });
        let reply: EmbeddingResponse = self.post(url, body).await?;
        if reply.embedding.len() != self.config.embedding_dimensions {
            return Err(ModelError::InvalidResponse(format!(
                "expected {} dimensions, got {}",
                self.config.embedding_dimensions,
                reply.embedding.len()
            )));
        }
        Ok(reply.embedding)
    }
}
