use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::EstimateError;
use crate::config::EstimatorConfig;

/// One chat round-trip: system instruction + user text in, reply text out.
#[async_trait]
pub trait EstimatorClient: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, EstimateError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    content: Option<String>,
}

/// OpenAI-compatible `chat/completions` client.
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(cfg: &EstimatorConfig, api_key: String) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: cfg.model.clone(),
        })
    }
}

#[async_trait]
impl EstimatorClient for OpenAiClient {
    #[instrument(skip(self, system), fields(model = %self.model))]
    async fn complete(&self, system: &str, user: &str) -> Result<String, EstimateError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            temperature: 0.25,
        };

        let res = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "estimator request failed");
                EstimateError::Transport(e.to_string())
            })?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            error!(%status, body = %text, "estimator returned an error status");
            return Err(EstimateError::Transport(format!("status {status}")));
        }

        let reply: ChatResponse = res
            .json()
            .await
            .map_err(|e| EstimateError::MalformedReply(e.to_string()))?;

        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| EstimateError::MalformedReply("reply has no message content".into()))?;
        debug!(len = content.len(), "estimator replied");
        Ok(content)
    }
}
