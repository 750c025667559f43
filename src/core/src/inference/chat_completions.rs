use serde::{Deserialize, Serialize};

use crate::codify_config::ProviderConfig;

use super::{GenerateFuture, InferenceClient, ProviderError};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible `/chat/completions` client (Groq by default).
#[derive(Clone)]
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    provider: ProviderConfig,
}

impl ChatCompletionsClient {
    /// Build from provider config, resolving the API key from the
    /// configured environment variable (or the inline fallback).
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .resolve_api_key()
            .ok_or_else(|| ProviderError::MissingApiKey {
                env_var: config.api_key_env.clone(),
            })?;
        Self::new(config, api_key)
    }

    pub fn new(config: &ProviderConfig, api_key: impl Into<String>) -> Result<Self, ProviderError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ProviderError::Build(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: format!(
                "{}/chat/completions",
                config.base_url.trim().trim_end_matches('/')
            ),
            api_key: api_key.into(),
            provider: config.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn complete(&self, language: String, task: String) -> Result<String, ProviderError> {
        let system = self.provider.render_system_prompt(&language);
        let body = ChatRequest {
            model: &self.provider.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: &task,
                },
            ],
        };

        tracing::debug!(
            endpoint = %self.endpoint,
            model = %self.provider.model,
            %language,
            task_len = task.len(),
            "chat completion request"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), &text));
        }

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(format!("decode response: {e}")))?;
        let content = payload
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Malformed("response has no choices".to_string()))?
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ProviderError::Malformed("response has no content".to_string()))?;
        Ok(content)
    }
}

impl InferenceClient for ChatCompletionsClient {
    fn generate(&self, language: &str, task: &str) -> GenerateFuture {
        let client = self.clone();
        let language = language.to_string();
        let task = task.to_string();
        Box::pin(async move { client.complete(language, task).await })
    }

    fn model(&self) -> &str {
        &self.provider.model
    }
}
