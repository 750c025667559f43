mod chat_completions;
mod error;

pub use chat_completions::ChatCompletionsClient;
pub use error::{format_api_error, ProviderError};

use std::future::Future;
use std::pin::Pin;

pub type GenerateFuture = Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send>>;

/// Object-safe code generation backend.
///
/// One call per generate action: no retry, no streaming. A failed call
/// must not leave anything behind for the caller to commit.
pub trait InferenceClient: Send + Sync + 'static {
    fn generate(&self, language: &str, task: &str) -> GenerateFuture;

    /// Model identifier shown on the docs page.
    fn model(&self) -> &str;
}

/// Stand-in used when no provider credential is configured.
///
/// The service still starts; every generate action reports the missing key.
pub struct UnconfiguredInference {
    env_var: String,
    model: String,
}

impl UnconfiguredInference {
    pub fn new(env_var: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            env_var: env_var.into(),
            model: model.into(),
        }
    }
}

impl InferenceClient for UnconfiguredInference {
    fn generate(&self, _language: &str, _task: &str) -> GenerateFuture {
        let env_var = self.env_var.clone();
        Box::pin(async move { Err(ProviderError::MissingApiKey { env_var }) })
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_reports_missing_key() {
        let client = UnconfiguredInference::new("GROQ_API_KEY", "llama-3.3-70b-versatile");
        let err = client.generate("Python", "x").await.unwrap_err();
        assert_eq!(err.to_string(), "missing API key: set GROQ_API_KEY");
        assert_eq!(client.model(), "llama-3.3-70b-versatile");
    }
}
