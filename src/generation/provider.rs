use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::GenerationConfig;

/// A failed call to the text-generation provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderError {
    /// HTTP status, when the provider answered at all.
    pub status: Option<u16>,
    pub message: String,
}

impl ProviderError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Rate limits, unavailability and overload move on to the next model.
    /// Everything else is fatal.
    pub fn is_retryable(&self) -> bool {
        matches!(self.status, Some(429) | Some(503))
            || self.message.to_lowercase().contains("overloaded")
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "provider returned {status}: {}", self.message),
            None => write!(f, "provider request failed: {}", self.message),
        }
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, model: &str, system: &str, prompt: &str)
    -> Result<String, ProviderError>;
}

/// OpenAI-compatible chat completions client.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(config.provider_timeout)
            .build()
            .map_err(|e| format!("Failed to build provider client: {e}"))?;

        Ok(Self {
            client,
            base_url: config.provider_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::new(e.status().map(|s| s.as_u16()), e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::new(
                Some(status.as_u16()),
                error_message(&body),
            ));
        }

        let completion: ChatResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::new(None, format!("Invalid provider response: {e}")))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::new(None, "Provider returned no choices"))
    }
}

/// Prefer the provider's `{"error": {"message": ...}}` text over the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(512).collect())
}
