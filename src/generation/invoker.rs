use std::sync::Arc;

use crate::config::GenerationConfig;

use super::chunk;
use super::provider::{ProviderError, TextGenerator};

/// Text produced for one prompt and the candidate model that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InvokeError {
    /// A non-retryable provider failure; later candidates were not tried.
    Fatal { model: String, error: ProviderError },
    /// Every candidate failed with a retryable error.
    Exhausted { attempts: Vec<(String, ProviderError)> },
}

impl std::fmt::Display for InvokeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvokeError::Fatal { model, error } => write!(f, "{model}: {error}"),
            InvokeError::Exhausted { attempts } => {
                let models: Vec<&str> = attempts.iter().map(|(m, _)| m.as_str()).collect();
                write!(f, "generation failed, tried {}", models.join(", "))
            }
        }
    }
}

pub fn build_input(prompt: &str, context: &str) -> String {
    format!(
        "Please use the following prompt and summary to generate new content:\n\
         ** PROMPT:\n\
         {prompt}\n\
         ----------------\n\
         ** SUMMARY:\n\
         {context}\n"
    )
}

/// Generates text for a single prompt, walking the candidate models in order.
pub struct FallbackInvoker {
    generator: Arc<dyn TextGenerator>,
    models: Vec<String>,
    system_prompt: String,
    max_chunk_tokens: usize,
}

impl FallbackInvoker {
    pub fn new(generator: Arc<dyn TextGenerator>, config: &GenerationConfig) -> Self {
        Self {
            generator,
            models: config.models.clone(),
            system_prompt: config.system_prompt.clone(),
            max_chunk_tokens: config.max_chunk_tokens,
        }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub async fn invoke(&self, prompt: &str, context: &str) -> Result<Generation, InvokeError> {
        let chunks = chunk::split_into_chunks(&build_input(prompt, context), self.max_chunk_tokens);
        let mut attempts = Vec::new();

        for model in &self.models {
            match self.generate_all(model, &chunks).await {
                Ok(text) => {
                    tracing::debug!("Generated content using model {model}");
                    return Ok(Generation {
                        text,
                        model: model.clone(),
                    });
                }
                Err(error) if error.is_retryable() => {
                    tracing::warn!("Model {model} unavailable, trying next candidate: {error}");
                    attempts.push((model.clone(), error));
                }
                Err(error) => {
                    tracing::error!("Model {model} failed: {error}");
                    return Err(InvokeError::Fatal {
                        model: model.clone(),
                        error,
                    });
                }
            }
        }

        Err(InvokeError::Exhausted { attempts })
    }

    /// Every chunk against one model; the first failure abandons the model.
    async fn generate_all(&self, model: &str, chunks: &[String]) -> Result<String, ProviderError> {
        let mut text = String::new();
        for chunk in chunks {
            let part = self
                .generator
                .generate(model, &self.system_prompt, chunk)
                .await?;
            text.push_str(&part);
            text.push('\n');
        }
        Ok(text)
    }
}
