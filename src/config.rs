use std::net::IpAddr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub max_body_size: usize,
    pub log_level: String,
    pub generation: GenerationConfig,
}

/// Everything the generation pipeline needs, resolved once at startup and
/// handed to the invoker explicitly.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_key: String,
    pub provider_url: String,
    /// Candidate models, tried in order.
    pub models: Vec<String>,
    pub system_prompt: String,
    pub provider_timeout: Duration,
    pub run_timeout: Duration,
    pub max_chunk_tokens: usize,
    pub rate_limit: u32,
    pub rate_limit_window_secs: u64,
}

pub const DEFAULT_MODELS: &str = "gpt-4o,gpt-4o-mini,gpt-4o-turbo";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a content generation assistant.";

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let api_key = env_required("OPENAI_API_KEY")?;

        let host: IpAddr = env_or("CONTENTFORGE_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid CONTENTFORGE_HOST: {e}"))?;

        let port: u16 = env_or("CONTENTFORGE_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid CONTENTFORGE_PORT: {e}"))?;

        let max_body_size: usize = env_or("CONTENTFORGE_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid CONTENTFORGE_MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("CONTENTFORGE_LOG_LEVEL", "info");

        let provider_url = env_or("CONTENTFORGE_PROVIDER_URL", "https://api.openai.com/v1")
            .trim_end_matches('/')
            .to_string();

        let models = parse_models(&env_or("CONTENTFORGE_MODELS", DEFAULT_MODELS))?;

        let system_prompt = env_or("CONTENTFORGE_SYSTEM_PROMPT", DEFAULT_SYSTEM_PROMPT);

        let provider_timeout_secs: u64 = env_or("CONTENTFORGE_PROVIDER_TIMEOUT_SECS", "30")
            .parse()
            .map_err(|e| format!("Invalid CONTENTFORGE_PROVIDER_TIMEOUT_SECS: {e}"))?;

        let run_timeout_secs: u64 = env_or("CONTENTFORGE_RUN_TIMEOUT_SECS", "60")
            .parse()
            .map_err(|e| format!("Invalid CONTENTFORGE_RUN_TIMEOUT_SECS: {e}"))?;

        let max_chunk_tokens: usize = env_or("CONTENTFORGE_MAX_CHUNK_TOKENS", "8000")
            .parse()
            .map_err(|e| format!("Invalid CONTENTFORGE_MAX_CHUNK_TOKENS: {e}"))?;
        if max_chunk_tokens == 0 {
            return Err("CONTENTFORGE_MAX_CHUNK_TOKENS must be greater than zero".to_string());
        }

        let rate_limit: u32 = env_or("CONTENTFORGE_RATE_LIMIT", "5")
            .parse()
            .map_err(|e| format!("Invalid CONTENTFORGE_RATE_LIMIT: {e}"))?;

        let rate_limit_window_secs: u64 = env_or("CONTENTFORGE_RATE_LIMIT_WINDOW_SECS", "60")
            .parse()
            .map_err(|e| format!("Invalid CONTENTFORGE_RATE_LIMIT_WINDOW_SECS: {e}"))?;

        Ok(Config {
            database_url,
            host,
            port,
            max_body_size,
            log_level,
            generation: GenerationConfig {
                api_key,
                provider_url,
                models,
                system_prompt,
                provider_timeout: Duration::from_secs(provider_timeout_secs),
                run_timeout: Duration::from_secs(run_timeout_secs),
                max_chunk_tokens,
                rate_limit,
                rate_limit_window_secs,
            },
        })
    }
}

/// Parse a comma separated candidate list. At least one model is required.
pub fn parse_models(raw: &str) -> Result<Vec<String>, String> {
    let models: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if models.is_empty() {
        return Err("CONTENTFORGE_MODELS must name at least one model".to_string());
    }
    Ok(models)
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_models_keeps_order_and_skips_blanks() {
        let models = parse_models(" gpt-4o , ,gpt-4o-mini,").unwrap();
        assert_eq!(models, vec!["gpt-4o", "gpt-4o-mini"]);
    }

    #[test]
    fn parse_models_rejects_empty_list() {
        assert!(parse_models(" , ").is_err());
        assert!(parse_models("").is_err());
    }
}
