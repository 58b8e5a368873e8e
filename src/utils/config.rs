use serde::Deserialize;
use std::env;

/// Server configuration, loaded from the environment.
///
/// Everything has a sensible default; API keys never live here (they arrive
/// per-session with the start request).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub providers: ProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible API base; point at a proxy or compatible endpoint
    /// to change providers without code changes.
    pub api_base: String,
    pub model: String,
}

/// Base URLs for the outbound search providers. Tests point these at local
/// mock servers.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub arxiv_base_url: String,
    pub serpapi_base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            arxiv_base_url: "http://export.arxiv.org".to_string(),
            serpapi_base_url: "https://serpapi.com".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()?,
            },
            llm: LlmConfig {
                api_base: env::var("OPENAI_API_BASE")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
                model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            },
            providers: ProviderConfig {
                arxiv_base_url: env::var("ARXIV_API_URL")
                    .unwrap_or_else(|_| "http://export.arxiv.org".to_string()),
                serpapi_base_url: env::var("SERPAPI_API_URL")
                    .unwrap_or_else(|_| "https://serpapi.com".to_string()),
            },
        })
    }
}
