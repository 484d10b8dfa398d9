use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Panics at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Comma-separated pool of API keys, rotated per request.
    pub gemini_api_keys: Vec<String>,
    pub gemini_base_url: String,
    pub port: u16,
    pub rust_log: String,
}

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let keys_raw = require_env("GEMINI_API_KEY")?;
        let gemini_api_keys: Vec<String> = keys_raw
            .split(',')
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if gemini_api_keys.is_empty() {
            anyhow::bail!("GEMINI_API_KEY contains no usable keys");
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            gemini_api_keys,
            gemini_base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
