use anyhow::{Context, Result};

pub const DEFAULT_OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Application configuration loaded from environment variables.
/// Read once at startup; invalid values fail the boot.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer credential for OpenRouter. Analysis falls back to the canned
    /// response when this is unset.
    pub openrouter_api_key: Option<String>,
    pub openrouter_url: String,
    pub port: u16,
    pub rust_log: String,
    pub seed_demo_jobs: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openrouter_api_key: optional_env("OPENROUTER_API_KEY"),
            openrouter_url: optional_env("OPENROUTER_URL")
                .unwrap_or_else(|| DEFAULT_OPENROUTER_URL.to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            seed_demo_jobs: parse_flag(
                "SEED_DEMO_JOBS",
                std::env::var("SEED_DEMO_JOBS").ok().as_deref(),
                true,
            )?,
        })
    }
}

/// Reads an env var, treating an empty value the same as an unset one.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(key: &str, raw: Option<&str>, default: bool) -> Result<bool> {
    match raw.map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "" => Ok(default),
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => anyhow::bail!("{key} must be a boolean, got '{other}'"),
        },
    }
}
