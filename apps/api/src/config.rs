use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::llm_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    /// Error bodies carry `details`/`stack` everywhere except production.
    pub fn exposes_error_details(self) -> bool {
        self != Environment::Production
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "production" | "prod" => Ok(Environment::Production),
            other => bail!("Unknown environment '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables once at startup.
/// Fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub google_ai_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };
        let or_default =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let environment = lookup("APP_ENV")
            .or_else(|| lookup("NODE_ENV"))
            .unwrap_or_else(|| "development".to_string())
            .parse::<Environment>()
            .context("APP_ENV must be development, test or production")?;

        Ok(Config {
            database_url: require("DATABASE_URL")?,
            database_max_connections: or_default("DATABASE_MAX_CONNECTIONS", "10")
                .parse::<u32>()
                .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
            google_ai_api_key: require("GOOGLE_AI_API_KEY")?,
            gemini_model: or_default("GEMINI_MODEL", DEFAULT_MODEL),
            gemini_base_url: or_default("GEMINI_BASE_URL", DEFAULT_BASE_URL),
            host: or_default("HOST", "localhost"),
            port: or_default("PORT", "3000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            environment,
            rust_log: or_default("RUST_LOG", "info"),
        })
    }
}
