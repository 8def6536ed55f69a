use anyhow::{Context, Result};

/// Model used when `GEMINI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_PORT: u16 = 8000;

/// Application configuration loaded from environment variables.
/// Startup fails if the model API key is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: String,
    pub gemini_model: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            None => DEFAULT_PORT,
        };

        Ok(Config {
            google_api_key: require(&lookup, "GOOGLE_API_KEY")?,
            gemini_model: lookup("GEMINI_MODEL")
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            port,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn require<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}
