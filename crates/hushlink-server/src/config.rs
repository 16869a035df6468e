use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use hushlink_ai::ModelConfig;
use hushlink_ai::client::{DEFAULT_API_BASE, DEFAULT_MODEL};

/// `HUSHLINK_DB_PATH` value that selects the in-memory store.
pub const MEMORY_DB: &str = ":memory:";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub public_url: String,
    pub model: ModelConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let port: u16 = var("HUSHLINK_PORT", "3000")
            .parse()
            .context("HUSHLINK_PORT must be a port number")?;

        let api_key = get("GEMINI_API_KEY").unwrap_or_default();
        if api_key.trim().is_empty() {
            bail!("GEMINI_API_KEY is unset; moderation cannot run without it");
        }

        let timeout_secs: u64 = var("HUSHLINK_MODEL_TIMEOUT_SECS", "30")
            .parse()
            .context("HUSHLINK_MODEL_TIMEOUT_SECS must be a whole number of seconds")?;

        let mut model = ModelConfig::new(api_key);
        model.api_base = var("GEMINI_API_BASE", DEFAULT_API_BASE);
        model.model = var("GEMINI_MODEL", DEFAULT_MODEL);
        model.timeout = Duration::from_secs(timeout_secs);

        Ok(Self {
            host: var("HUSHLINK_HOST", "0.0.0.0"),
            port,
            db_path: var("HUSHLINK_DB_PATH", "hushlink.db").into(),
            public_url: var("HUSHLINK_PUBLIC_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_string(),
            model,
        })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.db_path.as_os_str() == MEMORY_DB
    }
}
