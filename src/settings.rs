use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

const ENV_PREFIX: &str = "BYLAW";
const CONFIG_FILE: &str = "bylaw";

/// Layered settings: defaults < `bylaw.toml` < `BYLAW_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Literal line (e.g. a district code like "R1-1") stripped from every page.
    pub district_code: Option<String>,
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub max_completion_tokens: u32,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub max_body_chars: usize,
    pub concurrency: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            district_code: None,
            api_key: None,
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.1,
            max_completion_tokens: 2000,
            max_retries: 3,
            retry_delay_ms: 2000,
            max_body_chars: 8000,
            concurrency: 4,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let mut settings: Settings = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("Failed to load settings")?
            .try_deserialize()
            .context("Invalid settings")?;

        if settings.api_key.is_none() {
            settings.api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
        }
        settings.max_retries = settings.max_retries.max(1);
        settings.concurrency = settings.concurrency.max(1);
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.max_retries, 3);
        assert_eq!(s.max_body_chars, 8000);
        assert!(s.district_code.is_none());
    }

    #[test]
    fn partial_source_keeps_defaults() {
        let s: Settings = Config::builder()
            .set_override("model", "local-model")
            .unwrap()
            .set_override("district_code", "RT-7")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(s.model, "local-model");
        assert_eq!(s.district_code.as_deref(), Some("RT-7"));
        assert_eq!(s.retry_delay_ms, 2000);
    }
}
