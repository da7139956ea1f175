// jarvis-relay/crates/jarvis-relay/src/config.rs

use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use crate::gateway::openai_gateway::DEFAULT_BASE_URL;
use crate::memory::DEFAULT_MAX_MESSAGES;

/// Headroom on top of the completion timeout before the HTTP layer gives up
pub const RESPONSE_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub model_name: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub memory_window: usize,
    pub memory_sharded: bool,
    pub request_timeout: Duration,
    pub api_host: String,
    pub api_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_base_url: DEFAULT_BASE_URL.to_string(),
            model_name: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_tokens: 512,
            memory_window: DEFAULT_MAX_MESSAGES,
            memory_sharded: false,
            request_timeout: Duration::from_secs(20),
            api_host: "127.0.0.1".to_string(),
            api_port: 8000,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            warn!("Failed to load .env file: {}. Using system environment variables.", e);
        } else {
            info!("Loaded environment variables from .env file");
        }

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup, falling back to defaults.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let memory_window: usize = parse_var(&lookup, "MEMORY_WINDOW", defaults.memory_window)?;
        if memory_window == 0 {
            return Err(anyhow::anyhow!("MEMORY_WINDOW must be at least 1"));
        }

        let request_timeout = match lookup("REQUEST_TIMEOUT_SECONDS") {
            Some(raw) if !raw.trim().is_empty() => parse_timeout(&raw)?,
            _ => defaults.request_timeout,
        };

        Ok(Self {
            openai_api_key: lookup("OPENAI_API_KEY")
                .map(|k| k.trim().to_string())
                .unwrap_or_default(),
            openai_base_url: lookup("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            model_name: lookup("MODEL_NAME").unwrap_or(defaults.model_name),
            temperature: parse_var(&lookup, "TEMPERATURE", defaults.temperature)?,
            max_tokens: parse_var(&lookup, "MAX_TOKENS", defaults.max_tokens)?,
            memory_window,
            memory_sharded: parse_var(&lookup, "MEMORY_SHARDED", defaults.memory_sharded)?,
            request_timeout,
            api_host: lookup("API_HOST").unwrap_or(defaults.api_host),
            api_port: parse_var(&lookup, "API_PORT", defaults.api_port)?,
        })
    }

    /// Live completions are disabled when no API key is configured
    pub fn has_credentials(&self) -> bool {
        !self.openai_api_key.is_empty()
    }

    /// Deadline for the whole HTTP exchange; `from_vars` guarantees it does not overflow
    pub fn response_deadline(&self) -> Duration {
        self.request_timeout.saturating_add(RESPONSE_GRACE)
    }

    pub fn print_config(&self) {
        info!("Current Configuration:");
        info!(
            "- Provider: {} ({})",
            self.openai_base_url,
            if self.has_credentials() { "API key set" } else { "no API key, fallback only" }
        );
        info!("- Model: {}", self.model_name);
        info!("- Temperature: {}", self.temperature);
        info!("- Max Tokens: {}", self.max_tokens);
        info!(
            "- Memory Window: {} messages ({})",
            self.memory_window,
            if self.memory_sharded { "sharded" } else { "single lock" }
        );
        info!("- Request Timeout: {:?}", self.request_timeout);
        info!("- API: {}:{}", self.api_host, self.api_port);
    }

    pub fn api_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.api_host, self.api_port)
            .parse()
            .with_context(|| format!("Invalid API address {}:{}", self.api_host, self.api_port))
    }
}

/// Parses a positive timeout that still leaves room for `RESPONSE_GRACE`
fn parse_timeout(raw: &str) -> Result<Duration> {
    let seconds: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("REQUEST_TIMEOUT_SECONDS has an invalid value: {:?}", raw))?;
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(anyhow::anyhow!(
            "REQUEST_TIMEOUT_SECONDS must be a positive number of seconds, got {}",
            seconds
        ));
    }
    let timeout = Duration::try_from_secs_f64(seconds)
        .with_context(|| format!("REQUEST_TIMEOUT_SECONDS is out of range: {}", seconds))?;
    if timeout.checked_add(RESPONSE_GRACE).is_none() {
        return Err(anyhow::anyhow!(
            "REQUEST_TIMEOUT_SECONDS is too large: {}",
            seconds
        ));
    }
    Ok(timeout)
}

fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        _ => Ok(default),
    }
}
