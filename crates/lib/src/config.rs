//! Configuration types and loading.
//!
//! Config is loaded from an optional JSON file (e.g. `~/.gourmet-bot/config.json`) and
//! then overridden by environment variables. Loaded once at startup and shared read-only.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// LINE Messaging API credentials and endpoint.
    #[serde(default)]
    pub line: LineConfig,

    /// Restaurant search provider (Hot Pepper Gourmet).
    #[serde(default)]
    pub search: SearchConfig,

    /// Shape of location replies.
    #[serde(default)]
    pub reply: ReplyConfig,
}

/// Listener bind address and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Port for the webhook listener (default 8080). Overridden by PORT env.
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0").
    #[serde(default = "default_server_bind")]
    pub bind: String,
}

fn default_server_port() -> u16 {
    8080
}

fn default_server_bind() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            bind: default_server_bind(),
        }
    }
}

/// LINE channel config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineConfig {
    /// Channel secret used to verify `x-line-signature`. Overridden by LINE_CHANNEL_SECRET env.
    pub channel_secret: Option<String>,
    /// Bearer token for the reply API. Overridden by LINE_CHANNEL_ACCESS_TOKEN env.
    pub channel_access_token: Option<String>,
    /// Messaging API base URL (default "https://api.line.me").
    #[serde(default = "default_line_api_base_url")]
    pub api_base_url: String,
}

fn default_line_api_base_url() -> String {
    "https://api.line.me".to_string()
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_secret: None,
            channel_access_token: None,
            api_base_url: default_line_api_base_url(),
        }
    }
}

/// Search provider config. `range` and `count` are sent on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    /// Hot Pepper API key. Overridden by HOTPEPPER_API_KEY env. When absent, location messages get a "not configured" reply.
    pub api_key: Option<String>,
    /// Provider base URL (default "https://webservice.recruit.co.jp").
    #[serde(default = "default_search_base_url")]
    pub base_url: String,
    /// Search radius code (1 = 300m, 2 = 500m, 3 = 1km, 4 = 2km, 5 = 3km). Default 3.
    #[serde(default = "default_search_range")]
    pub range: u8,
    /// Maximum number of shops requested (default 5).
    #[serde(default = "default_search_count")]
    pub count: u32,
    /// Decimal places used when formatting latitude/longitude (default 6).
    #[serde(default = "default_coordinate_precision")]
    pub coordinate_precision: usize,
    /// Timeout for outbound HTTP calls in seconds (default 10).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_search_base_url() -> String {
    "https://webservice.recruit.co.jp".to_string()
}

/// Range codes accepted by the gourmet search API.
const SEARCH_RANGE_LIMITS: std::ops::RangeInclusive<u8> = 1..=5;
/// Maximum `count` accepted by the gourmet search API.
const SEARCH_COUNT_MAX: u32 = 100;

fn default_search_range() -> u8 {
    3
}

fn default_search_count() -> u32 {
    5
}

fn default_coordinate_precision() -> usize {
    6
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_search_base_url(),
            range: default_search_range(),
            count: default_search_count(),
            coordinate_precision: default_coordinate_precision(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SearchConfig {
    /// Reject `range` outside 1..=5 and `count` outside 1..=100; the provider fails every request otherwise.
    pub fn validate(&self) -> Result<()> {
        if !SEARCH_RANGE_LIMITS.contains(&self.range) {
            anyhow::bail!(
                "search.range must be between {} and {} (got {})",
                SEARCH_RANGE_LIMITS.start(),
                SEARCH_RANGE_LIMITS.end(),
                self.range
            );
        }
        if self.count == 0 || self.count > SEARCH_COUNT_MAX {
            anyhow::bail!(
                "search.count must be between 1 and {} (got {})",
                SEARCH_COUNT_MAX,
                self.count
            );
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// How a successful restaurant search is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyFormat {
    /// Plain text listing of name and address per shop.
    #[default]
    Text,
    /// Carousel template with one card per shop.
    Carousel,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyConfig {
    #[serde(default)]
    pub format: ReplyFormat,
}

/// Read an env var; whitespace-only or unset yields None.
fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

fn trimmed(value: Option<&String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl Config {
    /// Apply environment overrides (LINE_CHANNEL_SECRET, LINE_CHANNEL_ACCESS_TOKEN, HOTPEPPER_API_KEY, PORT).
    /// Blank values in the file are normalized to None.
    pub fn apply_env(mut self) -> Self {
        self.line.channel_secret =
            env_nonempty("LINE_CHANNEL_SECRET").or_else(|| trimmed(self.line.channel_secret.as_ref()));
        self.line.channel_access_token = env_nonempty("LINE_CHANNEL_ACCESS_TOKEN")
            .or_else(|| trimmed(self.line.channel_access_token.as_ref()));
        self.search.api_key =
            env_nonempty("HOTPEPPER_API_KEY").or_else(|| trimmed(self.search.api_key.as_ref()));
        if let Some(port) = env_nonempty("PORT") {
            match port.parse::<u16>() {
                Ok(p) => self.server.port = p,
                Err(_) => log::warn!("ignoring invalid PORT value: {}", port),
            }
        }
        self
    }
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("GOURMET_BOT_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".gourmet-bot").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path (or the default). Missing file => default config.
/// Environment overrides are applied on top.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    let config = config.apply_env();
    config
        .search
        .validate()
        .with_context(|| format!("invalid config in {}", path.display()))?;
    Ok(config)
}

/// Mask a credential for logging: first and last four characters around `****`.
/// Values of eight characters or fewer are masked entirely.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}****{}", head, tail)
}
