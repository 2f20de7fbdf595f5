use std::env;
use std::time::Duration;

use crate::diagnosis::RankPolicy;

/// デプロイ前の送信先URLに残っている仮の文字列
pub const ENDPOINT_PLACEHOLDER: &str = "YOUR_GAS_WEB_APP_URL";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Top-level configuration for the questionnaire.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub rank_policy: RankPolicy,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let endpoint = parse_endpoint(env::var("NUTRICHECK_ENDPOINT").ok())?;

        let timeout = env::var("NUTRICHECK_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string());
        let timeout = timeout
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or(ConfigError::InvalidTimeout(timeout))?;

        let rank_policy =
            parse_rank_tiers(&env::var("NUTRICHECK_RANK_TIERS").unwrap_or_else(|_| "3".into()))?;

        let log_level = env::var("NUTRICHECK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            gateway: GatewayConfig { endpoint, timeout },
            rank_policy,
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Settings for the outbound submission endpoint.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// `None` なら送信を行わない
    pub endpoint: Option<String>,
    pub timeout: Duration,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

fn parse_endpoint(value: Option<String>) -> Result<Option<String>, ConfigError> {
    let Some(value) = value.map(|v| v.trim().to_string()) else {
        return Ok(None);
    };
    if value.is_empty() || value.contains(ENDPOINT_PLACEHOLDER) {
        return Ok(None);
    }
    match reqwest::Url::parse(&value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Some(value)),
        Ok(url) => Err(ConfigError::InvalidEndpoint {
            value,
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(err) => Err(ConfigError::InvalidEndpoint {
            value,
            reason: err.to_string(),
        }),
    }
}

fn parse_rank_tiers(value: &str) -> Result<RankPolicy, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "3" | "three" => Ok(RankPolicy::three_tier()),
        "4" | "four" => Ok(RankPolicy::four_tier()),
        other => Err(ConfigError::InvalidRankTiers(other.to_string())),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("NUTRICHECK_ENDPOINT '{value}' is not a usable URL: {reason}")]
    InvalidEndpoint { value: String, reason: String },
    #[error("NUTRICHECK_TIMEOUT_SECS must be a positive integer, got '{0}'")]
    InvalidTimeout(String),
    #[error("NUTRICHECK_RANK_TIERS must be 3 or 4, got '{0}'")]
    InvalidRankTiers(String),
}
