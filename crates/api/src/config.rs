//! Process configuration from environment variables.
//!
//! | variable | default |
//! |---|---|
//! | `BIND_ADDR` | `0.0.0.0:8080` |
//! | `MODEL_BUNDLE_PATH` | `./models/bundle.json` |
//! | `DATA_PATH` | unset (empty in-memory store) |
//! | `FORECAST_HORIZON` | `6` |
//! | `TOP_DEMANDS_DEFAULT` | `5` |
//! | `WORKER_LIMIT` | `4` |
//! | `FORECAST_TIMEOUT_MS` | `5000` |

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}={value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub model_bundle_path: PathBuf,
    pub data_path: Option<PathBuf>,
    pub forecast_horizon: usize,
    pub top_demands_default: usize,
    pub worker_limit: usize,
    pub forecast_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            model_bundle_path: PathBuf::from("./models/bundle.json"),
            data_path: None,
            forecast_horizon: 6,
            top_demands_default: 5,
            worker_limit: 4,
            forecast_timeout: Duration::from_millis(5000),
        }
    }
}

impl ApiConfig {
    /// Read the process environment (call `dotenvy::dotenv()` first to pick up `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup; unset or blank values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            model_bundle_path: get("MODEL_BUNDLE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_bundle_path),
            data_path: get("DATA_PATH").map(PathBuf::from),
            forecast_horizon: positive("FORECAST_HORIZON", get("FORECAST_HORIZON"), defaults.forecast_horizon)?,
            top_demands_default: parse_usize(
                "TOP_DEMANDS_DEFAULT",
                get("TOP_DEMANDS_DEFAULT"),
                defaults.top_demands_default,
            )?,
            worker_limit: positive("WORKER_LIMIT", get("WORKER_LIMIT"), defaults.worker_limit)?,
            forecast_timeout: Duration::from_millis(
                positive("FORECAST_TIMEOUT_MS", get("FORECAST_TIMEOUT_MS"), 5000)? as u64,
            ),
        })
    }
}

fn parse_usize(var: &'static str, raw: Option<String>, default: usize) -> Result<usize, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.parse::<usize>().map_err(|e| ConfigError::Invalid {
            var,
            value,
            reason: e.to_string(),
        }),
    }
}

fn positive(var: &'static str, raw: Option<String>, default: usize) -> Result<usize, ConfigError> {
    let n = parse_usize(var, raw.clone(), default)?;
    if n == 0 {
        return Err(ConfigError::Invalid {
            var,
            value: raw.unwrap_or_default(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(n)
}
