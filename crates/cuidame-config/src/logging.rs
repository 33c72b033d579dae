//! Logging configuration.
//!
//! - `LOG_LEVEL`: default level for this application's targets (default: `info`).
//!   `RUST_LOG`, when set, overrides the whole filter.
//! - `LOG_FORMAT`: `compact` (default) or `json`
//! - `LOG_DIR`: when set, logs are also written to a daily rolling file in this directory

use std::str::FromStr;

use crate::non_empty_var;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" | "text" | "pretty" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
    pub directory: Option<String>,
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self {
            level: non_empty_var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            format: non_empty_var("LOG_FORMAT")
                .and_then(|f| f.parse().ok())
                .unwrap_or_default(),
            directory: non_empty_var("LOG_DIR"),
        }
    }
}
