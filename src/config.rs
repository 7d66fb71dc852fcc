//! Game configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! `from_env` is a thin wrapper over `from_lookup`, which takes any key
//! lookup function. Tests feed a map instead of mutating the process
//! environment, so they can run in parallel.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ROUND_SECS: u32 = 16;
pub const DEFAULT_FEEDBACK_MS: u64 = 1000;
pub const DEFAULT_CHOICES: usize = 4;
pub const DEFAULT_PROVIDER_URL: &str = "https://restcountries.com/v3.1/all?fields=name,flags";
pub const DEFAULT_STORE_PATH: &str = "flagquiz-scores.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("{key} out of range: {reason}")]
    OutOfRange { key: &'static str, reason: &'static str },
}

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Countdown budget for each round, in whole seconds.
    pub round_secs: u32,
    /// Delay between a guess and the follow-up transition.
    pub feedback_delay: Duration,
    /// Options shown per round, target included.
    pub choices: usize,
    pub provider_url: String,
    pub store_path: PathBuf,
    pub timeouts: HttpTimeouts,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_secs: DEFAULT_ROUND_SECS,
            feedback_delay: Duration::from_millis(DEFAULT_FEEDBACK_MS),
            choices: DEFAULT_CHOICES,
            provider_url: DEFAULT_PROVIDER_URL.to_string(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            timeouts: HttpTimeouts::default(),
        }
    }
}

impl GameConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `FLAGQUIZ_ROUND_SECS`: default 16, must be at least 1
    /// - `FLAGQUIZ_FEEDBACK_MS`: default 1000
    /// - `FLAGQUIZ_CHOICES`: default 4, must be at least 2
    /// - `FLAGQUIZ_PROVIDER_URL`: country data endpoint
    /// - `FLAGQUIZ_STORE_PATH`: JSON file holding the best streak
    /// - `FLAGQUIZ_REQUEST_TIMEOUT_SECS`: default 30
    /// - `FLAGQUIZ_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric value does not parse or is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`GameConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let round_secs = parse_or(&lookup, "FLAGQUIZ_ROUND_SECS", DEFAULT_ROUND_SECS)?;
        if round_secs == 0 {
            return Err(ConfigError::OutOfRange { key: "FLAGQUIZ_ROUND_SECS", reason: "must be at least 1" });
        }

        let choices = parse_or(&lookup, "FLAGQUIZ_CHOICES", DEFAULT_CHOICES)?;
        if choices < 2 {
            return Err(ConfigError::OutOfRange { key: "FLAGQUIZ_CHOICES", reason: "must be at least 2" });
        }

        let feedback_ms = parse_or(&lookup, "FLAGQUIZ_FEEDBACK_MS", DEFAULT_FEEDBACK_MS)?;
        let provider_url = lookup("FLAGQUIZ_PROVIDER_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_PROVIDER_URL.to_string());
        let store_path = lookup("FLAGQUIZ_STORE_PATH")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_STORE_PATH), PathBuf::from);
        let timeouts = HttpTimeouts {
            request_secs: parse_or(&lookup, "FLAGQUIZ_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: parse_or(&lookup, "FLAGQUIZ_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };

        Ok(Self {
            round_secs,
            feedback_delay: Duration::from_millis(feedback_ms),
            choices,
            provider_url,
            store_path,
            timeouts,
        })
    }

    /// Distractors drawn per round alongside the target.
    #[must_use]
    pub fn distractors(&self) -> usize {
        self.choices.saturating_sub(1)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
