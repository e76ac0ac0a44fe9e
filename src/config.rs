use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Parse error for {field}: {value} - {message}")]
    Parse {
        field: String,
        value: String,
        message: String,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Policy for resolving scalar-kind disagreements between sampled instances
/// of the same entity kind.
///
/// The scanner can observe e.g. `age: 42` on one instance and `age: "old"`
/// on another; which kind wins is an explicit choice, not an accident of
/// sample order in some modes:
/// - `FirstWins`: the kind of the first sampled occurrence is kept.
/// - `Widen`: Integer + Float widen to Float; any other mix widens to String.
/// - `Reject`: the scan fails with a scalar-conflict error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    #[default]
    FirstWins,
    Widen,
    Reject,
}

impl FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "first_wins" | "first-wins" | "firstwins" => Ok(ConflictPolicy::FirstWins),
            "widen" => Ok(ConflictPolicy::Widen),
            "reject" => Ok(ConflictPolicy::Reject),
            other => Err(format!("unknown conflict policy `{}`", other)),
        }
    }
}

/// Options for the live-graph schema scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Maximum number of instances sampled per entity kind
    pub sample_size: usize,

    /// How scalar-kind disagreements between samples are resolved
    pub conflict_policy: ConflictPolicy,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            sample_size: 32,
            conflict_policy: ConflictPolicy::FirstWins,
        }
    }
}

impl ScanOptions {
    /// Create scan options from environment variables, falling back to the
    /// defaults for anything unset
    pub fn from_env() -> Result<Self, ConfigError> {
        let options = Self {
            sample_size: parse_env_var("GRAFTQL_SAMPLE_SIZE", "32")?,
            conflict_policy: parse_env_var("GRAFTQL_CONFLICT_POLICY", "first_wins")?,
        };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_size == 0 {
            return Err(ConfigError::Invalid(
                "sample_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse an environment variable with a default value
fn parse_env_var<T: FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e: T::Err| ConfigError::Parse {
        field: key.to_string(),
        value,
        message: e.to_string(),
    })
}
