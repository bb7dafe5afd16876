//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Workflow tuning.
    #[serde(default)]
    pub workflow: WorkflowConfig,
    /// Retry policy for persistence failures.
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Workflow tuning knobs.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WorkflowConfig {
    /// Expenses at or below this amount become terminal on leader approval
    /// (`leader_approved`), skipping treasury and finance review.
    /// `None` routes every expense through the full chain.
    #[serde(default)]
    pub leader_final_threshold: Option<Decimal>,
}

/// Retry policy for persistence failures.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base backoff between attempts, in milliseconds. Doubles per retry.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    50
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FISCUS").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
