mod config;
mod history;

pub use config::{AnalyticsConfig, Config, HapticsConfig, TimerConfig, UserConfig};
pub use history::{HistoryBaselineSource, HistoryLog};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/resttimer[-dev]/` based on RESTTIMER_ENV.
///
/// Set RESTTIMER_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("RESTTIMER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("resttimer-dev")
    } else {
        base_dir.join("resttimer")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
