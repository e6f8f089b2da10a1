use std::{fs, path::Path, sync::Arc};

use tracing_subscriber::EnvFilter;

use crate::{
    config::AppConfig,
    error::{AppError, Result},
};

/// Installs the global subscriber, writing to the configured log file.
///
/// The terminal is owned by the UI, so nothing is ever logged to stdout.
pub fn init(config: &AppConfig) -> Result<()> {
    if let Some(parent) = Path::new(&config.log_path).parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;

    let filter = EnvFilter::try_new(format!(
        "finance_tui={level},api_types={level}",
        level = config.log_level
    ))
    .map_err(|err| AppError::Log(err.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| AppError::Log(err.to_string()))
}
