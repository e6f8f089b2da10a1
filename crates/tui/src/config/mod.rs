use clap::Parser;
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/tui.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    /// Prefills the login form.
    pub email: String,
    pub timezone: String,
    pub currency_symbol: String,
    /// Where the session token is persisted between runs.
    pub state_path: String,
    pub log_path: String,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "https://finacialtracker-a527.onrender.com/".to_string(),
            email: String::new(),
            timezone: "Asia/Kolkata".to_string(),
            currency_symbol: "₹".to_string(),
            state_path: "config/tui_session.json".to_string(),
            log_path: "config/tui.log".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Resolves the configured timezone, falling back to UTC on a bad name.
    pub fn tz(&self) -> chrono_tz::Tz {
        self.timezone.parse().unwrap_or_else(|_| {
            tracing::warn!("unknown timezone {:?}, using UTC", self.timezone);
            chrono_tz::UTC
        })
    }

    pub fn today(&self) -> chrono::NaiveDate {
        chrono::Utc::now().with_timezone(&self.tz()).date_naive()
    }
}

#[derive(Debug, Parser)]
#[command(name = "finance_tui", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override backend base URL.
    #[arg(long)]
    base_url: Option<String>,
    /// Override login email (password is never read from CLI).
    #[arg(long)]
    email: Option<String>,
    /// Override timezone (IANA name).
    #[arg(long)]
    timezone: Option<String>,
    /// Override the currency glyph used when rendering amounts.
    #[arg(long)]
    currency_symbol: Option<String>,
}

pub fn load() -> Result<AppConfig> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("FINANCE_TUI"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(email) = args.email {
        settings.email = email;
    }
    if let Some(timezone) = args.timezone {
        settings.timezone = timezone;
    }
    if let Some(symbol) = args.currency_symbol {
        settings.currency_symbol = symbol;
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_timezone_falls_back_to_utc() {
        let config = AppConfig {
            timezone: "Mars/Olympus".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(config.tz(), chrono_tz::UTC);
    }

    #[test]
    fn defaults_use_rupee_glyph() {
        let config = AppConfig::default();
        assert_eq!(config.currency_symbol, "₹");
        assert_eq!(config.tz(), chrono_tz::Asia::Kolkata);
    }
}
