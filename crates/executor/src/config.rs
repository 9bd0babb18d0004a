use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use market_data::remote::DEFAULT_PRICE_API_BASE;

pub const DEFAULT_WORKDIR: &str = "data";
pub const DEFAULT_MODEL_PATH: &str = "models/forecaster.onnx";
pub const DEFAULT_INITIAL_CASH: f64 = 1000.0;
pub const DEFAULT_HISTORY_WINDOW_DAYS: u32 = 180;
pub const DEFAULT_CYCLE_INTERVAL_SECS: u64 = 600;

/// Configuration problems are fatal: they are reported before any cycle
/// starts, never during one.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: i64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub workdir: String,
    pub model_path: String,
    pub price_api_base: String,
    pub sentiment_api_url: String,
    pub initial_cash: f64,
    pub history_window_days: u32,
    pub cycle_interval: Duration,
    pub telegram: Option<TelegramConfig>,
    pub continuous: bool,
    pub backtest_days: Option<u32>,
}

fn optional(name: &'static str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn parsed<T>(name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(name) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::Invalid {
                name,
                reason: e.to_string(),
            }),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let sentiment_api_url = required("SENTIMENT_API_URL")?;

        // Telegram is optional, but a half-configured pair is a mistake
        // worth failing on.
        let telegram = match (
            optional("TELEGRAM_BOT_TOKEN"),
            optional("TELEGRAM_CHAT_ID"),
        ) {
            (Some(bot_token), Some(raw_chat)) => {
                let chat_id = raw_chat.parse::<i64>().map_err(|e| ConfigError::Invalid {
                    name: "TELEGRAM_CHAT_ID",
                    reason: e.to_string(),
                })?;
                Some(TelegramConfig { bot_token, chat_id })
            }
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("TELEGRAM_CHAT_ID")),
            (None, Some(_)) => return Err(ConfigError::Missing("TELEGRAM_BOT_TOKEN")),
        };

        Ok(Self {
            workdir: optional("WORKDIR").unwrap_or_else(|| DEFAULT_WORKDIR.to_string()),
            model_path: optional("MODEL_PATH").unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string()),
            price_api_base: optional("PRICE_API_BASE")
                .unwrap_or_else(|| DEFAULT_PRICE_API_BASE.to_string()),
            sentiment_api_url,
            initial_cash: parsed::<f64>("INITIAL_CASH")?.unwrap_or(DEFAULT_INITIAL_CASH),
            history_window_days: parsed::<u32>("HISTORY_WINDOW_DAYS")?
                .unwrap_or(DEFAULT_HISTORY_WINDOW_DAYS),
            cycle_interval: Duration::from_secs(
                parsed::<u64>("CYCLE_INTERVAL_SECS")?.unwrap_or(DEFAULT_CYCLE_INTERVAL_SECS),
            ),
            telegram,
            continuous: matches!(optional("CONTINUOUS").as_deref(), Some("1") | Some("true")),
            backtest_days: parsed::<u32>("BACKTEST_DAYS")?,
        })
    }
}
