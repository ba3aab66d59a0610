//! Environment configuration

use crate::chat::{TelegramConfig, DEFAULT_TELEGRAM_API};
use crate::ledger::{Categories, EntryKind};
use crate::sheets::{SheetsConfig, DEFAULT_SHEETS_API};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 30;
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Everything the bot needs to start
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram: TelegramConfig,
    pub sheets: SheetsConfig,
    pub categories: Categories,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let seconds = |name: &'static str, default: u64| match lookup(name) {
            None => Ok(Duration::from_secs(default)),
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| ConfigError::Invalid {
                    name,
                    reason: e.to_string(),
                }),
        };

        let defaults = Categories::default();
        let income = match lookup("LEDGER_INCOME_CATEGORIES") {
            Some(raw) => parse_categories("LEDGER_INCOME_CATEGORIES", &raw)?,
            None => defaults.for_kind(EntryKind::Income).to_vec(),
        };
        let expense = match lookup("LEDGER_EXPENSE_CATEGORIES") {
            Some(raw) => parse_categories("LEDGER_EXPENSE_CATEGORIES", &raw)?,
            None => defaults.for_kind(EntryKind::Expense).to_vec(),
        };

        let backend_timeout = seconds("LEDGER_BACKEND_TIMEOUT_SECS", DEFAULT_BACKEND_TIMEOUT_SECS)?;

        Ok(Self {
            telegram: TelegramConfig {
                token: required("LEDGER_TELEGRAM_TOKEN")?,
                api_base: lookup("LEDGER_TELEGRAM_API")
                    .unwrap_or_else(|| DEFAULT_TELEGRAM_API.to_string()),
                poll_timeout: seconds("LEDGER_POLL_TIMEOUT_SECS", DEFAULT_POLL_TIMEOUT_SECS)?,
                request_timeout: backend_timeout,
            },
            sheets: SheetsConfig {
                spreadsheet_id: required("LEDGER_SPREADSHEET_ID")?,
                token_file: PathBuf::from(required("LEDGER_GOOGLE_TOKEN_FILE")?),
                api_base: lookup("LEDGER_SHEETS_API")
                    .unwrap_or_else(|| DEFAULT_SHEETS_API.to_string()),
                timeout: backend_timeout,
            },
            categories: Categories::new(income, expense),
        })
    }
}

/// Comma-separated names; blanks dropped, at least one required
fn parse_categories(name: &'static str, raw: &str) -> Result<Vec<String>, ConfigError> {
    let categories: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect();
    if categories.is_empty() {
        return Err(ConfigError::Invalid {
            name,
            reason: "no categories listed".to_string(),
        });
    }
    Ok(categories)
}
