//! Parsing of free-text user input into ledger fields

use crate::ledger::{Amount, Category};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Unsigned decimal: `12`, `12.`, `12.50`, `.5`, optional leading `+`
static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)$").expect("decimal pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Not a positive decimal amount: {0:?}")]
    InvalidAmount(String),
    #[error("Not one of the allowed categories: {0:?}")]
    InvalidCategory(String),
}

pub fn parse_amount(text: &str) -> Result<Amount, InputError> {
    let trimmed = text.trim();
    if !DECIMAL.is_match(trimmed) {
        return Err(InputError::InvalidAmount(text.to_string()));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Amount::new)
        .ok_or_else(|| InputError::InvalidAmount(text.to_string()))
}

/// Exact membership check against `allowed`
pub fn validate_category(text: &str, allowed: &[String]) -> Result<Category, InputError> {
    if allowed.iter().any(|c| c == text) {
        Ok(Category::new(text))
    } else {
        Err(InputError::InvalidCategory(text.to_string()))
    }
}
