use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{NewTrade, TradeInput, TradeType};

/// A trade field that cannot be written as given. `row` is 1-based within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{field} {reason}", row_prefix(.row))]
pub struct ValidationError {
    pub row: Option<usize>,
    pub field: &'static str,
    pub reason: String,
}

fn row_prefix(row: &Option<usize>) -> String {
    match row {
        Some(n) => format!("row {n}: "),
        None => String::new(),
    }
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            row: None,
            field,
            reason: reason.into(),
        }
    }

    fn at_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }
}

/// Parse and check one trade. Nothing malformed gets through: a number that
/// does not parse is rejected rather than stored as a placeholder.
pub fn validate_trade_input(input: &TradeInput) -> Result<NewTrade, ValidationError> {
    let symbol = input.symbol.trim();
    if symbol.is_empty() {
        return Err(ValidationError::new("symbol", "is required"));
    }

    let trade_type = match input.trade_type.trim() {
        "" => None,
        raw => Some(TradeType::from_api_str(raw).ok_or_else(|| {
            ValidationError::new("trade_type", format!("must be buy or sell, got '{raw}'"))
        })?),
    };

    let entry_price = parse_decimal("entry_price", &input.entry_price)?;
    let exit_price = parse_decimal("exit_price", &input.exit_price)?;
    let lot_size = parse_decimal("lot_size", &input.lot_size)?;
    let pnl = parse_decimal("pnl", &input.pnl)?;

    if lot_size < Decimal::ZERO {
        return Err(ValidationError::new("lot_size", "must not be negative"));
    }

    let trade_date = NaiveDate::parse_from_str(input.trade_date.trim(), "%Y-%m-%d").map_err(|_| {
        ValidationError::new(
            "trade_date",
            format!("must be a YYYY-MM-DD date, got '{}'", input.trade_date.trim()),
        )
    })?;

    Ok(NewTrade {
        symbol: symbol.to_string(),
        trade_type,
        entry_price,
        exit_price,
        lot_size,
        pnl,
        trade_date,
        strategy_tag: non_empty(&input.strategy_tag),
        notes: non_empty(&input.notes),
    })
}

/// Validate every row; the first bad row rejects the whole batch.
pub fn validate_batch(inputs: &[TradeInput]) -> Result<Vec<NewTrade>, ValidationError> {
    if inputs.is_empty() {
        return Err(ValidationError::new("trades", "nothing to save"));
    }

    inputs
        .iter()
        .enumerate()
        .map(|(i, input)| validate_trade_input(input).map_err(|e| e.at_row(i + 1)))
        .collect()
}

/// Decimal from form or model text. Thousands separators, spaces and a leading
/// `$` are tolerated; anything else that does not parse is an error.
fn parse_decimal(field: &'static str, raw: &str) -> Result<Decimal, ValidationError> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }

    Decimal::from_str(&cleaned)
        .map_err(|_| ValidationError::new(field, format!("is not a number: '{}'", raw.trim())))
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}
