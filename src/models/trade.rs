use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use super::TradeType;

/// Database row for trades table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TradeRecord {
    pub id: Uuid,
    pub user_id: String,
    pub symbol: String,
    pub trade_type: Option<String>,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub lot_size: Decimal,
    pub pnl: Decimal,
    pub trade_date: NaiveDate,
    pub strategy_tag: Option<String>,
    pub notes: Option<String>,
    pub screenshot_url: Option<String>,
    pub strategy_chart_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Trade fields as typed in a form or produced by extraction: all text, unvalidated.
/// JSON numbers and booleans are accepted and kept as their text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeInput {
    #[serde(deserialize_with = "text_or_number")]
    pub symbol: String,
    #[serde(deserialize_with = "text_or_number")]
    pub trade_type: String,
    #[serde(deserialize_with = "text_or_number")]
    pub entry_price: String,
    #[serde(deserialize_with = "text_or_number")]
    pub exit_price: String,
    #[serde(deserialize_with = "text_or_number")]
    pub lot_size: String,
    #[serde(deserialize_with = "text_or_number")]
    pub pnl: String,
    #[serde(deserialize_with = "text_or_number")]
    pub trade_date: String,
    #[serde(deserialize_with = "text_or_number")]
    pub strategy_tag: String,
    #[serde(deserialize_with = "text_or_number")]
    pub notes: String,
}

/// Text form of a JSON scalar; strings are trimmed, null and containers are empty.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(_) | Value::Object(_) => Err(D::Error::custom("expected text or a number")),
        v => Ok(scalar_text(&v)),
    }
}

/// A validated trade ready to be written. pnl is stored as given.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrade {
    pub symbol: String,
    pub trade_type: Option<TradeType>,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub lot_size: Decimal,
    pub pnl: Decimal,
    pub trade_date: NaiveDate,
    pub strategy_tag: Option<String>,
    pub notes: Option<String>,
}
