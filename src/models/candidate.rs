use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{TradeInput, TradeType};

/// An extraction hypothesis awaiting review. Never persisted as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateTrade {
    pub id: Uuid,
    pub symbol: String,
    pub trade_type: String,
    pub lot_size: String,
    pub entry_price: String,
    pub exit_price: String,
    pub pnl: String,
    pub trade_date: String,
    pub strategy: String,
    pub notes: String,
}

impl CandidateTrade {
    /// Blank row added by hand during review.
    pub fn blank(today: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: String::new(),
            trade_type: TradeType::Buy.as_str().into(),
            lot_size: String::new(),
            entry_price: String::new(),
            exit_price: String::new(),
            pnl: String::new(),
            trade_date: today.format("%Y-%m-%d").to_string(),
            strategy: String::new(),
            notes: String::new(),
        }
    }

    pub fn to_input(&self) -> TradeInput {
        TradeInput {
            symbol: self.symbol.clone(),
            trade_type: self.trade_type.clone(),
            entry_price: self.entry_price.clone(),
            exit_price: self.exit_price.clone(),
            lot_size: self.lot_size.clone(),
            pnl: self.pnl.clone(),
            trade_date: self.trade_date.clone(),
            strategy_tag: self.strategy.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// Account figures read alongside the trades (Profit, Deposit, Swap, ...).
/// Kept exactly as the model returned them; display only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountSummary(pub Map<String, Value>);
