pub mod candidate;
pub mod payment;
pub mod profile;
pub mod subscription;
pub mod trade;

pub use candidate::{AccountSummary, CandidateTrade};
pub use payment::{PaymentOrder, PaymentState};
pub use profile::{Profile, Role};
pub use subscription::{PlanType, Subscription};
pub use trade::{NewTrade, TradeInput, TradeRecord};

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// TradeType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeType {
    Buy,
    Sell,
}

impl TradeType {
    /// Parses "buy"/"sell" in any case. Anything else is `None`.
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Some(TradeType::Buy),
            "sell" => Some(TradeType::Sell),
            _ => None,
        }
    }

    /// Direction as reported by a screenshot: only an explicit "sell" is a sell.
    pub fn from_direction(direction: &str) -> Self {
        if direction.trim().eq_ignore_ascii_case("sell") {
            TradeType::Sell
        } else {
            TradeType::Buy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Buy => "buy",
            TradeType::Sell => "sell",
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_defaults_to_buy() {
        assert_eq!(TradeType::from_direction("Sell"), TradeType::Sell);
        assert_eq!(TradeType::from_direction("SELL "), TradeType::Sell);
        assert_eq!(TradeType::from_direction("Buy"), TradeType::Buy);
        assert_eq!(TradeType::from_direction(""), TradeType::Buy);
        assert_eq!(TradeType::from_direction("short"), TradeType::Buy);
    }

    #[test]
    fn api_str_is_strict() {
        assert_eq!(TradeType::from_api_str("BUY"), Some(TradeType::Buy));
        assert_eq!(TradeType::from_api_str("short"), None);
    }
}
