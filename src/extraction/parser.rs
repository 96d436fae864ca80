use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::models::trade::scalar_text;
use crate::models::{AccountSummary, CandidateTrade, TradeType};

const PROMPT_HEADER: &str = "Extract all trading data and account summary details in a single JSON object. \
The JSON object should have two keys: 'summary' and 'trades'.

The 'summary' object should include:
- Profit
- Deposit
- Swap
- Commission
- Balance

Each object in the 'trades' array should include:
- Symbol
- Direction (Buy/Sell)
- LotSize
- Entry
- Exit
- PnL
- TradeDate (in YYYY-MM-DD format)

Do not include a 'Balance (D-trial)' field.

Screenshot text:
";

/// Prompt sent to the language model for one screenshot's OCR text.
pub fn build_prompt(ocr_text: &str) -> String {
    format!("{PROMPT_HEADER}{ocr_text}")
}

/// What one model answer yielded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredExtraction {
    pub trades: Vec<CandidateTrade>,
    pub summary: Option<AccountSummary>,
    /// Set only when the answer was not the expected JSON; the model's text, untouched.
    pub raw_output: Option<String>,
}

impl StructuredExtraction {
    pub fn is_fallback(&self) -> bool {
        self.raw_output.is_some()
    }
}

/// Remove ```json / ``` fences and surrounding whitespace.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Interpret the model's answer. Never fails: anything that is not a JSON object
/// degrades to zero candidates plus the raw text for manual inspection.
pub fn parse_model_output(text: &str, today: NaiveDate) -> StructuredExtraction {
    let cleaned = strip_code_fences(text);

    let root = match serde_json::from_str::<Value>(&cleaned) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => {
            tracing::warn!(chars = text.len(), "Model output is not a JSON object");
            return StructuredExtraction {
                trades: Vec::new(),
                summary: None,
                raw_output: Some(text.to_string()),
            };
        }
    };

    let trades = match root.get("trades") {
        Some(Value::Array(items)) => items.iter().map(|t| to_candidate(t, today)).collect(),
        _ => Vec::new(),
    };

    let summary = match root.get("summary") {
        Some(Value::Object(map)) => Some(AccountSummary(map.clone())),
        _ => None,
    };

    StructuredExtraction {
        trades,
        summary,
        raw_output: None,
    }
}

fn to_candidate(value: &Value, today: NaiveDate) -> CandidateTrade {
    let empty = Map::new();
    let obj = value.as_object().unwrap_or(&empty);

    let direction = field(obj, &["direction", "Direction"]);
    let trade_date = field(obj, &["TradeDate", "trade_date", "tradeDate"]);

    CandidateTrade {
        id: Uuid::new_v4(),
        symbol: field(obj, &["symbol", "Symbol"]),
        trade_type: TradeType::from_direction(&direction).as_str().into(),
        lot_size: field(obj, &["lot_size", "LotSize"]),
        entry_price: field(obj, &["entry", "Entry"]),
        exit_price: field(obj, &["exit", "Exit"]),
        pnl: field(obj, &["pnl", "PnL"]),
        trade_date: if trade_date.is_empty() {
            today.format("%Y-%m-%d").to_string()
        } else {
            trade_date
        },
        strategy: String::new(),
        notes: String::new(),
    }
}

/// First non-empty value among the name variants, as text.
fn field(obj: &Map<String, Value>, names: &[&str]) -> String {
    names
        .iter()
        .filter_map(|name| obj.get(*name))
        .map(scalar_text)
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn fenced_json_yields_trade_and_summary() {
        let text = "```json\n{\"summary\":{\"Profit\":-10,\"Balance\":990},\"trades\":[{\"Symbol\":\"EURUSD\",\"Direction\":\"Sell\",\"LotSize\":\"0.1\",\"Entry\":\"1.1\",\"Exit\":\"1.2\",\"PnL\":\"-10\",\"TradeDate\":\"2024-01-01\"}]}\n```";

        let out = parse_model_output(text, today());

        assert_eq!(out.trades.len(), 1);
        let t = &out.trades[0];
        assert_eq!(t.symbol, "EURUSD");
        assert_eq!(t.trade_type, "sell");
        assert_eq!(t.lot_size, "0.1");
        assert_eq!(t.entry_price, "1.1");
        assert_eq!(t.exit_price, "1.2");
        assert_eq!(t.pnl, "-10");
        assert_eq!(t.trade_date, "2024-01-01");

        let summary = out.summary.expect("summary should be populated");
        assert_eq!(summary.0["Balance"], serde_json::json!(990));
        assert!(out.raw_output.is_none());
    }

    #[test]
    fn prose_is_kept_verbatim() {
        let text = "Sorry, I could not find any trades in this screenshot.";
        let out = parse_model_output(text, today());

        assert!(out.trades.is_empty());
        assert!(out.summary.is_none());
        assert_eq!(out.raw_output.as_deref(), Some(text));
        assert!(out.is_fallback());
    }

    #[test]
    fn non_object_json_is_a_fallback() {
        let out = parse_model_output("[1, 2, 3]", today());
        assert!(out.trades.is_empty());
        assert_eq!(out.raw_output.as_deref(), Some("[1, 2, 3]"));
    }

    #[test]
    fn lowercase_variants_and_numbers_are_accepted() {
        let text = r#"{"trades":[{"symbol":"XAUUSD","direction":"buy","lot_size":0.5,"entry":2300.5,"exit":2310,"pnl":475.25}]}"#;
        let out = parse_model_output(text, today());

        let t = &out.trades[0];
        assert_eq!(t.symbol, "XAUUSD");
        assert_eq!(t.trade_type, "buy");
        assert_eq!(t.lot_size, "0.5");
        assert_eq!(t.entry_price, "2300.5");
        assert_eq!(t.exit_price, "2310");
        assert_eq!(t.pnl, "475.25");
        // missing date falls back to the extraction day
        assert_eq!(t.trade_date, "2024-06-01");
        assert!(out.summary.is_none());
    }

    #[test]
    fn unknown_direction_defaults_to_buy() {
        let text = r#"{"trades":[{"Symbol":"GBPJPY","Direction":"Short"},{"Symbol":"USDJPY"}]}"#;
        let out = parse_model_output(text, today());

        assert_eq!(out.trades.len(), 2);
        assert!(out.trades.iter().all(|t| t.trade_type == "buy"));
    }

    #[test]
    fn trades_not_an_array_gives_no_candidates() {
        let out = parse_model_output(r#"{"trades":"none","summary":"n/a"}"#, today());
        assert!(out.trades.is_empty());
        assert!(out.summary.is_none());
        assert!(!out.is_fallback());
    }

    #[test]
    fn prompt_ends_with_ocr_text() {
        let prompt = build_prompt("EURUSD sell 0.10");
        assert!(prompt.contains("'summary' and 'trades'"));
        assert!(prompt.ends_with("Screenshot text:\nEURUSD sell 0.10"));
    }
}
