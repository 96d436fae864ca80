pub mod stats;
pub mod validation;
pub mod writer;

pub use stats::{compute_stats, daily_pnl, DailyPnl, JournalStats};
pub use validation::{validate_batch, validate_trade_input, ValidationError};
pub use writer::{TradeWriter, WriteError};
