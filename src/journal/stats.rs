use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::TradeRecord;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JournalStats {
    pub total_trades: usize,
    pub total_pnl: Decimal,
    /// Percentage of trades with pnl > 0.
    pub win_rate: Decimal,
    pub avg_win: Decimal,
    pub avg_loss: Decimal,
    pub best_trade: Option<Decimal>,
    pub worst_trade: Option<Decimal>,
    /// Days whose summed pnl is positive.
    pub profitable_days: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPnl {
    pub date: NaiveDate,
    pub pnl: Decimal,
    pub trades: usize,
}

pub fn compute_stats(trades: &[TradeRecord]) -> JournalStats {
    if trades.is_empty() {
        return JournalStats::default();
    }

    let total_trades = trades.len();
    let total_pnl: Decimal = trades.iter().map(|t| t.pnl).sum();

    let wins: Vec<Decimal> = trades.iter().map(|t| t.pnl).filter(|p| *p > Decimal::ZERO).collect();
    let losses: Vec<Decimal> = trades.iter().map(|t| t.pnl).filter(|p| *p < Decimal::ZERO).collect();

    let win_rate = (Decimal::from(wins.len() as u64) * Decimal::ONE_HUNDRED
        / Decimal::from(total_trades as u64))
    .round_dp(2);

    let profitable_days = daily_pnl(trades, None)
        .iter()
        .filter(|d| d.pnl > Decimal::ZERO)
        .count();

    JournalStats {
        total_trades,
        total_pnl,
        win_rate,
        avg_win: mean(&wins),
        avg_loss: mean(&losses),
        best_trade: trades.iter().map(|t| t.pnl).max(),
        worst_trade: trades.iter().map(|t| t.pnl).min(),
        profitable_days,
    }
}

/// Summed pnl per calendar day, oldest first; optionally one year only.
pub fn daily_pnl(trades: &[TradeRecord], year: Option<i32>) -> Vec<DailyPnl> {
    let mut days: BTreeMap<NaiveDate, (Decimal, usize)> = BTreeMap::new();

    for t in trades {
        if year.is_some_and(|y| t.trade_date.year() != y) {
            continue;
        }
        let entry = days.entry(t.trade_date).or_insert((Decimal::ZERO, 0));
        entry.0 += t.pnl;
        entry.1 += 1;
    }

    days.into_iter()
        .map(|(date, (pnl, trades))| DailyPnl { date, pnl, trades })
        .collect()
}

fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = values.iter().copied().sum();
    (sum / Decimal::from(values.len() as u64)).round_dp(2)
}
