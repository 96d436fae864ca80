use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::CandidateTrade;

/// Editable column of a candidate row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateField {
    Symbol,
    TradeType,
    LotSize,
    EntryPrice,
    ExitPrice,
    Pnl,
    TradeDate,
    Strategy,
    Notes,
}

/// Ordered, editable list of candidate trades awaiting "Save All".
/// Edits are not validated here; validation happens on commit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewBuffer {
    rows: Vec<CandidateTrade>,
}

impl ReviewBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_candidates(rows: Vec<CandidateTrade>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[CandidateTrade] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a blank "buy" row dated `today`.
    pub fn append_blank(&mut self, today: NaiveDate) -> &CandidateTrade {
        self.rows.push(CandidateTrade::blank(today));
        &self.rows[self.rows.len() - 1]
    }

    /// Set one field of one row. Returns false if no row has that id.
    pub fn update_field(&mut self, id: Uuid, field: CandidateField, value: String) -> bool {
        let Some(row) = self.rows.iter_mut().find(|r| r.id == id) else {
            return false;
        };

        let slot = match field {
            CandidateField::Symbol => &mut row.symbol,
            CandidateField::TradeType => &mut row.trade_type,
            CandidateField::LotSize => &mut row.lot_size,
            CandidateField::EntryPrice => &mut row.entry_price,
            CandidateField::ExitPrice => &mut row.exit_price,
            CandidateField::Pnl => &mut row.pnl,
            CandidateField::TradeDate => &mut row.trade_date,
            CandidateField::Strategy => &mut row.strategy,
            CandidateField::Notes => &mut row.notes,
        };
        *slot = value;
        true
    }

    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.rows.len();
        self.rows.retain(|r| r.id != id);
        self.rows.len() != before
    }

    /// Drop the given rows, keeping anything added since they were read.
    pub fn remove_committed(&mut self, ids: &[Uuid]) {
        self.rows.retain(|r| !ids.contains(&r.id));
    }
}
