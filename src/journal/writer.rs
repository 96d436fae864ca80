use metrics::counter;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use super::validation::{validate_batch, validate_trade_input, ValidationError};
use crate::db::trade_repo;
use crate::extraction::PendingScreenshot;
use crate::models::{TradeInput, TradeRecord};
use crate::storage::{ImageKind, ScreenshotStore, StorageError};

#[derive(Debug, Error)]
pub enum WriteError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("trade not found")]
    NotFound,

    #[error(transparent)]
    Database(#[from] anyhow::Error),
}

/// Validates trades, stores their images and writes them to the journal.
/// Validation runs before any upload, so a rejected trade leaves nothing behind.
#[derive(Debug, Clone)]
pub struct TradeWriter {
    pool: PgPool,
    store: ScreenshotStore,
}

impl TradeWriter {
    pub fn new(pool: PgPool, store: ScreenshotStore) -> Self {
        Self { pool, store }
    }

    /// Manual entry: one trade, optional screenshot.
    pub async fn commit_single(
        &self,
        user_id: &str,
        input: &TradeInput,
        screenshot: Option<&PendingScreenshot>,
    ) -> Result<TradeRecord, WriteError> {
        let trade = validate_trade_input(input)?;
        let screenshot_url = self.upload(user_id, ImageKind::Screenshot, screenshot).await?;

        let record =
            trade_repo::insert_trade(&self.pool, user_id, &trade, screenshot_url.as_deref())
                .await?;

        counter!("trades_committed_total", "source" => "manual").increment(1);
        tracing::info!(user_id, trade_id = %record.id, symbol = %record.symbol, "Trade recorded");

        Ok(record)
    }

    /// "Save All": every row or none. One shared screenshot URL on each row.
    pub async fn commit_batch(
        &self,
        user_id: &str,
        inputs: &[TradeInput],
        screenshot: Option<&PendingScreenshot>,
    ) -> Result<Vec<TradeRecord>, WriteError> {
        let trades = validate_batch(inputs)?;
        let screenshot_url = self.upload(user_id, ImageKind::Screenshot, screenshot).await?;

        let records =
            trade_repo::insert_trades(&self.pool, user_id, &trades, screenshot_url.as_deref())
                .await?;

        counter!("trades_committed_total", "source" => "extraction")
            .increment(records.len() as u64);
        tracing::info!(user_id, count = records.len(), "Extracted trades recorded");

        Ok(records)
    }

    /// Journal edit: rewrites all mutable fields. A new chart replaces the stored one;
    /// without one the existing chart URL is kept.
    pub async fn update(
        &self,
        user_id: &str,
        trade_id: Uuid,
        input: &TradeInput,
        strategy_chart: Option<&PendingScreenshot>,
    ) -> Result<TradeRecord, WriteError> {
        let trade = validate_trade_input(input)?;

        let existing = trade_repo::get_trade(&self.pool, user_id, trade_id)
            .await?
            .ok_or(WriteError::NotFound)?;

        let chart_url = match self
            .upload(user_id, ImageKind::StrategyChart, strategy_chart)
            .await?
        {
            Some(url) => Some(url),
            None => existing.strategy_chart_url,
        };

        trade_repo::update_trade(&self.pool, user_id, trade_id, &trade, chart_url.as_deref())
            .await?
            .ok_or(WriteError::NotFound)
    }

    async fn upload(
        &self,
        user_id: &str,
        kind: ImageKind,
        image: Option<&PendingScreenshot>,
    ) -> Result<Option<String>, StorageError> {
        match image {
            Some(img) => Ok(Some(
                self.store
                    .upload(user_id, kind, &img.file_name, &img.bytes)
                    .await?,
            )),
            None => Ok(None),
        }
    }
}
