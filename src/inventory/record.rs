//! Record builder: raw payload to valuation record

use crate::error::RecordError;
use crate::inventory::exclusions::ExclusionSet;
use crate::inventory::models::{
    format_currency, FetchOutcome, InventoryResponse, RawInventoryItem, ValuationRecord,
    NOT_AVAILABLE,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

/// Category that never counts towards a valuation
const CONTAINER_CATEGORY: &str = "Container";

/// Turns fetch outcomes into valuation records
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    exclusions: Arc<ExclusionSet>,
}

impl RecordBuilder {
    pub fn new(exclusions: Arc<ExclusionSet>) -> Self {
        Self { exclusions }
    }

    /// Build the record for one input line
    ///
    /// Every failure degrades to a zero-value record; nothing here aborts
    /// the run.
    pub fn normalize(&self, steam_id: &str, outcome: &FetchOutcome) -> ValuationRecord {
        match outcome {
            FetchOutcome::InvalidInput => ValuationRecord::invalid(),
            FetchOutcome::Exhausted | FetchOutcome::Cancelled => ValuationRecord::zero(steam_id),
            FetchOutcome::Success(payload) => match self.value_payload(steam_id, payload) {
                Ok(record) => record,
                Err(e) => {
                    warn!(steam_id, error = %e, "Error processing data for SteamID");
                    ValuationRecord::zero(steam_id)
                }
            },
        }
    }

    fn value_payload(&self, steam_id: &str, payload: &Value) -> Result<ValuationRecord, RecordError> {
        let response = InventoryResponse::deserialize(payload)?;
        let items: Vec<&RawInventoryItem> = response
            .items()
            .iter()
            .filter(|item| self.counts(item))
            .collect();

        let mut total = items
            .iter()
            .map(|item| price_of(item))
            .sum::<Result<f64, RecordError>>()?
            / 100.0;

        let item_image = items
            .first()
            .and_then(|item| item.img_url.clone())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        // No representative image means no payout.
        if item_image == NOT_AVAILABLE {
            total = 0.0;
        }

        Ok(ValuationRecord::new(
            steam_id,
            format_currency(total),
            Some(item_image),
        ))
    }

    fn counts(&self, item: &RawInventoryItem) -> bool {
        item.category() != CONTAINER_CATEGORY && !self.exclusions.contains(item.name())
    }
}

/// Price in minor units; absent counts as zero
fn price_of(item: &RawInventoryItem) -> Result<f64, RecordError> {
    let price = match &item.total_cash_price_today {
        None | Some(Value::Null) => return Ok(0.0),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    price
        .filter(|p| p.is_finite())
        .ok_or_else(|| RecordError::Price(format!("{:?}", item.total_cash_price_today)))
}
