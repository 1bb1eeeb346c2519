//! Inventory payload and valuation record models

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder used for unknown identifiers and missing images
pub const NOT_AVAILABLE: &str = "N/A";

/// Total value written for every record that carries no payout
pub const ZERO_VALUE: &str = "0.00$";

/// Suffix appended to formatted totals
pub const CURRENCY_SUFFIX: char = '$';

/// Top-level body of the inventory search endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub data: Option<InventoryData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryData {
    #[serde(default, rename = "isWaiting")]
    pub is_waiting: Option<bool>,
    #[serde(default)]
    pub inventory: Option<Vec<RawInventoryItem>>,
}

impl InventoryResponse {
    /// Items of the payload, empty when the API sent none
    pub fn items(&self) -> &[RawInventoryItem] {
        self.data
            .as_ref()
            .and_then(|data| data.inventory.as_deref())
            .unwrap_or_default()
    }

    /// `success` together with `data.isWaiting` marks a job still queued upstream
    pub fn is_pending(&self) -> bool {
        let waiting = self.data.as_ref().and_then(|data| data.is_waiting);
        self.success.unwrap_or(false) && waiting.unwrap_or(false)
    }
}

/// One inventory entry as returned by the API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInventoryItem {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Price in minor units; the API sends either a number or a numeric string
    #[serde(default, rename = "totalCashPriceToday")]
    pub total_cash_price_today: Option<Value>,
    #[serde(default, rename = "imgURL")]
    pub img_url: Option<String>,
}

impl RawInventoryItem {
    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// Result of running the fetch protocol for one input line
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// First usable 200 response body
    Success(Value),
    /// Every attempt cycle across every proxy failed
    Exhausted,
    /// The profile reference carried no identifier
    InvalidInput,
    /// The run was cancelled before a usable response arrived
    Cancelled,
}

/// Normalized per-identifier output row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationRecord {
    #[serde(rename = "SteamID")]
    pub identifier: String,
    #[serde(rename = "TotalValue")]
    pub total_value: String,
    /// `None` is the absent-image marker set by the report fixups
    #[serde(rename = "ItemImage")]
    pub item_image: Option<String>,
}

impl ValuationRecord {
    pub fn new(identifier: impl Into<String>, total_value: impl Into<String>, item_image: Option<String>) -> Self {
        Self {
            identifier: identifier.into(),
            total_value: total_value.into(),
            item_image,
        }
    }

    /// Zero-value placeholder that keeps the identifier
    pub fn zero(identifier: impl Into<String>) -> Self {
        Self::new(identifier, ZERO_VALUE, Some(NOT_AVAILABLE.to_string()))
    }

    /// Placeholder for an input line without an identifier
    pub fn invalid() -> Self {
        Self::zero(NOT_AVAILABLE)
    }

    /// Whether the total is exactly the zero marker
    pub fn is_zero(&self) -> bool {
        self.total_value == ZERO_VALUE
    }

    /// Numeric value of the total, `None` for placeholders and unparsable text
    pub fn numeric_value(&self) -> Option<f64> {
        self.total_value
            .strip_suffix(CURRENCY_SUFFIX)
            .unwrap_or(&self.total_value)
            .parse()
            .ok()
    }
}

/// Format a currency amount as `<value with 2 decimals>$`
pub fn format_currency(value: f64) -> String {
    format!("{:.2}{}", value, CURRENCY_SUFFIX)
}
