//! Inventory module: fetching and valuing one account at a time
//!
//! - `fetcher` runs the proxy-rotation and retry protocol
//! - `record` turns a fetched payload into a valuation record
//! - `identifier` and `exclusions` hold the input-side rules

pub mod exclusions;
pub mod fetcher;
pub mod identifier;
pub mod models;
pub mod record;

pub use exclusions::ExclusionSet;
pub use fetcher::{FetcherConfig, HttpTransport, InventoryFetcher, InventoryTransport};
pub use identifier::extract_identifier;
pub use models::{FetchOutcome, InventoryResponse, RawInventoryItem, ValuationRecord};
pub use record::RecordBuilder;
