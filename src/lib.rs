//! Inventory Valuator - concurrent inventory valuation through rotating proxies
//!
//! Takes a batch of profile references and looks up each account's inventory
//! through a pool of proxies. Requests retry with a cooldown and run with
//! bounded concurrency. Each account's items become one valuation record.

pub mod dispatch;
pub mod error;
pub mod input;
pub mod inventory;
pub mod proxy;
pub mod report;
pub mod status;
pub mod tui;

pub use dispatch::{DispatcherConfig, ResultSink, WorkDispatcher};
pub use error::{FetchError, InputError, PoolError, ProxyParseError, RecordError, ReportError};
pub use inventory::{
    extract_identifier, ExclusionSet, FetchOutcome, FetcherConfig, HttpTransport,
    InventoryFetcher, InventoryTransport, RecordBuilder, ValuationRecord,
};
pub use proxy::{ProxyDescriptor, ProxyParser, ProxyPool, ProxyType};
pub use status::{ChannelSink, StatusEvent, StatusSink, TracingSink};

use std::path::PathBuf;

/// Application result type
pub type Result<T> = anyhow::Result<T>;

/// Default input and output locations
#[derive(Debug, Clone)]
pub struct Config {
    /// Profile references, one per line
    pub ids_path: PathBuf,
    /// Proxy list, one per line
    pub proxies_path: PathBuf,
    /// Optional list of item names to leave out
    pub exclude_path: PathBuf,
    /// CSV report destination
    pub output_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ids_path: PathBuf::from("id.txt"),
            proxies_path: PathBuf::from("proxy.txt"),
            exclude_path: PathBuf::from("exclude.txt"),
            output_path: PathBuf::from("steam_accounts_inventory.csv"),
        }
    }
}
