//! Proxy module for loading and using outbound relays
//!
//! This module provides functionality for:
//! - Parsing proxies from `IP:PORT` and `IP:PORT:USER:PASS` lines
//! - Holding the ordered, read-only pool shared by all workers
//! - Building a per-attempt HTTP client bound to one proxy

pub mod client;
pub mod models;
pub mod parser;
pub mod pool;

pub use client::build_client;
pub use models::{ProxyAuth, ProxyDescriptor, ProxyType};
pub use parser::ProxyParser;
pub use pool::ProxyPool;
