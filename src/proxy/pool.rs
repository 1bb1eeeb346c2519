//! Immutable, ordered proxy pool shared by every worker

use crate::error::PoolError;
use crate::proxy::models::{ProxyDescriptor, ProxyType};
use crate::proxy::parser::ProxyParser;
use tracing::{info, warn};

/// Ordered set of proxies, fixed after load
#[derive(Debug, Clone)]
pub struct ProxyPool {
    proxies: Vec<ProxyDescriptor>,
}

impl ProxyPool {
    /// Parse raw proxy lines into a pool
    ///
    /// Malformed entries are skipped with a warning. A pool with no usable
    /// entry is an error the caller must treat as fatal.
    pub fn parse<I, S>(lines: I) -> Result<Self, PoolError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut proxies = Vec::new();
        let mut skipped = 0usize;

        for line in lines {
            let line = line.as_ref();
            match ProxyParser::parse_line(line, ProxyType::Http) {
                Ok(Some(proxy)) => proxies.push(proxy),
                Ok(None) => {}
                Err(e) => {
                    skipped += 1;
                    warn!(entry = %redact(line), error = %e, "Skipping malformed proxy entry");
                }
            }
        }

        if skipped > 0 {
            info!(loaded = proxies.len(), skipped, "Proxy list parsed with rejected entries");
        }

        Self::from_proxies(proxies)
    }

    /// Build a pool from already parsed descriptors
    pub fn from_proxies(proxies: Vec<ProxyDescriptor>) -> Result<Self, PoolError> {
        if proxies.is_empty() {
            return Err(PoolError::Empty);
        }
        Ok(Self { proxies })
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    /// Always false for a constructed pool
    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ProxyDescriptor> {
        self.proxies.get(index)
    }

    /// Proxies in pool order
    pub fn iter(&self) -> impl Iterator<Item = &ProxyDescriptor> {
        self.proxies.iter()
    }
}

/// Keep only the host part of a rejected line so passwords do not reach logs
fn redact(line: &str) -> String {
    let line = line.trim();
    let without_scheme = line.split_once("://").map_or(line, |(_, rest)| rest);
    match without_scheme.split_once(':') {
        Some((host, _)) => format!("{}:***", host),
        None => without_scheme.to_string(),
    }
}
