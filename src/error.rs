//! Typed errors for the library layers

use std::path::PathBuf;
use thiserror::Error;

/// A proxy line that could not be turned into a descriptor
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProxyParseError {
    #[error("expected host:port or host:port:user:pass, got {fields} field(s)")]
    FieldCount { fields: usize },
    #[error("invalid port: {0}")]
    InvalidPort(String),
    #[error("unsupported proxy scheme: {0}")]
    UnsupportedScheme(String),
}

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("no usable proxies were loaded")]
    Empty,
}

/// Failure of a single request attempt through one proxy
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build client for proxy {proxy}: {source}")]
    ClientBuild {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request through proxy {proxy} failed: {message}")]
    Transport { proxy: String, message: String },
    #[error("unexpected status {status} from proxy {proxy}")]
    Status { proxy: String, status: u16 },
    #[error("undecodable response body from proxy {proxy}: {message}")]
    Decode { proxy: String, message: String },
}

/// Payload that could not be valued
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("malformed inventory payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("invalid price value: {0}")]
    Price(String),
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("input file not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
