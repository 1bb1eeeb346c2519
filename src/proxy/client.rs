//! Per-attempt HTTP client bound to one proxy

use crate::error::FetchError;
use crate::proxy::models::ProxyDescriptor;
use reqwest::{Client, Proxy as ReqwestProxy};
use std::time::Duration;

/// Build a client that routes every request through `proxy`
///
/// A fresh client is built for each attempt since the proxy changes between
/// attempts; nothing is pooled.
pub fn build_client(proxy: &ProxyDescriptor, timeout: Duration) -> Result<Client, FetchError> {
    let build_error = |source| FetchError::ClientBuild {
        proxy: proxy.to_string(),
        source,
    };

    let reqwest_proxy = ReqwestProxy::all(proxy.url()).map_err(build_error)?;

    Client::builder()
        .proxy(reqwest_proxy)
        .timeout(timeout)
        .build()
        .map_err(build_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::models::ProxyType;

    #[test]
    fn test_build_client_plain() {
        let proxy = ProxyDescriptor::new("127.0.0.1".to_string(), 8080, ProxyType::Http);
        assert!(build_client(&proxy, Duration::from_secs(30)).is_ok());
    }

    #[test]
    fn test_build_client_with_credentials() {
        let proxy = ProxyDescriptor::with_auth(
            "127.0.0.1".to_string(),
            8080,
            ProxyType::Http,
            "user".to_string(),
            "pass".to_string(),
        );
        assert!(build_client(&proxy, Duration::from_secs(30)).is_ok());
    }

    #[test]
    fn test_build_client_socks() {
        let proxy = ProxyDescriptor::new("127.0.0.1".to_string(), 1080, ProxyType::Socks5);
        assert!(build_client(&proxy, Duration::from_secs(5)).is_ok());
    }
}
