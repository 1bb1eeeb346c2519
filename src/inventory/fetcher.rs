//! Inventory fetcher: request, proxy rotation and retry protocol for one identifier

use crate::error::FetchError;
use crate::inventory::models::{FetchOutcome, InventoryResponse};
use crate::proxy::{build_client, ProxyDescriptor, ProxyPool};
use crate::status::StatusSink;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Default inventory search endpoint
pub const DEFAULT_ENDPOINT: &str = "https://tradeit.gg/api/v2/inventory/search";

/// Default number of full passes over the proxy pool
const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default per-request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default pause between attempt cycles in seconds
const DEFAULT_COOLDOWN_SECS: u64 = 7;

/// Configuration for the fetch protocol
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Number of attempt cycles before giving up
    pub max_attempts: u32,
    /// Timeout for each request
    pub timeout: Duration,
    /// Pause after each failed attempt cycle
    pub cooldown: Duration,
    /// Inventory endpoint, queried with `steamId=<identifier>`
    pub endpoint: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cooldown: Duration::from_secs(DEFAULT_COOLDOWN_SECS),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl FetcherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }
}

/// One GET of the inventory endpoint through one proxy
///
/// Implementations return the decoded JSON body of a 200 response and an
/// error for anything else.
#[async_trait]
pub trait InventoryTransport: Send + Sync {
    async fn get_inventory(
        &self,
        proxy: &ProxyDescriptor,
        steam_id: &str,
    ) -> Result<Value, FetchError>;
}

/// Production transport: a fresh proxied `reqwest` client per attempt
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(endpoint: String, timeout: Duration) -> Self {
        Self { endpoint, timeout }
    }

    pub fn from_config(config: &FetcherConfig) -> Self {
        Self::new(config.endpoint.clone(), config.timeout)
    }
}

#[async_trait]
impl InventoryTransport for HttpTransport {
    async fn get_inventory(
        &self,
        proxy: &ProxyDescriptor,
        steam_id: &str,
    ) -> Result<Value, FetchError> {
        let client = build_client(proxy, self.timeout)?;

        let response = client
            .get(&self.endpoint)
            .query(&[("steamId", steam_id)])
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                proxy: proxy.to_string(),
                message: e.to_string(),
            })?;

        if response.status() != StatusCode::OK {
            return Err(FetchError::Status {
                proxy: proxy.to_string(),
                status: response.status().as_u16(),
            });
        }

        response.json::<Value>().await.map_err(|e| FetchError::Decode {
            proxy: proxy.to_string(),
            message: e.to_string(),
        })
    }
}

/// Runs the attempt-cycle protocol for single identifiers
///
/// Each cycle walks the pool in order and moves on at the first failure of a
/// proxy. The first usable response ends the whole protocol. After a cycle
/// without one the fetcher reports the failure and waits for the cooldown
/// before starting over from the first proxy.
#[derive(Clone)]
pub struct InventoryFetcher {
    config: FetcherConfig,
    pool: Arc<ProxyPool>,
    transport: Arc<dyn InventoryTransport>,
    status: Arc<dyn StatusSink>,
}

impl InventoryFetcher {
    /// Create a fetcher that talks HTTP through the pool
    pub fn new(config: FetcherConfig, pool: Arc<ProxyPool>, status: Arc<dyn StatusSink>) -> Self {
        let transport = Arc::new(HttpTransport::from_config(&config));
        Self::with_transport(config, pool, transport, status)
    }

    /// Create a fetcher with a custom transport
    pub fn with_transport(
        config: FetcherConfig,
        pool: Arc<ProxyPool>,
        transport: Arc<dyn InventoryTransport>,
        status: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            config,
            pool,
            transport,
            status,
        }
    }

    /// Fetch the inventory payload for one identifier
    pub async fn fetch(&self, steam_id: &str, cancel: &CancellationToken) -> FetchOutcome {
        let mut attempt = 0;

        while attempt < self.config.max_attempts {
            for proxy in self.pool.iter() {
                if cancel.is_cancelled() {
                    return FetchOutcome::Cancelled;
                }

                let reply = tokio::select! {
                    _ = cancel.cancelled() => return FetchOutcome::Cancelled,
                    reply = self.transport.get_inventory(proxy, steam_id) => reply,
                };

                match reply {
                    Ok(body) if is_pending(&body) => {
                        debug!(steam_id, proxy = %proxy, "Inventory still processing upstream");
                    }
                    Ok(body) => return FetchOutcome::Success(body),
                    Err(e) => {
                        debug!(steam_id, proxy = %proxy, error = %e, "Request attempt failed");
                        self.status.report_status(&describe_failure(&e));
                    }
                }
            }

            attempt += 1;
            warn!(steam_id, attempt, "Attempt cycle failed");
            self.status.report_status(&format!(
                "Failed to get data for SteamID {}, attempt {}. Waiting {} seconds...",
                steam_id,
                attempt,
                self.config.cooldown.as_secs()
            ));

            tokio::select! {
                _ = cancel.cancelled() => return FetchOutcome::Cancelled,
                _ = tokio::time::sleep(self.config.cooldown) => {}
            }
        }

        FetchOutcome::Exhausted
    }
}

/// A body that does not decode is never pending; RecordBuilder deals with it
fn is_pending(body: &Value) -> bool {
    InventoryResponse::deserialize(body).is_ok_and(|response| response.is_pending())
}

fn describe_failure(error: &FetchError) -> String {
    match error {
        FetchError::Status { proxy, status } => format!(
            "Error getting inventory data with proxy: {} - Status: {}",
            proxy, status
        ),
        FetchError::Transport { proxy, message } => {
            format!("Proxy error: {} for proxy: {}", message, proxy)
        }
        other => format!("Error during request: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::ProxyType;
    use crate::status::testing::RecordingSink;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Transport that replays a script and records which proxies were used
    #[derive(Default)]
    struct ScriptedTransport {
        replies: Mutex<VecDeque<Result<Value, FetchError>>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(replies: Vec<Result<Value, FetchError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl InventoryTransport for ScriptedTransport {
        async fn get_inventory(
            &self,
            proxy: &ProxyDescriptor,
            _steam_id: &str,
        ) -> Result<Value, FetchError> {
            self.calls.lock().unwrap().push(proxy.address());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| {
                    Err(FetchError::Status {
                        proxy: proxy.to_string(),
                        status: 503,
                    })
                })
        }
    }

    fn pool_of(size: usize) -> Arc<ProxyPool> {
        let proxies = (1..=size)
            .map(|i| ProxyDescriptor::new(format!("10.0.0.{}", i), 8080, ProxyType::Http))
            .collect();
        Arc::new(ProxyPool::from_proxies(proxies).unwrap())
    }

    fn fetcher(
        pool_size: usize,
        transport: Arc<ScriptedTransport>,
        sink: Arc<RecordingSink>,
    ) -> InventoryFetcher {
        InventoryFetcher::with_transport(FetcherConfig::default(), pool_of(pool_size), transport, sink)
    }

    fn ok_body() -> Value {
        json!({"success": true, "data": {"isWaiting": false, "inventory": []}})
    }

    fn waiting_body() -> Value {
        json!({"success": true, "data": {"isWaiting": true}})
    }

    #[test]
    fn test_fetcher_config_default() {
        let config = FetcherConfig::default();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.cooldown, Duration::from_secs(7));
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_fetcher_config_builder() {
        let config = FetcherConfig::new()
            .with_max_attempts(2)
            .with_timeout(Duration::from_secs(5))
            .with_cooldown(Duration::from_millis(10))
            .with_endpoint("http://localhost:9000/search".to_string());
        assert_eq!(config.max_attempts, 2);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.cooldown, Duration::from_millis(10));
        assert_eq!(config.endpoint, "http://localhost:9000/search");
    }

    #[test]
    fn test_is_pending() {
        assert!(is_pending(&waiting_body()));
        assert!(!is_pending(&ok_body()));
        assert!(!is_pending(&json!({"success": false, "data": {"isWaiting": true}})));
        assert!(!is_pending(&json!({})));
        // Wrong shapes never count as still processing
        assert!(!is_pending(&json!({"success": "yes", "data": {"isWaiting": true}})));
        assert!(!is_pending(&json!([1, 2, 3])));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_after_five_cycles_over_two_proxies() {
        let transport = Arc::new(ScriptedTransport::default());
        let sink = Arc::new(RecordingSink::default());
        let fetcher = fetcher(2, Arc::clone(&transport), Arc::clone(&sink));

        let start = Instant::now();
        let outcome = fetcher.fetch("76561198000000001", &CancellationToken::new()).await;

        assert_eq!(outcome, FetchOutcome::Exhausted);
        let calls = transport.calls();
        assert_eq!(calls.len(), 10);
        assert_eq!(&calls[..2], ["10.0.0.1:8080", "10.0.0.2:8080"]);

        // One cooldown after each failed cycle
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(35), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(36), "elapsed {:?}", elapsed);

        let waits = sink
            .lines()
            .into_iter()
            .filter(|line| line.contains("Waiting 7 seconds"))
            .count();
        assert_eq!(waits, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_usable_response_wins() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Err(FetchError::Transport {
                proxy: "http://10.0.0.1:8080".to_string(),
                message: "connection refused".to_string(),
            }),
            Ok(ok_body()),
        ]));
        let sink = Arc::new(RecordingSink::default());
        let fetcher = fetcher(3, Arc::clone(&transport), Arc::clone(&sink));

        let start = Instant::now();
        let outcome = fetcher.fetch("76561198000000001", &CancellationToken::new()).await;

        assert_eq!(outcome, FetchOutcome::Success(ok_body()));
        assert_eq!(transport.calls(), ["10.0.0.1:8080", "10.0.0.2:8080"]);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(sink.lines().len(), 1);
        assert!(sink.lines()[0].contains("connection refused"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiting_response_moves_to_next_proxy_then_cycles_back() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(waiting_body()),
            Ok(waiting_body()),
            Ok(ok_body()),
        ]));
        let sink = Arc::new(RecordingSink::default());
        let fetcher = fetcher(2, Arc::clone(&transport), Arc::clone(&sink));

        let start = Instant::now();
        let outcome = fetcher.fetch("76561198000000001", &CancellationToken::new()).await;

        assert_eq!(outcome, FetchOutcome::Success(ok_body()));
        assert_eq!(
            transport.calls(),
            ["10.0.0.1:8080", "10.0.0.2:8080", "10.0.0.1:8080"]
        );
        assert_eq!(start.elapsed(), Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsuccessful_waiting_body_is_returned() {
        let body = json!({"success": false, "data": {"isWaiting": true}});
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(body.clone())]));
        let sink = Arc::new(RecordingSink::default());
        let fetcher = fetcher(2, Arc::clone(&transport), sink);

        let outcome = fetcher.fetch("76561198000000001", &CancellationToken::new()).await;
        assert_eq!(outcome, FetchOutcome::Success(body));
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start_issues_no_request() {
        let transport = Arc::new(ScriptedTransport::default());
        let sink = Arc::new(RecordingSink::default());
        let fetcher = fetcher(2, Arc::clone(&transport), sink);

        let cancel = CancellationToken::new();
        cancel.cancel();

        assert_eq!(fetcher.fetch("76561198000000001", &cancel).await, FetchOutcome::Cancelled);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_cooldown() {
        let transport = Arc::new(ScriptedTransport::default());
        let sink = Arc::new(RecordingSink::default());
        let fetcher = fetcher(2, Arc::clone(&transport), sink);

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        let outcome = fetcher.fetch("76561198000000001", &cancel).await;

        assert_eq!(outcome, FetchOutcome::Cancelled);
        assert_eq!(transport.calls().len(), 2);
        assert!(start.elapsed() < Duration::from_secs(7));
    }
}
