//! Live price oracle client and best-effort batch resolver
//!
//! One leaderboard computation needs a mark price for every distinct pair
//! with an open position. Lookups are independent and independently
//! failable: the batch issues them all at once, waits for every one to
//! settle, and folds only the successes into the output map. A flaky
//! symbol costs itself, never the batch.

use futures::future::join_all;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_ORACLE_URL: &str = "http://localhost:9000/price";

/// Per-symbol lookup timeout; the aggregator itself imposes no deadline
const PRICE_TIMEOUT: Duration = Duration::from_secs(5);

/// A collaborator that can quote one symbol at a time
pub trait PriceSource {
    async fn get_price(&self, symbol: &str) -> Result<f64, String>;
}

/// Resolve live prices for a set of distinct symbols.
///
/// Settle-all join: every lookup runs concurrently, failures are logged
/// and dropped, and the map contains only symbols that resolved. Never
/// fails as a whole.
pub async fn resolve_prices<P: PriceSource>(
    source: &P,
    symbols: &[String],
) -> HashMap<String, f64> {
    let lookups = symbols.iter().map(|symbol| async move {
        let result = source.get_price(symbol).await;
        (symbol.clone(), result)
    });

    let mut prices = HashMap::new();
    for (symbol, result) in join_all(lookups).await {
        match result {
            Ok(price) => {
                debug!("Resolved {} = {}", symbol, price);
                prices.insert(symbol, price);
            }
            Err(e) => warn!("Price lookup failed for {}: {}", symbol, e),
        }
    }
    prices
}

#[derive(Debug, Deserialize)]
struct PriceResponse {
    price: f64,
}

/// HTTP client for the external price oracle
#[derive(Clone)]
pub struct OracleClient {
    client: reqwest::Client,
    base_url: String,
}

impl OracleClient {
    pub fn new() -> Self {
        let base_url =
            std::env::var("ORACLE_URL").unwrap_or_else(|_| DEFAULT_ORACLE_URL.to_string());
        Self::with_base_url(base_url)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for OracleClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceSource for OracleClient {
    async fn get_price(&self, symbol: &str) -> Result<f64, String> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("symbol", symbol)])
            .timeout(PRICE_TIMEOUT)
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        if !resp.status().is_success() {
            return Err(format!("Oracle returned {}", resp.status()));
        }

        let quote: PriceResponse = resp.json().await.map_err(|e| format!("Parse failed: {}", e))?;
        if quote.price <= 0.0 {
            return Err(format!("Non-positive price {} for {}", quote.price, symbol));
        }
        Ok(quote.price)
    }
}
