//! HTTP client for the terminal bridge, a small JSON service that runs beside
//! the trading terminal and forwards calls to it.

use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::models::{AccountInfo, Bar, OrderRequest, OrderResult, Position, SymbolInfo, Timeframe};

use super::broker::{Broker, Credentials};
use super::types::*;

pub const DEFAULT_BRIDGE_URL: &str = "http://127.0.0.1:8228";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the terminal bridge.
pub struct BridgeClient {
    client: Client,
    base_url: String,
}

impl BridgeClient {
    /// Create a client for the bridge at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fail with status and body on a non-success response.
    async fn check(response: Response, what: &str) -> Result<Response> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(what, status, &body));
        }
        Ok(response)
    }

    async fn parse<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", what))
    }
}

fn status_error(what: &str, status: StatusCode, body: &str) -> anyhow::Error {
    anyhow::anyhow!("{} request failed: {} - {}", what, status, body)
}

/// Rates body: a bar array, or an empty body or `null` when the terminal
/// has no history yet.
fn decode_bars(body: &str) -> Result<Vec<Bar>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let bars: Option<Vec<Bar>> =
        serde_json::from_str(body).context("Failed to parse rates response")?;
    Ok(bars.unwrap_or_default())
}

impl Broker for BridgeClient {
    async fn connect(&self, credentials: &Credentials) -> Result<()> {
        let url = format!("{}/connect", self.base_url);
        debug!(url = %url, login = credentials.login, server = %credentials.server, "Connecting to terminal");

        let body = ConnectRequest {
            login: credentials.login,
            password: &credentials.password,
            server: &credentials.server,
        };
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to reach terminal bridge")?;

        let response = Self::check(response, "Connect").await?;
        let status: StatusResponse = Self::parse(response, "connect").await?;

        if !status.success {
            anyhow::bail!(
                "Terminal init failed: {}",
                status.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }
        Ok(())
    }

    async fn symbol_info(&self, symbol: &str) -> Result<Option<SymbolInfo>> {
        let url = format!("{}/symbols/{}", self.base_url, symbol);
        debug!(url = %url, "Fetching symbol info");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch symbol info")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check(response, "Symbol info").await?;
        Self::parse(response, "symbol info").await.map(Some)
    }

    async fn select_symbol(&self, symbol: &str) -> Result<bool> {
        let url = format!("{}/symbols/{}/select", self.base_url, symbol);
        debug!(url = %url, "Selecting symbol");

        let response = self
            .client
            .post(&url)
            .json(&SelectRequest { enable: true })
            .send()
            .await
            .context("Failed to select symbol")?;

        let response = Self::check(response, "Symbol select").await?;
        let status: StatusResponse = Self::parse(response, "symbol select").await?;
        Ok(status.success)
    }

    async fn fetch_bars(&self, symbol: &str, timeframe: Timeframe, count: usize) -> Result<Vec<Bar>> {
        let url = format!("{}/rates/{}", self.base_url, symbol);
        debug!(url = %url, timeframe = %timeframe, count = count, "Fetching rates");

        let response = self
            .client
            .get(&url)
            .query(&RatesParams {
                timeframe: timeframe.as_str(),
                count,
            })
            .send()
            .await
            .context("Failed to fetch rates")?;

        // The terminal answers "no history yet" with an empty body or a null
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        let response = Self::check(response, "Rates").await?;
        let body = response.text().await.context("Failed to read rates response")?;
        decode_bars(&body)
    }

    async fn account_info(&self) -> Result<Option<AccountInfo>> {
        let url = format!("{}/account", self.base_url);
        debug!(url = %url, "Fetching account info");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch account info")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check(response, "Account").await?;
        Self::parse(response, "account").await.map(Some)
    }

    async fn positions(&self) -> Result<Option<Vec<Position>>> {
        let url = format!("{}/positions", self.base_url);
        debug!(url = %url, "Fetching open positions");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch positions")?;

        // The terminal could not read its position list
        if !response.status().is_success() {
            return Ok(None);
        }
        Self::parse(response, "positions").await
    }

    async fn send_order(&self, request: &OrderRequest) -> Result<OrderResult> {
        let url = format!("{}/orders", self.base_url);
        debug!(
            url = %url,
            client_order_id = %request.client_order_id,
            symbol = %request.symbol,
            "Sending order"
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .context("Failed to send order")?;

        let response = Self::check(response, "Order").await?;
        Self::parse(response, "order").await
    }

    async fn shutdown(&self) -> Result<()> {
        let url = format!("{}/shutdown", self.base_url);
        debug!(url = %url, "Shutting down terminal session");

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .context("Failed to shut down terminal session")?;

        Self::check(response, "Shutdown").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalized() {
        let client = BridgeClient::new("http://localhost:8228/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8228");
    }

    #[test]
    fn test_rates_without_history_are_empty() {
        assert!(decode_bars("").unwrap().is_empty());
        assert!(decode_bars("null").unwrap().is_empty());
        assert!(decode_bars("[]").unwrap().is_empty());
    }

    #[test]
    fn test_rates_body_decodes_oldest_first() {
        let body = r#"[
            {"time":1700000000,"open":1.1,"high":1.2,"low":1.0,"close":1.15,"tick_volume":42,"spread":3,"real_volume":0},
            {"time":1700000900,"open":1.15,"high":1.25,"low":1.1,"close":1.2}
        ]"#;
        let bars = decode_bars(body).unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].time.timestamp(), 1_700_000_900);
        assert_eq!(bars[1].close, 1.2);
        assert_eq!(bars[1].tick_volume, 0);
    }

    #[test]
    fn test_malformed_rates_body_is_an_error() {
        let err = decode_bars(r#"{"error":"no symbol"}"#).unwrap_err();
        assert!(err.to_string().contains("rates"));
    }

    #[test]
    fn test_status_error_carries_status_and_body() {
        let err = status_error("Order", StatusCode::BAD_GATEWAY, "terminal offline");
        let message = err.to_string();

        assert!(message.starts_with("Order request failed"));
        assert!(message.contains("502"));
        assert!(message.contains("terminal offline"));
    }

    #[test]
    fn test_invalid_bridge_url_fails_before_sending() {
        // URL parsing fails inside reqwest, so no socket is opened
        let client = BridgeClient::new("not a url").unwrap();
        let result = tokio_test::block_on(client.account_info());

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to fetch account info"));
    }
}
