//! Request and response bodies of the terminal bridge.

use serde::{Deserialize, Serialize};

/// Body of `POST /connect`.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectRequest<'a> {
    pub login: u64,
    pub password: &'a str,
    pub server: &'a str,
}

/// Body of `POST /symbols/{symbol}/select`.
#[derive(Debug, Clone, Serialize)]
pub struct SelectRequest {
    pub enable: bool,
}

/// Query of `GET /rates/{symbol}`.
#[derive(Debug, Clone, Serialize)]
pub struct RatesParams<'a> {
    pub timeframe: &'a str,
    pub count: usize,
}

/// Generic success flag returned by session and selection calls.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub success: bool,

    /// Terminal's last error, when `success` is false
    #[serde(default)]
    pub error: Option<String>,
}
