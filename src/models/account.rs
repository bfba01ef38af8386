//! Account and open-position snapshots reported by the terminal.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::OrderSide;

/// Trading account summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountInfo {
    pub login: u64,

    /// Balance in account currency, excluding floating P&L
    pub balance: Decimal,

    #[serde(default)]
    pub equity: Decimal,

    #[serde(default)]
    pub currency: String,
}

/// A position currently open at the broker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub ticket: u64,
    pub symbol: String,

    #[serde(rename = "type")]
    pub side: OrderSide,

    pub volume: Decimal,
    pub price_open: Decimal,

    #[serde(default)]
    pub sl: Decimal,

    #[serde(default)]
    pub tp: Decimal,

    /// Floating P&L in account currency
    #[serde(default)]
    pub profit: Decimal,

    #[serde(default)]
    pub magic: u64,
}
