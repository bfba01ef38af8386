//! Market order request sent to the terminal and the result it reports.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Retcode the terminal reports for a filled request.
pub const RETCODE_DONE: u32 = 10009;

/// Direction of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }

    /// Map an aggregated vote to a side. A zero vote has no side.
    pub fn from_vote(vote: i8) -> Option<Self> {
        match vote {
            1 => Some(OrderSide::Buy),
            -1 => Some(OrderSide::Sell),
            _ => None,
        }
    }

    /// +1 for buys, -1 for sells.
    pub fn sign(&self) -> Decimal {
        match self {
            OrderSide::Buy => Decimal::ONE,
            OrderSide::Sell => Decimal::NEGATIVE_ONE,
        }
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trade action of a request. Only immediate market deals are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Deal,
}

/// Order lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderTime {
    /// Good-til-cancelled
    Gtc,
}

/// Fill policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderFilling {
    /// Immediate-or-cancel
    Ioc,
}

/// A fully specified market order, built once per accepted candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Client-generated id so the bridge can drop a resent request
    pub client_order_id: String,

    pub action: TradeAction,
    pub symbol: String,

    /// Volume in lots
    #[serde(with = "rust_decimal::serde::float")]
    pub volume: Decimal,

    #[serde(rename = "type")]
    pub side: OrderSide,

    /// Requested entry price
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Stop-loss price
    #[serde(with = "rust_decimal::serde::float")]
    pub sl: Decimal,

    /// Take-profit price
    #[serde(with = "rust_decimal::serde::float")]
    pub tp: Decimal,

    /// Maximum price deviation in points
    pub deviation: u32,

    /// Expert id stamped on the resulting position
    pub magic: u64,

    pub comment: String,
    pub type_time: OrderTime,
    pub type_filling: OrderFilling,
}

/// Result of an order submission. Advisory only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResult {
    pub retcode: u32,

    #[serde(default)]
    pub comment: String,

    /// Order ticket, if one was created
    #[serde(default)]
    pub order: Option<u64>,

    /// Deal ticket, if the order was filled
    #[serde(default)]
    pub deal: Option<u64>,
}

impl OrderResult {
    pub fn is_done(&self) -> bool {
        self.retcode == RETCODE_DONE
    }
}
