//! Trading configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Configuration for risk, position sizing and order construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    /// Fraction of balance put at risk per trade (0.0 to 1.0)
    pub risk_pct: Decimal,

    /// Stop-loss distance from entry in pips
    pub stop_loss_pips: Decimal,

    /// Take-profit distance from entry in pips
    pub take_profit_pips: Decimal,

    /// Scales the computed lot size
    pub volume_multiplier: Decimal,

    /// Smallest volume the broker accepts, in lots
    pub min_volume: Decimal,

    /// Units of base currency per lot
    pub contract_size: Decimal,

    /// Maximum accepted slippage in points
    pub deviation: u32,

    /// Expert id stamped on every order
    pub magic: u64,

    /// Order comment
    pub comment: String,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            risk_pct: dec!(0.23),           // 23% of balance per trade
            stop_loss_pips: dec!(15),
            take_profit_pips: dec!(20),
            volume_multiplier: dec!(1.0),
            min_volume: dec!(0.01),
            contract_size: dec!(100000),    // Standard lot
            deviation: 20,
            magic: 123456,
            comment: "20 Pips Challenge".to_string(),
        }
    }
}
