//! Instrument metadata and the pip-size naming heuristic.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Symbol properties reported by the terminal's market watch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub name: String,

    /// Whether the symbol is shown in market watch (and therefore tradable)
    #[serde(default)]
    pub visible: bool,

    #[serde(default)]
    pub digits: u32,

    #[serde(default)]
    pub point: f64,
}

/// Pip size for a symbol, derived from its name.
///
/// Yen-quoted pairs move in 0.01 pips, everything else in 0.0001. This is a
/// naming convention only; metals and crypto get the FX value too.
pub fn pip_size(symbol: &str) -> Decimal {
    if symbol.contains("JPY") {
        dec!(0.01)
    } else {
        dec!(0.0001)
    }
}
