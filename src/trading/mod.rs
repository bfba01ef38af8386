//! Trading logic: signals and voting, position sizing, order construction.

mod config;
mod orders;
mod position_sizer;
mod strategy;

pub use config::TradingConfig;
pub use orders::OrderBuilder;
pub use position_sizer::PositionSizer;
pub use strategy::{select_best, Candidate, Strategy, StrategyConfig};
