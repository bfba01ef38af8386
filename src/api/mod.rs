//! Trading terminal access: the broker capability and its HTTP bridge client.

mod bridge_client;
mod broker;
mod types;

pub use bridge_client::{BridgeClient, DEFAULT_BRIDGE_URL};
pub use broker::{Broker, Credentials};
