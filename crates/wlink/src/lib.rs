//! Async nl80211 library for Wi-Fi scanning on Linux.
//!
//! This crate speaks Netlink and Generic Netlink directly: it frames
//! datagrams, encodes and decodes nested attributes through static record
//! tables, resolves the dynamically assigned nl80211 family, and drives the
//! trigger/wait/dump scan workflow over the family's multicast group.
//!
//! # Features
//!
//! - `output` - JSON/text output formatting (serde)
//! - `integration` - Enables the root-only integration tests
//!
//! # Example
//!
//! ```rust,no_run
//! use tokio_stream::StreamExt;
//! use wlink::netlink::genl::nl80211::{Nl80211Connection, ScanConfig};
//!
//! #[tokio::main]
//! async fn main() -> wlink::Result<()> {
//!     let conn = Nl80211Connection::new().await?;
//!     let mut networks = conn.scan_with(ScanConfig::new("wlan0").frequency(2437));
//!
//!     while let Some(network) = networks.next().await {
//!         let network = network?;
//!         println!("{} {:>4} {}", network.bssid, network.signal_dbm.unwrap_or(0), network.ssid);
//!     }
//!
//!     Ok(())
//! }
//! ```

// Core modules (always available)
pub mod netlink;
pub mod util;
pub mod wlan;

#[cfg(feature = "output")]
pub mod output;

// Re-export common types at crate root for convenience
pub use netlink::{Error, Result};
pub use wlan::{Bssid, Network, Ssid};
