//! IEEE 802.11 value types.
//!
//! These are independent of netlink: the nl80211 layer converts kernel BSS
//! records into [`Network`]s.

mod bssid;
pub mod ie;
mod network;
mod ssid;

pub use bssid::Bssid;
pub use ie::{InformationElement, parse_ies};
pub use network::{Network, frequency_to_channel};
pub use ssid::Ssid;

/// Invalid user-supplied identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("invalid BSSID: {0} (expected six colon-separated hex octets)")]
    InvalidBssid(String),

    #[error("SSID is {0} octets long (max 32)")]
    SsidTooLong(usize),
}
