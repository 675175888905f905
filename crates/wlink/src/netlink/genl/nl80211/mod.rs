//! nl80211 (802.11 configuration) via Generic Netlink.
//!
//! Only the wiphy query and the scan workflow are implemented. A scan is:
//!
//! 1. resolve the interface index
//! 2. join the family's `"scan"` multicast group
//! 3. send `NL80211_CMD_TRIGGER_SCAN`
//! 4. wait for `NL80211_CMD_NEW_SCAN_RESULTS` (or an error / abort)
//! 5. leave the group and dump `NL80211_CMD_GET_SCAN`
//!
//! # Example
//!
//! ```rust,no_run
//! use tokio_stream::StreamExt;
//! use wlink::netlink::genl::nl80211::Nl80211Connection;
//!
//! # async fn example() -> wlink::Result<()> {
//! let conn = Nl80211Connection::new().await?;
//! let mut networks = conn.scan("wlan0", None);
//!
//! while let Some(network) = networks.next().await {
//!     let network = network?;
//!     println!("{} {}", network.bssid, network.ssid);
//! }
//! # Ok(())
//! # }
//! ```

mod connection;
mod scan;
mod stream;
mod types;

pub use connection::Nl80211Connection;
pub use scan::{DEFAULT_SCAN_TIMEOUT, ScanConfig, ScanOutcome, ScanState, Scanner};
pub use stream::ScanStream;
pub use types::{Bss, ScanResult, TriggerScanRequest, TriggerScanStatus, Wiphy};

/// nl80211 Generic Netlink family name.
pub const NL80211_GENL_NAME: &str = "nl80211";

/// nl80211 Generic Netlink version.
pub const NL80211_GENL_VERSION: u8 = 0;

/// nl80211 multicast group names.
pub mod mcast {
    pub const CONFIG: &str = "config";
    pub const SCAN: &str = "scan";
    pub const REGULATORY: &str = "regulatory";
    pub const MLME: &str = "mlme";
    pub const VENDOR: &str = "vendor";
}

/// nl80211 commands (subset).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nl80211Cmd {
    Unspec = 0,
    GetWiphy = 1,
    SetWiphy = 2,
    NewWiphy = 3,
    DelWiphy = 4,
    GetInterface = 5,
    SetInterface = 6,
    NewInterface = 7,
    DelInterface = 8,
    GetScan = 32,
    TriggerScan = 33,
    NewScanResults = 34,
    ScanAborted = 35,
}

impl Nl80211Cmd {
    /// Map a raw command byte.
    pub fn from_u8(cmd: u8) -> Option<Self> {
        Some(match cmd {
            0 => Self::Unspec,
            1 => Self::GetWiphy,
            2 => Self::SetWiphy,
            3 => Self::NewWiphy,
            4 => Self::DelWiphy,
            5 => Self::GetInterface,
            6 => Self::SetInterface,
            7 => Self::NewInterface,
            8 => Self::DelInterface,
            32 => Self::GetScan,
            33 => Self::TriggerScan,
            34 => Self::NewScanResults,
            35 => Self::ScanAborted,
            _ => return None,
        })
    }
}

/// nl80211 top-level attributes (subset).
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nl80211Attr {
    Unspec = 0,
    Wiphy = 1,
    WiphyName = 2,
    Ifindex = 3,
    Ifname = 4,
    Iftype = 5,
    Mac = 6,
    MaxNumScanSsids = 43,
    ScanFrequencies = 44,
    ScanSsids = 45,
    Generation = 46,
    Bss = 47,
    MaxScanIeLen = 56,
    Wdev = 153,
    SplitWiphyDump = 174,
}

/// Attributes nested in `NL80211_ATTR_BSS`.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BssAttr {
    Invalid = 0,
    Bssid = 1,
    Frequency = 2,
    Tsf = 3,
    BeaconInterval = 4,
    Capability = 5,
    InformationElements = 6,
    SignalMbm = 7,
    SignalUnspec = 8,
    Status = 9,
    SeenMsAgo = 10,
    BeaconIes = 11,
}

/// `NL80211_BSS_STATUS_*`: our relation to a BSS.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BssStatus {
    Authenticated = 0,
    Associated = 1,
    IbssJoined = 2,
}

impl BssStatus {
    pub fn from_u32(status: u32) -> Option<Self> {
        match status {
            0 => Some(Self::Authenticated),
            1 => Some(Self::Associated),
            2 => Some(Self::IbssJoined),
            _ => None,
        }
    }
}
