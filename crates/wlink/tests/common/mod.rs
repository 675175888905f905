//! Common test utilities for integration tests.
//!
//! Helpers to find a wireless interface and macros that skip tests the host
//! cannot run.

use wlink::netlink::genl::GenlConnection;
use wlink::util::ifname;

/// Check if running as root.
pub fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

/// First wireless interface on this host, if any.
pub fn wireless_interface() -> Option<String> {
    ifname::list_wireless_interfaces()
        .ok()
        .and_then(|names| names.into_iter().next())
}

/// Whether the kernel has nl80211 registered (cfg80211 loaded).
pub async fn has_nl80211() -> bool {
    let Ok(conn) = GenlConnection::new() else {
        return false;
    };
    conn.resolve("nl80211").await.is_ok()
}

/// Skip the test if not running as root.
///
/// Use this at the beginning of integration tests that require root privileges.
#[macro_export]
macro_rules! require_root {
    () => {
        if !crate::common::is_root() {
            eprintln!("Skipping test: requires root");
            return Ok(());
        }
    };
}

/// Skip the test unless nl80211 is available.
#[macro_export]
macro_rules! require_nl80211 {
    () => {
        if !crate::common::has_nl80211().await {
            eprintln!("Skipping test: nl80211 not available");
            return Ok(());
        }
    };
}

/// Bind the first wireless interface name or skip the test.
#[macro_export]
macro_rules! require_wireless {
    () => {
        match crate::common::wireless_interface() {
            Some(name) => name,
            None => {
                eprintln!("Skipping test: no wireless interface");
                return Ok(());
            }
        }
    };
}
