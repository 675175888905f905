//! Scan for Wi-Fi networks via nl80211.
//!
//! Run with: sudo cargo run -p wlink --example scan -- wlan0 [ssid]
//!
//! Triggering a scan needs CAP_NET_ADMIN. Press Ctrl-C to stop waiting.

use tokio_stream::StreamExt;
use wlink::netlink::genl::nl80211::Nl80211Connection;
use wlink::util::ifname;

#[tokio::main]
async fn main() -> wlink::Result<()> {
    let mut args = std::env::args().skip(1);
    let interface = match args.next() {
        Some(name) => name,
        None => match ifname::list_wireless_interfaces()?.into_iter().next() {
            Some(name) => name,
            None => {
                eprintln!("No wireless interface found.");
                return Ok(());
            }
        },
    };
    let ssid = args
        .next()
        .map(|s| s.parse())
        .transpose()
        .map_err(|e| wlink::Error::InvalidArgument(format!("{e}")))?;

    let conn = match Nl80211Connection::new().await {
        Ok(conn) => conn,
        Err(e) => {
            eprintln!("Failed to resolve nl80211: {}", e);
            eprintln!("Make sure the cfg80211 kernel module is loaded.");
            return Ok(());
        }
    };

    println!("=== Scanning on {} ===\n", interface);

    let mut networks = conn.scan(&interface, ssid);
    let token = networks.cancellation_token();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        token.cancel();
    });

    let mut count = 0;
    while let Some(network) = networks.next().await {
        match network {
            Ok(network) => {
                count += 1;
                println!(
                    "{}  {:>5}  {:>4}  {}",
                    network.bssid,
                    network.frequency.map(|f| f.to_string()).unwrap_or_default(),
                    network.signal_dbm.map(|s| s.to_string()).unwrap_or_default(),
                    network.ssid
                );
            }
            Err(e) if e.is_permission_denied() => {
                eprintln!("Permission denied. Try running as root.");
                return Ok(());
            }
            Err(e) => return Err(e),
        }
    }

    println!("\n{} networks", count);
    Ok(())
}
