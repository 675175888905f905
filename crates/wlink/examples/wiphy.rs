//! List wireless PHYs and their scan limits.
//!
//! Run with: cargo run -p wlink --example wiphy

use wlink::netlink::genl::nl80211::Nl80211Connection;

#[tokio::main]
async fn main() -> wlink::Result<()> {
    let conn = match Nl80211Connection::new().await {
        Ok(conn) => conn,
        Err(e) if e.is_not_found() => {
            eprintln!("nl80211 is not available (is cfg80211 loaded?)");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let family = conn.family();
    println!(
        "nl80211: id {} version {} ({} operations)",
        family.id,
        family.version,
        family.operations.len()
    );
    for group in &family.mcast_groups {
        println!("  group {:<12} {}", group.name, group.id);
    }
    println!();

    for wiphy in conn.get_wiphys().await? {
        println!("phy#{} {}", wiphy.index, wiphy.name);
        if let Some(n) = wiphy.max_scan_ssids {
            println!("  max scan SSIDs: {}", n);
        }
        if let Some(n) = wiphy.max_scan_ie_len {
            println!("  max scan IE length: {}", n);
        }
    }

    Ok(())
}
