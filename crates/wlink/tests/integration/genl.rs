//! Generic Netlink family resolution against the running kernel.

use wlink::netlink::genl::GenlConnection;
use wlink::netlink::{NetlinkSocket, TransportError};
use wlink::{Error, Result};

#[tokio::test]
async fn test_resolve_nlctrl() -> Result<()> {
    // the controller describes itself, so this works on every kernel
    let conn = GenlConnection::new()?;
    let family = conn.resolve("nlctrl").await?;

    assert_eq!(family.id, 0x10);
    assert_eq!(family.name, "nlctrl");
    assert!(family.mcast_group("notify").is_some());
    Ok(())
}

#[tokio::test]
async fn test_unknown_family() -> Result<()> {
    let conn = GenlConnection::new()?;
    let err = conn.resolve("wlink-no-such-family").await.unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn test_resolve_is_idempotent() -> Result<()> {
    require_nl80211!();

    let conn = GenlConnection::new()?;
    let first = conn.resolve("nl80211").await?;
    let second = conn.resolve("nl80211").await?;
    assert_eq!(first, second);
    assert!(first.mcast_group("scan").is_some());
    Ok(())
}

#[tokio::test]
async fn test_reply_larger_than_buffer_is_reported() -> Result<()> {
    let socket = NetlinkSocket::new()?.with_recv_buffer(64);
    let conn = GenlConnection::from_transport(socket);

    let err = conn.resolve("nlctrl").await.unwrap_err();
    assert!(
        matches!(
            err,
            Error::Transport(TransportError::Truncated { capacity, len }) if capacity >= 64 && len > capacity
        ),
        "unexpected error: {err:?}"
    );
    Ok(())
}
