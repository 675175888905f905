//! Generic Netlink (GENL) support.
//!
//! nl80211 has no fixed message type. The kernel assigns its ID when the
//! module loads, so it is looked up by name through the controller family
//! (`nlctrl`, ID 0x10). The reply also lists the family's operations and its
//! multicast groups (`scan`, `mlme`, ...) with their numeric IDs.
//!
//! ```text
//! Scanner ─▶ Nl80211Connection ─▶ GenlConnection ─▶ Transport
//!                                  (family cache)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use wlink::netlink::genl::GenlConnection;
//!
//! # async fn example() -> wlink::Result<()> {
//! let mut conn = GenlConnection::new()?;
//!
//! let family = conn.get_family("nl80211").await?;
//! println!("nl80211 family ID: {}", family.id);
//! # Ok(())
//! # }
//! ```

mod connection;
mod family;
mod header;

pub use connection::GenlConnection;
pub use family::{FamilyController, McastGroup, Operation};
pub use header::{GENL_HDRLEN, GenlMessage, GenlMsgHdr, split_payload};

pub mod nl80211;

/// Fixed ID of the controller family (`nlctrl`).
pub const GENL_ID_CTRL: u16 = 0x10;

/// Controller interface version.
pub const CTRL_VERSION: u8 = 1;

/// Controller commands used for family resolution.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlCmd {
    /// Reply carrying a family description.
    NewFamily = 1,
    /// Look a family up by name or ID.
    GetFamily = 3,
}

/// Top-level attributes of a family description.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlAttr {
    FamilyId = 1,
    FamilyName = 2,
    Version = 3,
    HdrSize = 4,
    MaxAttr = 5,
    /// Nested array of [`CtrlAttrOp`] records.
    Ops = 6,
    /// Nested array of [`CtrlAttrMcastGrp`] records.
    McastGroups = 7,
}

/// Attributes of one entry in [`CtrlAttr::Ops`].
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlAttrOp {
    Id = 1,
    Flags = 2,
}

/// Attributes of one entry in [`CtrlAttr::McastGroups`].
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlAttrMcastGrp {
    Name = 1,
    Id = 2,
}
