//! Async netlink protocol implementation for Linux.
//!
//! Layers, bottom-up:
//!
//! - [`socket`]: the `NETLINK_GENERIC` socket behind the [`Transport`] trait
//! - [`message`]: `nlmsghdr` framing, multipart iteration, error messages
//! - [`attr`] and [`codec`]: TLV attributes and table-driven record codecs
//! - [`genl`]: Generic Netlink, family resolution and nl80211
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use wlink::netlink::genl::nl80211::Nl80211Connection;
//!
//! # async fn example() -> wlink::Result<()> {
//! let conn = Nl80211Connection::new().await?;
//! for wiphy in conn.get_wiphys().await? {
//!     println!("{}: max {:?} SSIDs per scan", wiphy.name, wiphy.max_scan_ssids);
//! }
//! # Ok(())
//! # }
//! ```

pub mod attr;
mod builder;
pub mod codec;
mod error;
#[cfg(test)]
mod fixtures;
pub mod genl;
pub mod message;
pub mod socket;

pub use attr::{AttrIter, Attribute, NestToken, NlAttr};
pub use builder::MessageBuilder;
pub use codec::{AttrRecord, AttrValue, Codec, FieldSpec, Fields};
pub use error::{
    AttributeError, Error, FramingError, ProtocolError, Result, ScanError, TransportError,
};
pub use message::{ErrorMessage, MessageIter, NLMSG_HDRLEN, NlMsgHdr, NlMsgType};
pub use socket::{DEFAULT_RECV_BUFFER, NetlinkSocket, Transport};
