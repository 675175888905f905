//! Generic Netlink message header.
//!
//! GENL messages have an additional header after the standard netlink header:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ nlmsghdr (16 bytes)                     │
//! │   nlmsg_len, nlmsg_type (family_id),    │
//! │   nlmsg_flags, nlmsg_seq, nlmsg_pid     │
//! ├─────────────────────────────────────────┤
//! │ genlmsghdr (4 bytes)                    │
//! │   cmd (u8), version (u8), reserved (u16)│
//! ├─────────────────────────────────────────┤
//! │ Attributes (TLV format)                 │
//! └─────────────────────────────────────────┘
//! ```

use std::mem;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::netlink::attr::AttrIter;
use crate::netlink::error::FramingError;
use crate::netlink::message::NlMsgHdr;

/// Generic Netlink message header.
///
/// This header immediately follows the standard netlink header in GENL messages.
#[repr(C)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
pub struct GenlMsgHdr {
    /// Command identifier (family-specific)
    pub cmd: u8,
    /// Interface version
    pub version: u8,
    /// Reserved for future use
    pub reserved: u16,
}

/// Size of the GENL header in bytes.
pub const GENL_HDRLEN: usize = mem::size_of::<GenlMsgHdr>();

impl GenlMsgHdr {
    /// Create a new GENL header with the given command and version.
    #[inline]
    pub const fn new(cmd: u8, version: u8) -> Self {
        Self {
            cmd,
            version,
            reserved: 0,
        }
    }

    /// Read a header from the front of a netlink payload.
    ///
    /// Returns `None` if the slice is too short.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        Self::read_from_prefix(data).ok().map(|(hdr, _)| hdr)
    }

    /// Get the header as a byte slice.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        <Self as IntoBytes>::as_bytes(self)
    }
}

/// A decoded Generic Netlink message borrowed from a receive buffer.
#[derive(Debug, Clone, Copy)]
pub struct GenlMessage<'a> {
    /// Netlink header; `nlmsg_type` is the family id.
    pub header: NlMsgHdr,
    /// GENL sub-header.
    pub genl: GenlMsgHdr,
    /// Attribute stream following the sub-header.
    pub attrs: &'a [u8],
}

impl<'a> GenlMessage<'a> {
    /// Split a netlink payload into GENL header and attributes.
    pub fn parse(header: NlMsgHdr, payload: &'a [u8]) -> Result<Self, FramingError> {
        let (genl, attrs) = split_payload(payload)?;
        Ok(Self {
            header,
            genl,
            attrs,
        })
    }

    /// Family id this message belongs to.
    pub fn family(&self) -> u16 {
        self.header.nlmsg_type
    }

    /// Command carried in the GENL header.
    pub fn cmd(&self) -> u8 {
        self.genl.cmd
    }

    /// Iterate the top-level attributes.
    pub fn attr_iter(&self) -> AttrIter<'a> {
        AttrIter::new(self.attrs)
    }
}

/// Split a netlink payload into its GENL header and attribute stream.
pub fn split_payload(payload: &[u8]) -> Result<(GenlMsgHdr, &[u8]), FramingError> {
    let genl = GenlMsgHdr::from_bytes(payload).ok_or(FramingError::ShortPayload {
        what: "generic netlink header",
        expected: GENL_HDRLEN,
        actual: payload.len(),
    })?;
    Ok((genl, &payload[GENL_HDRLEN..]))
}
