//! Netlink message header and parsing.

use super::attr::AttrIter;
use super::error::FramingError;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Netlink message header alignment.
pub const NLMSG_ALIGNTO: usize = 4;

/// Align a length to NLMSG_ALIGNTO boundary.
#[inline]
pub const fn nlmsg_align(len: usize) -> usize {
    (len + NLMSG_ALIGNTO - 1) & !(NLMSG_ALIGNTO - 1)
}

/// Size of the netlink message header.
pub const NLMSG_HDRLEN: usize = nlmsg_align(std::mem::size_of::<NlMsgHdr>());

/// Netlink message header (mirrors struct nlmsghdr).
#[repr(C)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
pub struct NlMsgHdr {
    /// Length of message including header.
    pub nlmsg_len: u32,
    /// Message type.
    pub nlmsg_type: u16,
    /// Additional flags.
    pub nlmsg_flags: u16,
    /// Sequence number.
    pub nlmsg_seq: u32,
    /// Sending process port ID.
    pub nlmsg_pid: u32,
}

impl NlMsgHdr {
    /// Create a new message header.
    pub fn new(msg_type: u16, flags: u16) -> Self {
        Self {
            nlmsg_len: NLMSG_HDRLEN as u32,
            nlmsg_type: msg_type,
            nlmsg_flags: flags,
            nlmsg_seq: 0,
            nlmsg_pid: 0,
        }
    }

    /// Check if this is an error message.
    pub fn is_error(&self) -> bool {
        self.nlmsg_type == NlMsgType::ERROR
    }

    /// Check if this is a done message.
    pub fn is_done(&self) -> bool {
        self.nlmsg_type == NlMsgType::DONE
    }

    /// Check if this message has the multi flag.
    pub fn is_multi(&self) -> bool {
        self.nlmsg_flags & NLM_F_MULTI != 0
    }

    /// Convert header to bytes.
    pub fn as_bytes(&self) -> &[u8] {
        <Self as IntoBytes>::as_bytes(self)
    }

    /// Parse header from bytes. No alignment requirement on `data`.
    pub fn from_bytes(data: &[u8]) -> Result<Self, FramingError> {
        Self::read_from_prefix(data)
            .map(|(hdr, _)| hdr)
            .map_err(|_| FramingError::Truncated { offset: 0 })
    }

    /// Frame `payload` behind this header.
    ///
    /// `nlmsg_len` is recomputed from the payload; the payload must already
    /// contain whatever padding its own sub-headers need.
    pub fn encode(&self, payload: &[u8]) -> Vec<u8> {
        let header = Self {
            nlmsg_len: (NLMSG_HDRLEN + payload.len()) as u32,
            ..*self
        };
        let mut buf = Vec::with_capacity(NLMSG_HDRLEN + payload.len());
        buf.extend_from_slice(header.as_bytes());
        buf.extend_from_slice(payload);
        buf
    }
}

/// Control message types below the first family ID.
pub struct NlMsgType;

impl NlMsgType {
    /// Error message or ACK.
    pub const ERROR: u16 = 2;
    /// End of multipart message.
    pub const DONE: u16 = 3;
}

/// Message is a request.
pub const NLM_F_REQUEST: u16 = 0x01;
/// Part of a multipart reply; ends with `NLMSG_DONE`.
pub const NLM_F_MULTI: u16 = 0x02;
/// Dump was inconsistent because the data changed while it ran.
pub const NLM_F_DUMP_INTR: u16 = 0x10;
/// Return every object (`NLM_F_ROOT | NLM_F_MATCH`).
pub const NLM_F_DUMP: u16 = 0x300;

/// Iterator over netlink messages in a buffer.
///
/// Messages decoded before a framing error are still yielded; the error is
/// yielded once and iteration stops.
pub struct MessageIter<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> MessageIter<'a> {
    /// Create a new message iterator.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn fail(&mut self, err: FramingError) -> Option<<Self as Iterator>::Item> {
        self.data = &[];
        Some(Err(err))
    }
}

impl<'a> Iterator for MessageIter<'a> {
    type Item = Result<(NlMsgHdr, &'a [u8]), FramingError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.is_empty() {
            return None;
        }

        let offset = self.offset;
        let Ok(header) = NlMsgHdr::from_bytes(self.data) else {
            return self.fail(FramingError::Truncated { offset });
        };

        let msg_len = header.nlmsg_len as usize;
        if msg_len < NLMSG_HDRLEN || msg_len > self.data.len() {
            return self.fail(FramingError::InvalidLength {
                offset,
                length: msg_len,
            });
        }

        let payload = &self.data[NLMSG_HDRLEN..msg_len];
        let aligned_len = nlmsg_align(msg_len).min(self.data.len());

        // Move to next message
        self.data = &self.data[aligned_len..];
        self.offset += aligned_len;

        Some(Ok((header, payload)))
    }
}

/// Decode every message in a receive buffer.
///
/// Returns the messages decoded so far together with the framing error that
/// stopped decoding, if any.
pub fn decode_all(data: &[u8]) -> (Vec<(NlMsgHdr, &[u8])>, Option<FramingError>) {
    let mut messages = Vec::new();
    for result in MessageIter::new(data) {
        match result {
            Ok(msg) => messages.push(msg),
            Err(e) => return (messages, Some(e)),
        }
    }
    (messages, None)
}

/// Netlink error message (`NLMSG_ERROR`).
///
/// `errno` is negative on failure and 0 for an acknowledgement. The kernel
/// echoes the request header (and possibly its payload) after the errno.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorMessage {
    /// Header of the error message itself.
    pub header: NlMsgHdr,
    /// Error code (negative errno or 0 for ACK).
    pub errno: i32,
    /// Header of the request this message answers.
    pub request: Option<NlMsgHdr>,
}

impl ErrorMessage {
    /// Size of the errno field.
    pub const ERRNO_LEN: usize = 4;

    /// Parse error message from an `NLMSG_ERROR` payload.
    pub fn parse(header: NlMsgHdr, payload: &[u8]) -> Result<Self, FramingError> {
        let errno = payload
            .get(..Self::ERRNO_LEN)
            .and_then(|b| <[u8; 4]>::try_from(b).ok())
            .map(i32::from_ne_bytes)
            .ok_or(FramingError::ShortPayload {
                what: "error message",
                expected: Self::ERRNO_LEN,
                actual: payload.len(),
            })?;
        let request = NlMsgHdr::from_bytes(&payload[Self::ERRNO_LEN..]).ok();
        Ok(Self {
            header,
            errno,
            request,
        })
    }

    /// Check if this is an ACK (no error).
    pub fn is_ack(&self) -> bool {
        self.errno == 0
    }

    /// Get attributes after the echoed request (extended ACK).
    pub fn attrs<'a>(&self, payload: &'a [u8]) -> AttrIter<'a> {
        let offset = Self::ERRNO_LEN + NLMSG_HDRLEN;
        AttrIter::new(payload.get(offset..).unwrap_or(&[]))
    }
}
