//! Netlink attribute (nlattr) handling.
//!
//! ```text
//! ┌──────────┬──────────┬───────────────────────┬─────────┐
//! │ len: u16 │ type:u16 │ payload (len - 4)     │ padding │
//! └──────────┴──────────┴───────────────────────┴─────────┘
//! ```
//!
//! `len` covers header and payload but never the padding that aligns the
//! next attribute to [`NLA_ALIGNTO`].

use super::error::AttributeError;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Netlink attribute alignment.
pub const NLA_ALIGNTO: usize = 4;

/// Align a length to NLA_ALIGNTO boundary.
#[inline]
pub const fn nla_align(len: usize) -> usize {
    (len + NLA_ALIGNTO - 1) & !(NLA_ALIGNTO - 1)
}

/// Size of the attribute header.
pub const NLA_HDRLEN: usize = 4; // nla_align(size_of::<NlAttr>())

/// Netlink attribute header (mirrors struct nlattr).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NlAttr {
    /// Length including header.
    pub nla_len: u16,
    /// Attribute type.
    pub nla_type: u16,
}

/// Largest payload a single attribute can carry.
pub const NLA_MAX_PAYLOAD: usize = u16::MAX as usize - NLA_HDRLEN;

fn nla_len(len: usize) -> Result<u16, AttributeError> {
    u16::try_from(len).map_err(|_| AttributeError::TooLong { len })
}

/// Attribute type flags.
pub const NLA_F_NESTED: u16 = 1 << 15;
pub const NLA_F_NET_BYTEORDER: u16 = 1 << 14;
pub const NLA_TYPE_MASK: u16 = !(NLA_F_NESTED | NLA_F_NET_BYTEORDER);

impl NlAttr {
    /// Header for an attribute carrying `data_len` payload bytes.
    ///
    /// Fails if header plus payload does not fit the 16-bit length field.
    pub fn new(attr_type: u16, data_len: usize) -> Result<Self, AttributeError> {
        Ok(Self {
            nla_len: nla_len(NLA_HDRLEN + data_len)?,
            nla_type: attr_type,
        })
    }

    /// Get the attribute type without flags.
    pub fn kind(&self) -> u16 {
        self.nla_type & NLA_TYPE_MASK
    }

    /// Check if this is a nested attribute.
    pub fn is_nested(&self) -> bool {
        self.nla_type & NLA_F_NESTED != 0
    }

    /// Check if the payload is in network byte order.
    pub fn is_net_byteorder(&self) -> bool {
        self.nla_type & NLA_F_NET_BYTEORDER != 0
    }

    /// Convert to bytes.
    pub fn as_bytes(&self) -> &[u8] {
        <Self as IntoBytes>::as_bytes(self)
    }

    /// Parse from bytes. No alignment requirement on `data`.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        Self::read_from_prefix(data).ok().map(|(attr, _)| attr)
    }
}

/// One decoded attribute borrowed from its buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute<'a> {
    /// Semantic type (flags stripped).
    pub kind: u16,
    /// `NLA_F_NESTED` was set.
    pub nested: bool,
    /// `NLA_F_NET_BYTEORDER` was set.
    pub net_byteorder: bool,
    /// Payload without header or padding.
    pub payload: &'a [u8],
}

/// Iterator over netlink attributes in a buffer.
///
/// Yields an error once and then stops if an attribute's declared length
/// does not fit the remaining bytes.
pub struct AttrIter<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> AttrIter<'a> {
    /// Create a new attribute iterator.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }
}

impl<'a> Iterator for AttrIter<'a> {
    type Item = Result<Attribute<'a>, AttributeError>;

    fn next(&mut self) -> Option<Self::Item> {
        // Fewer than a header's worth left is trailing padding.
        let attr = NlAttr::from_bytes(self.data)?;

        let len = attr.nla_len as usize;
        if len < NLA_HDRLEN || len > self.data.len() {
            let offset = self.offset;
            self.data = &[];
            return Some(Err(AttributeError::Malformed { offset }));
        }

        let payload = &self.data[NLA_HDRLEN..len];
        let aligned_len = nla_align(len).min(self.data.len());
        self.data = &self.data[aligned_len..];
        self.offset += aligned_len;

        Some(Ok(Attribute {
            kind: attr.kind(),
            nested: attr.is_nested(),
            net_byteorder: attr.is_net_byteorder(),
            payload,
        }))
    }
}

/// Decode a whole TLV stream, failing on the first malformed attribute.
pub fn decode(data: &[u8]) -> Result<Vec<Attribute<'_>>, AttributeError> {
    AttrIter::new(data).collect()
}

/// Append one attribute (header, payload, padding) to `buf`.
///
/// `buf` is left untouched if the payload is too long to encode.
pub fn put(buf: &mut Vec<u8>, attr_type: u16, data: &[u8]) -> Result<(), AttributeError> {
    let attr = NlAttr::new(attr_type, data.len())?;
    buf.extend_from_slice(attr.as_bytes());
    buf.extend_from_slice(data);
    let aligned = nla_align(buf.len());
    buf.resize(aligned, 0);
    Ok(())
}

/// Token returned when starting a nested attribute.
/// Used to finalize the nested attribute length.
#[derive(Debug, Clone, Copy)]
pub struct NestToken {
    /// Offset of the nested attribute header in the buffer.
    offset: usize,
}

/// Write a placeholder header for a nested attribute.
pub fn nest_start(buf: &mut Vec<u8>, attr_type: u16) -> NestToken {
    let offset = buf.len();
    let attr = NlAttr {
        nla_len: NLA_HDRLEN as u16,
        nla_type: attr_type | NLA_F_NESTED,
    };
    buf.extend_from_slice(attr.as_bytes());
    NestToken { offset }
}

/// Patch the length of a nested attribute started with [`nest_start`].
///
/// On error the nest is dropped from `buf` again.
pub fn nest_end(buf: &mut Vec<u8>, token: NestToken) -> Result<(), AttributeError> {
    let len = match nla_len(buf.len() - token.offset) {
        Ok(len) => len,
        Err(e) => {
            buf.truncate(token.offset);
            return Err(e);
        }
    };
    buf[token.offset..token.offset + 2].copy_from_slice(&len.to_ne_bytes());
    let aligned = nla_align(buf.len());
    buf.resize(aligned, 0);
    Ok(())
}

/// Helper functions for extracting typed values from attribute payloads.
pub mod get {
    use super::AttributeError;

    fn fixed<const N: usize>(data: &[u8], name: &'static str) -> Result<[u8; N], AttributeError> {
        data.try_into().map_err(|_| AttributeError::ValueCorrupted {
            name,
            expected: N,
            actual: data.len(),
        })
    }

    /// Extract a u8 value.
    pub fn u8(data: &[u8], name: &'static str) -> Result<u8, AttributeError> {
        Ok(fixed::<1>(data, name)?[0])
    }

    /// Extract a u16 value (native endian).
    pub fn u16_ne(data: &[u8], name: &'static str) -> Result<u16, AttributeError> {
        Ok(u16::from_ne_bytes(fixed(data, name)?))
    }

    /// Extract a u32 value (native endian).
    pub fn u32_ne(data: &[u8], name: &'static str) -> Result<u32, AttributeError> {
        Ok(u32::from_ne_bytes(fixed(data, name)?))
    }

    /// Extract a u64 value (native endian).
    pub fn u64_ne(data: &[u8], name: &'static str) -> Result<u64, AttributeError> {
        Ok(u64::from_ne_bytes(fixed(data, name)?))
    }

    /// Extract an i32 value (native endian).
    pub fn i32_ne(data: &[u8], name: &'static str) -> Result<i32, AttributeError> {
        Ok(i32::from_ne_bytes(fixed(data, name)?))
    }

    /// Extract a u16 value (big endian / network order).
    pub fn u16_be(data: &[u8], name: &'static str) -> Result<u16, AttributeError> {
        Ok(u16::from_be_bytes(fixed(data, name)?))
    }

    /// Extract a u32 value (big endian / network order).
    pub fn u32_be(data: &[u8], name: &'static str) -> Result<u32, AttributeError> {
        Ok(u32::from_be_bytes(fixed(data, name)?))
    }

    /// Extract a null-terminated string.
    pub fn string<'a>(data: &'a [u8], name: &'static str) -> Result<&'a str, AttributeError> {
        // Find null terminator or use whole buffer
        let len = data.iter().position(|&b| b == 0).unwrap_or(data.len());
        std::str::from_utf8(&data[..len]).map_err(|_| AttributeError::InvalidString { name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_pads_to_alignment() {
        let mut buf = Vec::new();
        put(&mut buf, 1, &[0xaa, 0xbb, 0xcc]).unwrap();
        assert_eq!(buf, [7, 0, 1, 0, 0xaa, 0xbb, 0xcc, 0]);
    }

    #[test]
    fn test_odd_lengths_stay_aligned() {
        let mut buf = Vec::new();
        let payloads: [&[u8]; 4] = [b"a", b"abc", b"abcde", b"abcdefg"];
        for (i, p) in payloads.iter().enumerate() {
            put(&mut buf, i as u16 + 1, p).unwrap();
        }
        assert_eq!(buf.len() % NLA_ALIGNTO, 0);

        let base = buf.as_ptr() as usize;
        let attrs = decode(&buf).unwrap();
        assert_eq!(attrs.len(), payloads.len());
        for (attr, expected) in attrs.iter().zip(payloads) {
            assert_eq!(attr.payload, expected);
            assert_eq!((attr.payload.as_ptr() as usize - base) % NLA_ALIGNTO, 0);
        }
    }

    #[test]
    fn test_flags_are_split_from_kind() {
        let mut buf = Vec::new();
        put(&mut buf, 5 | NLA_F_NET_BYTEORDER, &80u16.to_be_bytes()).unwrap();
        let attr = decode(&buf).unwrap()[0];
        assert_eq!(attr.kind, 5);
        assert!(attr.net_byteorder);
        assert!(!attr.nested);
        assert_eq!(get::u16_be(attr.payload, "port").unwrap(), 80);
    }

    #[test]
    fn test_nested_length_patched() {
        let mut buf = Vec::new();
        let nest = nest_start(&mut buf, 7);
        put(&mut buf, 1, &42u32.to_ne_bytes()).unwrap();
        nest_end(&mut buf, nest).unwrap();

        let outer = decode(&buf).unwrap();
        assert_eq!(outer.len(), 1);
        assert!(outer[0].nested);
        assert_eq!(outer[0].kind, 7);
        let inner = decode(outer[0].payload).unwrap();
        assert_eq!(get::u32_ne(inner[0].payload, "id").unwrap(), 42);
    }

    #[test]
    fn test_overrunning_length_is_malformed() {
        let mut buf = Vec::new();
        put(&mut buf, 1, &1u32.to_ne_bytes()).unwrap();
        // second attribute claims 64 bytes but only has a header
        buf.extend_from_slice(&[64, 0, 2, 0]);
        let mut iter = AttrIter::new(&buf);
        assert!(iter.next().unwrap().is_ok());
        assert_eq!(
            iter.next().unwrap(),
            Err(AttributeError::Malformed { offset: 8 })
        );
        assert!(iter.next().is_none());
        assert!(decode(&buf).is_err());
    }

    #[test]
    fn test_short_length_is_malformed() {
        let buf = [2u8, 0, 1, 0];
        assert_eq!(decode(&buf), Err(AttributeError::Malformed { offset: 0 }));
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let mut buf = Vec::new();
        put(&mut buf, 1, &[0; NLA_MAX_PAYLOAD]).unwrap();
        assert_eq!(buf.len(), u16::MAX as usize + 1);

        let mut buf = Vec::new();
        assert_eq!(
            put(&mut buf, 1, &[0; NLA_MAX_PAYLOAD + 1]),
            Err(AttributeError::TooLong { len: 65536 })
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn test_oversized_nest_rejected() {
        let mut buf = Vec::new();
        put(&mut buf, 1, &7u32.to_ne_bytes()).unwrap();
        let nest = nest_start(&mut buf, 2);
        put(&mut buf, 1, &[0; 40_000]).unwrap();
        put(&mut buf, 2, &[0; 40_000]).unwrap();
        assert!(matches!(
            nest_end(&mut buf, nest),
            Err(AttributeError::TooLong { .. })
        ));
        // the enclosing stream is still decodable
        assert_eq!(decode(&buf).unwrap().len(), 1);
    }

    #[test]
    fn test_get_size_mismatch() {
        assert_eq!(
            get::u32_ne(&[1, 2, 3], "wiphy"),
            Err(AttributeError::ValueCorrupted {
                name: "wiphy",
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn test_get_string_stops_at_nul() {
        assert_eq!(get::string(b"nl80211\0", "name").unwrap(), "nl80211");
        assert_eq!(get::string(b"scan", "name").unwrap(), "scan");
    }
}
