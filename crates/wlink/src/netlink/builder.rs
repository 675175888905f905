//! Generic Netlink request construction.

use super::attr;
use super::error::Result;
use super::genl::GenlMsgHdr;
use super::message::NlMsgHdr;

/// A Generic Netlink request under construction.
///
/// Holds the netlink header and a body that starts with the GENL header and
/// continues with attributes. Length, sequence number and port ID are only
/// known at send time and are filled in by [`finish`](Self::finish).
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    header: NlMsgHdr,
    body: Vec<u8>,
}

impl MessageBuilder {
    /// Request `cmd` of family `family_id`.
    pub fn genl(family_id: u16, flags: u16, cmd: u8, version: u8) -> Self {
        Self {
            header: NlMsgHdr::new(family_id, flags),
            body: GenlMsgHdr::new(cmd, version).as_bytes().to_vec(),
        }
    }

    /// Append one attribute.
    pub fn attr(&mut self, attr_type: u16, data: &[u8]) -> Result<()> {
        Ok(attr::put(&mut self.body, attr_type, data)?)
    }

    /// Append a u32 attribute (native endian).
    pub fn attr_u32(&mut self, attr_type: u16, value: u32) -> Result<()> {
        self.attr(attr_type, &value.to_ne_bytes())
    }

    /// Append a presence-only attribute.
    pub fn attr_flag(&mut self, attr_type: u16) -> Result<()> {
        self.attr(attr_type, &[])
    }

    /// Append a NUL-terminated string attribute.
    pub fn attr_str(&mut self, attr_type: u16, value: &str) -> Result<()> {
        let mut data = Vec::with_capacity(value.len() + 1);
        data.extend_from_slice(value.as_bytes());
        data.push(0);
        self.attr(attr_type, &data)
    }

    /// Append a TLV stream produced by [`crate::netlink::codec`].
    ///
    /// Codec output is always padded, so the body stays aligned.
    pub fn attrs(&mut self, encoded: &[u8]) {
        self.body.extend_from_slice(encoded);
    }

    /// Stamp the header and frame the message.
    pub fn finish(self, seq: u32, pid: u32) -> Vec<u8> {
        NlMsgHdr {
            nlmsg_seq: seq,
            nlmsg_pid: pid,
            ..self.header
        }
        .encode(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::attr::{AttrIter, NLA_HDRLEN, NLA_MAX_PAYLOAD, get};
    use crate::netlink::error::{AttributeError, Error};
    use crate::netlink::genl::GENL_HDRLEN;
    use crate::netlink::message::{NLM_F_DUMP, NLM_F_REQUEST, NLMSG_HDRLEN};

    #[test]
    fn test_header_only_request() {
        let msg = MessageBuilder::genl(0x1c, NLM_F_REQUEST | NLM_F_DUMP, 1, 0).finish(4, 0);
        assert_eq!(msg.len(), NLMSG_HDRLEN + GENL_HDRLEN);

        let header = NlMsgHdr::from_bytes(&msg).unwrap();
        assert_eq!(header.nlmsg_len as usize, msg.len());
        assert_eq!(header.nlmsg_type, 0x1c);
        assert_eq!(header.nlmsg_flags, NLM_F_REQUEST | NLM_F_DUMP);
        assert_eq!(header.nlmsg_seq, 4);
        assert_eq!(&msg[NLMSG_HDRLEN..], [1, 0, 0, 0]);
    }

    #[test]
    fn test_attributes_follow_genl_header() {
        let mut builder = MessageBuilder::genl(0x1c, NLM_F_REQUEST, 33, 0);
        builder.attr_u32(3, 7).unwrap();
        builder.attr_flag(174).unwrap();
        let msg = builder.finish(9, 1234);

        assert_eq!(msg.len(), NLMSG_HDRLEN + GENL_HDRLEN + 2 * NLA_HDRLEN + 4);
        let header = NlMsgHdr::from_bytes(&msg).unwrap();
        assert_eq!(header.nlmsg_seq, 9);
        assert_eq!(header.nlmsg_pid, 1234);
        assert_eq!(msg[NLMSG_HDRLEN], 33);

        let attrs: Vec<_> = AttrIter::new(&msg[NLMSG_HDRLEN + GENL_HDRLEN..])
            .map(|a| a.unwrap())
            .collect();
        assert_eq!(attrs[0].kind, 3);
        assert_eq!(get::u32_ne(attrs[0].payload, "ifindex").unwrap(), 7);
        assert_eq!(attrs[1].kind, 174);
        assert!(attrs[1].payload.is_empty());
    }

    #[test]
    fn test_string_too_long() {
        let mut builder = MessageBuilder::genl(0x10, NLM_F_REQUEST, 3, 1);
        let name = "x".repeat(NLA_MAX_PAYLOAD);
        assert!(matches!(
            builder.attr_str(2, &name),
            Err(Error::Attribute(AttributeError::TooLong { len: 65536 }))
        ));
        // nothing was appended
        assert_eq!(builder.finish(1, 0).len(), NLMSG_HDRLEN + GENL_HDRLEN);
    }
}
