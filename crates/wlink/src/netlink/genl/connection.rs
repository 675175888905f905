//! Generic Netlink connection with family resolution.

use std::collections::HashMap;

use super::header::GenlMessage;
use super::{CTRL_VERSION, CtrlAttr, CtrlCmd, FamilyController, GENL_ID_CTRL};
use crate::netlink::builder::MessageBuilder;
use crate::netlink::codec::AttrRecord;
use crate::netlink::error::{Error, ProtocolError, Result};
use crate::netlink::message::{
    ErrorMessage, MessageIter, NLM_F_DUMP, NLM_F_DUMP_INTR, NLM_F_REQUEST,
};
use crate::netlink::socket::{NetlinkSocket, Transport};

/// Generic Netlink connection.
///
/// Provides family resolution and the request/dump primitives family
/// wrappers are built from. Resolved families are cached for the lifetime of
/// the connection; a new connection resolves afresh.
///
/// # Example
///
/// ```rust,no_run
/// use wlink::netlink::genl::GenlConnection;
///
/// # async fn example() -> wlink::Result<()> {
/// let mut conn = GenlConnection::new()?;
///
/// // Get family info (cached after first call)
/// let nl80211 = conn.get_family("nl80211").await?;
/// println!("scan group: {:?}", nl80211.mcast_group("scan"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GenlConnection<T = NetlinkSocket> {
    socket: T,
    families: HashMap<String, FamilyController>,
}

impl GenlConnection {
    /// Open a Generic Netlink socket and wrap it.
    pub fn new() -> Result<Self> {
        Ok(Self::from_transport(NetlinkSocket::new()?))
    }
}

impl<T: Transport> GenlConnection<T> {
    /// Wrap an existing transport.
    pub fn from_transport(socket: T) -> Self {
        Self {
            socket,
            families: HashMap::new(),
        }
    }

    /// Get the underlying transport.
    pub fn transport(&self) -> &T {
        &self.socket
    }

    /// Get the underlying transport mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.socket
    }

    /// Get information about a Generic Netlink family.
    ///
    /// The result is cached, so subsequent calls for the same family
    /// do not require kernel communication.
    pub async fn get_family(&mut self, name: &str) -> Result<FamilyController> {
        if let Some(family) = self.families.get(name) {
            return Ok(family.clone());
        }

        let family = self.resolve(name).await?;
        self.families.insert(name.to_string(), family.clone());
        Ok(family)
    }

    /// Get the family ID for a given family name.
    pub async fn get_family_id(&mut self, name: &str) -> Result<u16> {
        Ok(self.get_family(name).await?.id)
    }

    /// Forget every resolved family.
    pub fn clear_cache(&mut self) {
        self.families.clear();
    }

    /// Ask the controller about `name`, bypassing the cache.
    pub async fn resolve(&self, name: &str) -> Result<FamilyController> {
        let seq = self.send_request(getfamily_request(name)?).await?;

        loop {
            let data = self.socket.recv_msg().await?;

            for result in MessageIter::new(&data) {
                let (header, payload) = result?;

                if header.nlmsg_seq != seq {
                    tracing::trace!(seq = header.nlmsg_seq, "skipping unrelated message");
                    continue;
                }

                if header.is_error() {
                    let err = ErrorMessage::parse(header, payload)?;
                    if err.is_ack() {
                        continue;
                    }
                    return Err(ProtocolError::UnknownFamily {
                        name: name.to_string(),
                        errno: -err.errno,
                    }
                    .into());
                }

                if header.is_done() {
                    continue;
                }

                let msg = GenlMessage::parse(header, payload)?;
                if msg.cmd() != CtrlCmd::NewFamily as u8 {
                    return Err(ProtocolError::UnexpectedCommand {
                        expected: CtrlCmd::NewFamily as u8,
                        actual: msg.cmd(),
                    }
                    .into());
                }

                let family = FamilyController::decode(msg.attrs)?;
                tracing::debug!(
                    family = %family.name,
                    id = family.id,
                    groups = family.mcast_groups.len(),
                    "resolved generic netlink family"
                );
                return Ok(family);
            }
        }
    }

    /// Stamp `builder` with a fresh sequence number and our port ID, then send.
    ///
    /// Returns the sequence number replies will carry.
    pub async fn send_request(&self, builder: MessageBuilder) -> Result<u32> {
        let seq = self.socket.next_seq();
        let msg = builder.finish(seq, self.socket.pid());
        self.socket.send(&msg).await?;
        Ok(seq)
    }

    /// Receive the next raw datagram.
    pub async fn recv(&self) -> Result<Vec<u8>> {
        self.socket.recv_msg().await
    }

    /// Subscribe to a multicast group.
    pub fn add_membership(&mut self, group: u32) -> Result<()> {
        self.socket.add_membership(group)
    }

    /// Unsubscribe from a multicast group.
    pub fn drop_membership(&mut self, group: u32) -> Result<()> {
        self.socket.drop_membership(group)
    }

    /// Send a GENL dump command and collect every reply payload.
    ///
    /// Replies may span several datagrams; collection stops at `NLMSG_DONE`.
    /// Each returned payload still starts with the GENL header.
    pub async fn dump_command(
        &self,
        family_id: u16,
        cmd: u8,
        version: u8,
        build_attrs: impl FnOnce(&mut MessageBuilder) -> Result<()>,
    ) -> Result<Vec<Vec<u8>>> {
        let mut builder =
            MessageBuilder::genl(family_id, NLM_F_REQUEST | NLM_F_DUMP, cmd, version);

        build_attrs(&mut builder)?;

        let seq = self.send_request(builder).await?;
        let mut responses = Vec::new();

        loop {
            let data = self.socket.recv_msg().await?;
            let mut done = false;

            for result in MessageIter::new(&data) {
                let (header, payload) = result?;

                if header.nlmsg_seq != seq {
                    continue;
                }

                if header.is_error() {
                    let err = ErrorMessage::parse(header, payload)?;
                    if !err.is_ack() {
                        return Err(Error::from_errno(err.errno));
                    }
                    continue;
                }

                if header.is_done() {
                    done = true;
                    break;
                }

                if header.nlmsg_flags & NLM_F_DUMP_INTR != 0 {
                    tracing::warn!(cmd, "dump interrupted by concurrent change");
                }

                responses.push(payload.to_vec());
            }

            if done {
                break;
            }
        }

        tracing::debug!(cmd, count = responses.len(), "dump complete");
        Ok(responses)
    }
}

/// `CTRL_CMD_GETFAMILY` request for `name`.
fn getfamily_request(name: &str) -> Result<MessageBuilder> {
    let mut builder = MessageBuilder::genl(
        GENL_ID_CTRL,
        NLM_F_REQUEST,
        CtrlCmd::GetFamily as u8,
        CTRL_VERSION,
    );
    builder.attr_str(CtrlAttr::FamilyName as u16, name)?;
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::attr::get;
    use crate::netlink::error::AttributeError;
    use crate::netlink::fixtures::{
        MockTransport, datagram, done, error, family_reply, genl_msg, nl80211_family, within,
    };
    use crate::netlink::message::{NLM_F_MULTI, NlMsgHdr};

    const GETFAMILY_NL80211: [u8; 32] = [
        32, 0, 0, 0, 16, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 3, 1, 0, 0, 12, 0, 2, 0, 110, 108, 56,
        48, 50, 49, 49, 0,
    ];

    #[test]
    fn test_getfamily_fixture_decodes() {
        let mut iter = MessageIter::new(&GETFAMILY_NL80211);
        let (header, payload) = iter.next().unwrap().unwrap();
        assert!(iter.next().is_none());

        assert_eq!(header.nlmsg_len, 32);
        assert_eq!(header.nlmsg_type, GENL_ID_CTRL);
        assert_eq!(header.nlmsg_flags, NLM_F_REQUEST);

        let msg = GenlMessage::parse(header, payload).unwrap();
        assert_eq!(msg.cmd(), CtrlCmd::GetFamily as u8);
        assert_eq!(msg.genl.version, 1);

        let attrs: Vec<_> = msg.attr_iter().collect::<std::result::Result<_, _>>().unwrap();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].kind, CtrlAttr::FamilyName as u16);
        assert_eq!(attrs[0].payload, b"nl80211\0");
        assert_eq!(get::string(attrs[0].payload, "name").unwrap(), "nl80211");
    }

    #[test]
    fn test_getfamily_request_encodes_fixture() {
        assert_eq!(getfamily_request("nl80211").unwrap().finish(0, 0), GETFAMILY_NL80211);
    }

    #[tokio::test]
    async fn test_resolve() {
        let mock = MockTransport::new();
        mock.push(family_reply(1, &nl80211_family()));
        let conn = GenlConnection::from_transport(mock);

        let family = within(conn.resolve("nl80211")).await.unwrap();
        assert_eq!(family, nl80211_family());

        let sent = conn.transport().sent();
        assert_eq!(sent.len(), 1);
        let mut expected = GETFAMILY_NL80211;
        expected[8] = 1; // seq
        assert_eq!(sent[0], expected);
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let mock = MockTransport::new();
        mock.push(family_reply(1, &nl80211_family()));
        mock.push(family_reply(2, &nl80211_family()));
        let conn = GenlConnection::from_transport(mock);

        let first = within(conn.resolve("nl80211")).await.unwrap();
        let second = within(conn.resolve("nl80211")).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_get_family_is_cached() {
        let mock = MockTransport::new();
        mock.push(family_reply(1, &nl80211_family()));
        mock.push(family_reply(2, &nl80211_family()));
        let mut conn = GenlConnection::from_transport(mock);

        assert_eq!(within(conn.get_family_id("nl80211")).await.unwrap(), 0x1c);
        assert_eq!(within(conn.get_family_id("nl80211")).await.unwrap(), 0x1c);
        assert_eq!(conn.transport().sent().len(), 1);

        conn.clear_cache();
        within(conn.get_family("nl80211")).await.unwrap();
        assert_eq!(conn.transport().sent().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_family() {
        let mock = MockTransport::new();
        mock.push(error(1, -libc::ENOENT, GENL_ID_CTRL));
        let conn = GenlConnection::from_transport(mock);

        let err = within(conn.resolve("nl80211")).await.unwrap_err();
        assert!(err.is_not_found());
        match err {
            Error::Protocol(ProtocolError::UnknownFamily { name, errno }) => {
                assert_eq!(name, "nl80211");
                assert_eq!(errno, libc::ENOENT);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resolve_skips_unrelated_messages() {
        let mock = MockTransport::new();
        // multicast notification (seq 0) lands in the same datagram
        mock.push(datagram(&[
            genl_msg(0x1c, 0, 0, 34, &[]),
            family_reply(1, &nl80211_family()),
        ]));
        let conn = GenlConnection::from_transport(mock);
        assert_eq!(within(conn.resolve("nl80211")).await.unwrap().id, 0x1c);
    }

    #[tokio::test]
    async fn test_resolve_rejects_unexpected_command() {
        let mock = MockTransport::new();
        // CTRL_CMD_GETOPS
        mock.push(genl_msg(GENL_ID_CTRL, 0, 1, 6, &[]));
        let conn = GenlConnection::from_transport(mock);
        assert!(matches!(
            within(conn.resolve("nl80211")).await,
            Err(Error::Protocol(ProtocolError::UnexpectedCommand {
                expected: 1,
                actual: 6
            }))
        ));
    }

    #[tokio::test]
    async fn test_resolve_reports_corrupt_record() {
        let mock = MockTransport::new();
        let mut attrs = Vec::new();
        crate::netlink::attr::put(&mut attrs, CtrlAttr::FamilyId as u16, &[0x1c]).unwrap();
        mock.push(genl_msg(GENL_ID_CTRL, 0, 1, CtrlCmd::NewFamily as u8, &attrs));
        let conn = GenlConnection::from_transport(mock);
        assert!(matches!(
            within(conn.resolve("nl80211")).await,
            Err(Error::Attribute(AttributeError::ValueCorrupted { name: "id", .. }))
        ));
    }

    #[tokio::test]
    async fn test_dump_spans_datagrams() {
        let mock = MockTransport::new();
        mock.push(genl_msg(0x1c, NLM_F_MULTI, 1, 3, &[1, 0, 0, 0]));
        mock.push(datagram(&[
            genl_msg(0x1c, NLM_F_MULTI, 1, 3, &[2, 0, 0, 0]),
            done(1),
        ]));
        let conn = GenlConnection::from_transport(mock);

        let payloads = within(conn.dump_command(0x1c, 1, 0, |b| b.attr_u32(3, 7)))
            .await
            .unwrap();
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[1][4], 2);

        let sent = conn.transport().sent();
        let header = NlMsgHdr::from_bytes(&sent[0]).unwrap();
        assert_eq!(header.nlmsg_flags, NLM_F_REQUEST | NLM_F_DUMP);
        assert_eq!(header.nlmsg_type, 0x1c);
    }

    #[tokio::test]
    async fn test_dump_error() {
        let mock = MockTransport::new();
        mock.push(error(1, -libc::EPERM, 0x1c));
        let conn = GenlConnection::from_transport(mock);
        let err = within(conn.dump_command(0x1c, 1, 0, |_| Ok(())))
            .await
            .unwrap_err();
        assert!(err.is_permission_denied());
    }
}
