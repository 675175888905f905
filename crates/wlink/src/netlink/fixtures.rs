//! Test fixtures: a scripted in-memory transport and message constructors.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use super::attr;
use super::codec::AttrRecord;
use super::error::{Error, Result};
use super::genl::nl80211::{BssAttr, Nl80211Attr, Nl80211Cmd};
use super::genl::{CtrlCmd, FamilyController, GENL_ID_CTRL, GenlMsgHdr, McastGroup, Operation};
use super::message::{NLM_F_MULTI, NLM_F_REQUEST, NlMsgHdr, NlMsgType, nlmsg_align};
use super::socket::Transport;
use crate::util::ifname::InterfaceResolver;

/// Transport that replays queued datagrams and records everything sent.
///
/// Once the queue is empty, `recv_msg` never completes, which is what a
/// silent kernel looks like to a caller with a deadline.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Vec<u8>>>,
    sent: Mutex<Vec<Vec<u8>>>,
    groups: Vec<u32>,
    joined: Vec<u32>,
    seq: AtomicU32,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            seq: AtomicU32::new(1),
            ..Default::default()
        }
    }

    /// Queue one datagram.
    pub fn push(&self, datagram: Vec<u8>) {
        self.responses.lock().unwrap().push_back(datagram);
    }

    /// Messages sent so far.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().clone()
    }

    /// Groups currently joined.
    pub fn memberships(&self) -> &[u32] {
        &self.groups
    }

    /// Every group ever joined, in order.
    pub fn joined(&self) -> &[u32] {
        &self.joined
    }

    /// Datagrams still queued.
    pub fn pending(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

impl Transport for MockTransport {
    async fn send(&self, msg: &[u8]) -> Result<()> {
        self.sent.lock().unwrap().push(msg.to_vec());
        Ok(())
    }

    async fn recv_msg(&self) -> Result<Vec<u8>> {
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(datagram) => Ok(datagram),
            None => std::future::pending().await,
        }
    }

    fn add_membership(&mut self, group: u32) -> Result<()> {
        self.groups.push(group);
        self.joined.push(group);
        Ok(())
    }

    fn drop_membership(&mut self, group: u32) -> Result<()> {
        self.groups.retain(|g| *g != group);
        Ok(())
    }

    fn next_seq(&self) -> u32 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    fn pid(&self) -> u32 {
        0
    }
}

/// Run a mock-driven exchange, failing instead of hanging if the script
/// runs dry before it completes.
pub async fn within<F: Future>(exchange: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(2), exchange)
        .await
        .expect("exchange waited on an empty transport")
}

/// A GENL message with the given attribute stream.
pub fn genl_msg(family: u16, flags: u16, seq: u32, cmd: u8, attrs: &[u8]) -> Vec<u8> {
    let mut payload = GenlMsgHdr::new(cmd, 1).as_bytes().to_vec();
    payload.extend_from_slice(attrs);
    NlMsgHdr {
        nlmsg_seq: seq,
        ..NlMsgHdr::new(family, flags)
    }
    .encode(&payload)
}

/// `NLMSG_DONE` terminating a dump.
pub fn done(seq: u32) -> Vec<u8> {
    NlMsgHdr {
        nlmsg_seq: seq,
        ..NlMsgHdr::new(NlMsgType::DONE, NLM_F_MULTI)
    }
    .encode(&0i32.to_ne_bytes())
}

/// `NLMSG_ERROR` answering request `seq` (errno negative, 0 for ACK).
pub fn error(seq: u32, errno: i32, request_type: u16) -> Vec<u8> {
    let mut payload = errno.to_ne_bytes().to_vec();
    let request = NlMsgHdr {
        nlmsg_seq: seq,
        ..NlMsgHdr::new(request_type, NLM_F_REQUEST)
    };
    payload.extend_from_slice(request.as_bytes());
    NlMsgHdr {
        nlmsg_seq: seq,
        ..NlMsgHdr::new(NlMsgType::ERROR, 0)
    }
    .encode(&payload)
}

/// Join messages into one datagram, 4-byte aligned.
pub fn datagram(messages: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = Vec::new();
    for msg in messages {
        buf.extend_from_slice(msg);
        buf.resize(nlmsg_align(buf.len()), 0);
    }
    buf
}

/// Controller record for nl80211 as a 6.x kernel reports it (trimmed ops).
pub fn nl80211_family() -> FamilyController {
    FamilyController {
        id: 0x1c,
        name: "nl80211".into(),
        version: 1,
        hdr_size: 0,
        max_attr: 330,
        operations: vec![
            Operation { id: 1, flags: 0x0e },
            Operation { id: 32, flags: 0x0c },
            Operation { id: 33, flags: 0x1a },
        ],
        mcast_groups: ["config", "scan", "regulatory", "mlme", "vendor"]
            .iter()
            .zip(4u32..)
            .map(|(name, id)| McastGroup {
                name: (*name).into(),
                id,
            })
            .collect(),
    }
}

/// `CTRL_CMD_NEWFAMILY` reply carrying `family`.
pub fn family_reply(seq: u32, family: &FamilyController) -> Vec<u8> {
    let attrs = family.encode().unwrap();
    genl_msg(GENL_ID_CTRL, 0, seq, CtrlCmd::NewFamily as u8, &attrs)
}

/// `NEW_SCAN_RESULTS` attributes laid out the way the kernel emits them.
pub fn bss_attrs(ifindex: u32, bssid: [u8; 6], ssid: &str, freq: u32, signal_mbm: i32) -> Vec<u8> {
    let mut ies = vec![0, ssid.len() as u8];
    ies.extend_from_slice(ssid.as_bytes());
    ies.extend_from_slice(&[3, 1, 6]);

    let mut buf = Vec::new();
    attr::put(&mut buf, Nl80211Attr::Generation as u16, &7u32.to_ne_bytes()).unwrap();
    attr::put(&mut buf, Nl80211Attr::Ifindex as u16, &ifindex.to_ne_bytes()).unwrap();
    attr::put(&mut buf, Nl80211Attr::Wdev as u16, &1u64.to_ne_bytes()).unwrap();

    let nest = attr::nest_start(&mut buf, Nl80211Attr::Bss as u16);
    attr::put(&mut buf, BssAttr::Bssid as u16, &bssid).unwrap();
    attr::put(&mut buf, BssAttr::Frequency as u16, &freq.to_ne_bytes()).unwrap();
    attr::put(&mut buf, BssAttr::Tsf as u16, &123_456u64.to_ne_bytes()).unwrap();
    attr::put(&mut buf, BssAttr::BeaconInterval as u16, &100u16.to_ne_bytes()).unwrap();
    attr::put(&mut buf, BssAttr::Capability as u16, &0x0431u16.to_ne_bytes()).unwrap();
    attr::put(&mut buf, BssAttr::InformationElements as u16, &ies).unwrap();
    // beacon IEs are not decoded
    attr::put(&mut buf, BssAttr::BeaconIes as u16, &ies).unwrap();
    attr::put(&mut buf, BssAttr::SignalMbm as u16, &signal_mbm.to_ne_bytes()).unwrap();
    attr::put(&mut buf, BssAttr::SeenMsAgo as u16, &40u32.to_ne_bytes()).unwrap();
    attr::nest_end(&mut buf, nest).unwrap();
    buf
}

/// One dump record of a `GET_SCAN` reply.
pub fn scan_result(
    family: u16,
    seq: u32,
    ifindex: u32,
    bssid: [u8; 6],
    ssid: &str,
    freq: u32,
) -> Vec<u8> {
    let attrs = bss_attrs(ifindex, bssid, ssid, freq, -5500);
    genl_msg(
        family,
        NLM_F_MULTI,
        seq,
        Nl80211Cmd::NewScanResults as u8,
        &attrs,
    )
}

/// Multicast scan notification (`TRIGGER_SCAN`, `NEW_SCAN_RESULTS`, ...).
pub fn scan_event(family: u16, cmd: Nl80211Cmd, ifindex: u32) -> Vec<u8> {
    let mut attrs = Vec::new();
    attr::put(&mut attrs, Nl80211Attr::Wiphy as u16, &0u32.to_ne_bytes()).unwrap();
    attr::put(&mut attrs, Nl80211Attr::Ifindex as u16, &ifindex.to_ne_bytes()).unwrap();
    attr::put(&mut attrs, Nl80211Attr::Wdev as u16, &1u64.to_ne_bytes()).unwrap();
    genl_msg(family, 0, 0, cmd as u8, &attrs)
}

/// Fixed interface table.
#[derive(Debug, Clone, Default)]
pub struct StaticInterfaces(pub Vec<(String, u32)>);

impl StaticInterfaces {
    pub fn single(name: &str, index: u32) -> Self {
        Self(vec![(name.to_string(), index)])
    }
}

impl InterfaceResolver for StaticInterfaces {
    fn list_interfaces(&self) -> Result<Vec<String>> {
        Ok(self.0.iter().map(|(name, _)| name.clone()).collect())
    }

    fn index_of(&self, name: &str) -> Result<u32> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, index)| *index)
            .ok_or_else(|| Error::InterfaceNotFound {
                name: name.to_string(),
            })
    }
}
