//! nl80211 connection.

use super::scan::{ScanConfig, Scanner};
use super::stream::ScanStream;
use super::types::{ScanResult, TriggerScanRequest, Wiphy};
use super::{NL80211_GENL_NAME, NL80211_GENL_VERSION, Nl80211Attr, Nl80211Cmd, mcast};
use crate::netlink::builder::MessageBuilder;
use crate::netlink::codec::AttrRecord;
use crate::netlink::error::{Error, ProtocolError, Result, ScanError};
use crate::netlink::genl::{FamilyController, GenlConnection, split_payload};
use crate::netlink::message::NLM_F_REQUEST;
use crate::netlink::socket::{NetlinkSocket, Transport};
use crate::wlan::Ssid;

/// Connection to the nl80211 family.
///
/// Wraps a [`GenlConnection`] together with the resolved family record, so
/// the family ID and multicast group IDs are known up front.
#[derive(Debug)]
pub struct Nl80211Connection<T = NetlinkSocket> {
    genl: GenlConnection<T>,
    family: FamilyController,
}

impl Nl80211Connection {
    /// Open a socket and resolve the nl80211 family.
    pub async fn new() -> Result<Self> {
        Self::from_genl(GenlConnection::new()?).await
    }
}

impl<T: Transport> Nl80211Connection<T> {
    /// Resolve nl80211 on an existing GENL connection.
    pub async fn from_genl(mut genl: GenlConnection<T>) -> Result<Self> {
        let family = genl.get_family(NL80211_GENL_NAME).await?;
        Ok(Self { genl, family })
    }

    /// Resolved family record.
    pub fn family(&self) -> &FamilyController {
        &self.family
    }

    pub fn genl(&self) -> &GenlConnection<T> {
        &self.genl
    }

    pub fn genl_mut(&mut self) -> &mut GenlConnection<T> {
        &mut self.genl
    }

    /// ID of the `"scan"` multicast group.
    pub fn scan_group(&self) -> Result<u32> {
        self.family.mcast_group(mcast::SCAN).ok_or_else(|| {
            ProtocolError::MissingMulticastGroup {
                family: self.family.name.clone(),
                group: mcast::SCAN.to_string(),
            }
            .into()
        })
    }

    /// Send `NL80211_CMD_TRIGGER_SCAN`.
    ///
    /// Returns the request's sequence number. The kernel answers an accepted
    /// trigger with nothing on the unicast path (no ACK is requested); a
    /// rejected one gets an `NLMSG_ERROR` carrying this number.
    pub async fn trigger_scan(&self, request: &TriggerScanRequest) -> Result<u32> {
        let mut builder = MessageBuilder::genl(
            self.family.id,
            NLM_F_REQUEST,
            Nl80211Cmd::TriggerScan as u8,
            NL80211_GENL_VERSION,
        );
        builder.attrs(&request.encode()?);

        let seq = self.genl.send_request(builder).await?;
        tracing::debug!(
            ifindex = request.ifindex,
            ssids = request.ssids.len(),
            frequencies = request.frequencies.len(),
            seq,
            "scan triggered"
        );
        Ok(seq)
    }

    /// Dump the kernel's BSS list for an interface.
    pub async fn get_scan(&self, ifindex: u32) -> Result<Vec<ScanResult>> {
        let payloads = self
            .genl
            .dump_command(
                self.family.id,
                Nl80211Cmd::GetScan as u8,
                NL80211_GENL_VERSION,
                |builder| builder.attr_u32(Nl80211Attr::Ifindex as u16, ifindex),
            )
            .await
            .map_err(|e| scan_error(e, Nl80211Cmd::GetScan))?;

        let mut results = Vec::with_capacity(payloads.len());
        for payload in &payloads {
            let (genl, attrs) = split_payload(payload)?;
            if genl.cmd != Nl80211Cmd::NewScanResults as u8 {
                tracing::trace!(cmd = genl.cmd, "skipping non-BSS record in scan dump");
                continue;
            }
            results.push(ScanResult::decode(attrs)?);
        }
        Ok(results)
    }

    /// Dump every wireless PHY.
    ///
    /// Requests the split format, which the kernel needs to describe modern
    /// hardware; fragments of one PHY are merged.
    pub async fn get_wiphys(&self) -> Result<Vec<Wiphy>> {
        let payloads = self
            .genl
            .dump_command(
                self.family.id,
                Nl80211Cmd::GetWiphy as u8,
                NL80211_GENL_VERSION,
                |builder| builder.attr_flag(Nl80211Attr::SplitWiphyDump as u16),
            )
            .await?;

        let mut wiphys: Vec<Wiphy> = Vec::new();
        for payload in &payloads {
            let (genl, attrs) = split_payload(payload)?;
            if genl.cmd != Nl80211Cmd::NewWiphy as u8 {
                continue;
            }
            let wiphy = Wiphy::decode(attrs)?;
            match wiphys.iter_mut().find(|w| w.index == wiphy.index) {
                Some(existing) => existing.merge(wiphy),
                None => wiphys.push(wiphy),
            }
        }
        Ok(wiphys)
    }

    /// Scan `ifname` and stream the networks found.
    ///
    /// With `ssid` set, the scan probes for that network specifically (useful
    /// for hidden networks); otherwise a broadcast scan is done.
    pub fn scan(self, ifname: &str, ssid: Option<Ssid>) -> ScanStream<T> {
        let mut config = ScanConfig::new(ifname);
        if let Some(ssid) = ssid {
            config = config.ssid(ssid);
        }
        self.scan_with(config)
    }

    /// Scan with explicit configuration.
    pub fn scan_with(self, config: ScanConfig) -> ScanStream<T> {
        Scanner::new(self, config).into_stream()
    }
}

/// Re-classify a kernel rejection of a scan command.
pub(crate) fn scan_error(err: Error, cmd: Nl80211Cmd) -> Error {
    match err {
        Error::Protocol(ProtocolError::Kernel { errno, .. }) => {
            ScanError::from_errno(-errno, cmd as u8).into()
        }
        other => other,
    }
}
