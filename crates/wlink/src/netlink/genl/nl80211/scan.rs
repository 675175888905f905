//! Scan orchestration.
//!
//! [`Scanner`] drives one scan through
//! `Idle -> InterfaceResolved -> ScanSubscribed -> ScanTriggered ->
//! ScanCompleted | ScanFailed -> ResultsDumped`.

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

use super::connection::Nl80211Connection;
use super::stream::ScanStream;
use super::types::{ScanResult, TriggerScanRequest, TriggerScanStatus};
use super::Nl80211Cmd;
use crate::netlink::codec::AttrRecord;
use crate::netlink::error::{Error, Result, ScanError};
use crate::netlink::genl::GenlMessage;
use crate::netlink::message::{ErrorMessage, MessageIter};
use crate::netlink::socket::{NetlinkSocket, Transport};
use crate::util::ifname::{InterfaceResolver, SysfsInterfaces};
use crate::wlan::{Network, Ssid};

/// How long to wait for the kernel to report scan completion.
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(5);

/// What to scan and for how long.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use wlink::netlink::genl::nl80211::ScanConfig;
///
/// let config = ScanConfig::new("wlan0")
///     .frequencies([2412, 2437, 2462])
///     .timeout(Duration::from_secs(10));
/// assert_eq!(config.interface(), "wlan0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    interface: String,
    ssid: Option<Ssid>,
    frequencies: Vec<u32>,
    timeout: Duration,
}

impl ScanConfig {
    /// Broadcast scan of `interface` on all frequencies.
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            ssid: None,
            frequencies: Vec::new(),
            timeout: DEFAULT_SCAN_TIMEOUT,
        }
    }

    /// Probe for a specific network (directed scan).
    pub fn ssid(mut self, ssid: Ssid) -> Self {
        self.ssid = Some(ssid);
        self
    }

    /// Add a frequency (MHz) to scan.
    pub fn frequency(mut self, mhz: u32) -> Self {
        self.frequencies.push(mhz);
        self
    }

    /// Add several frequencies (MHz) to scan.
    pub fn frequencies(mut self, mhz: impl IntoIterator<Item = u32>) -> Self {
        self.frequencies.extend(mhz);
        self
    }

    /// Bound the wait for completion.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn target_ssid(&self) -> Option<&Ssid> {
        self.ssid.as_ref()
    }

    pub fn scan_frequencies(&self) -> &[u32] {
        &self.frequencies
    }

    pub fn wait_timeout(&self) -> Duration {
        self.timeout
    }

    fn request(&self, ifindex: u32) -> TriggerScanRequest {
        let mut request = TriggerScanRequest::new(ifindex);
        if let Some(ssid) = &self.ssid {
            request.ssids = vec![ssid.clone()];
        }
        request.frequencies = self.frequencies.clone();
        request
    }
}

/// Where a [`Scanner`] is in its workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    InterfaceResolved { ifindex: u32 },
    ScanSubscribed { ifindex: u32, group: u32 },
    ScanTriggered { ifindex: u32, seq: u32 },
    ScanCompleted { ifindex: u32 },
    /// The run ended with an error; the error carries the details.
    ScanFailed,
    ResultsDumped { count: usize },
    Cancelled,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Networks found, one per BSSID.
    Completed(Vec<Network>),
    /// The caller cancelled before results were collected.
    Cancelled,
}

/// One-shot scan of one interface.
pub struct Scanner<T = NetlinkSocket> {
    conn: Nl80211Connection<T>,
    resolver: Box<dyn InterfaceResolver>,
    config: ScanConfig,
    state: ScanState,
}

impl<T> fmt::Debug for Scanner<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scanner")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Scanner<T> {
    /// Scanner resolving interfaces through sysfs.
    pub fn new(conn: Nl80211Connection<T>, config: ScanConfig) -> Self {
        Self {
            conn,
            resolver: Box::new(SysfsInterfaces),
            config,
            state: ScanState::Idle,
        }
    }

    /// Use a different interface source.
    pub fn with_resolver(mut self, resolver: impl InterfaceResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn connection(&self) -> &Nl80211Connection<T> {
        &self.conn
    }

    /// Give back the connection, e.g. to run another scan.
    pub fn into_connection(self) -> Nl80211Connection<T> {
        self.conn
    }

    /// Run lazily as a stream of networks.
    pub fn into_stream(self) -> ScanStream<T> {
        ScanStream::new(self)
    }

    /// Run the scan to completion.
    ///
    /// A scanner runs once; a second call fails with
    /// [`Error::InvalidArgument`]. Cancelling through `cancel` stops the
    /// local wait only; the kernel finishes its scan regardless.
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<ScanOutcome> {
        if self.state != ScanState::Idle {
            return Err(Error::InvalidArgument(
                "scanner has already run".to_string(),
            ));
        }

        let outcome = self.drive(cancel).await;
        match &outcome {
            Ok(ScanOutcome::Cancelled) => self.state = ScanState::Cancelled,
            Ok(ScanOutcome::Completed(_)) => {}
            Err(e) => {
                tracing::debug!(interface = %self.config.interface, error = %e, "scan failed");
                self.state = ScanState::ScanFailed;
            }
        }
        outcome
    }

    async fn drive(&mut self, cancel: &CancellationToken) -> Result<ScanOutcome> {
        let ifindex = self.resolver.index_of(&self.config.interface)?;
        self.state = ScanState::InterfaceResolved { ifindex };

        // Join before triggering so a fast completion is not missed.
        let group = self.conn.scan_group()?;
        self.conn.genl_mut().add_membership(group)?;
        self.state = ScanState::ScanSubscribed { ifindex, group };

        let waited = self.trigger_and_wait(ifindex, cancel).await;
        if let Err(e) = self.conn.genl_mut().drop_membership(group) {
            tracing::warn!(group, error = %e, "failed to leave scan multicast group");
        }
        if !waited? {
            return Ok(ScanOutcome::Cancelled);
        }
        self.state = ScanState::ScanCompleted { ifindex };

        let results = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(ScanOutcome::Cancelled),
            results = self.conn.get_scan(ifindex) => results?,
        };

        let networks = dedup_by_bssid(&results);
        tracing::debug!(
            ifindex,
            records = results.len(),
            networks = networks.len(),
            "scan results collected"
        );
        self.state = ScanState::ResultsDumped {
            count: networks.len(),
        };
        Ok(ScanOutcome::Completed(networks))
    }

    /// Trigger, then wait for the outcome. `Ok(false)` means cancelled.
    async fn trigger_and_wait(&mut self, ifindex: u32, cancel: &CancellationToken) -> Result<bool> {
        let seq = self.conn.trigger_scan(&self.config.request(ifindex)).await?;
        self.state = ScanState::ScanTriggered { ifindex, seq };

        let timeout = self.config.timeout;
        let deadline = Instant::now() + timeout;

        loop {
            let data = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(ifindex, "scan wait cancelled");
                    return Ok(false);
                }
                _ = sleep_until(deadline) => {
                    return Err(ScanError::TimedOut(timeout).into());
                }
                data = self.conn.genl().recv() => data?,
            };

            if self.completes_scan(&data, ifindex, seq)? {
                return Ok(true);
            }
        }
    }

    /// Look through one datagram received while waiting.
    fn completes_scan(&self, data: &[u8], ifindex: u32, seq: u32) -> Result<bool> {
        for result in MessageIter::new(data) {
            let (header, payload) = result?;

            if header.is_error() {
                let err = ErrorMessage::parse(header, payload)?;
                if header.nlmsg_seq != seq || err.is_ack() {
                    continue;
                }
                return Err(ScanError::from_errno(err.errno, Nl80211Cmd::TriggerScan as u8).into());
            }

            if header.nlmsg_type != self.conn.family().id {
                continue;
            }

            let msg = GenlMessage::parse(header, payload)?;
            let Some(cmd) = Nl80211Cmd::from_u8(msg.cmd()) else {
                tracing::trace!(cmd = msg.cmd(), "ignoring unknown nl80211 notification");
                continue;
            };

            let status = match TriggerScanStatus::decode(msg.attrs) {
                Ok(status) => status,
                Err(e) => {
                    tracing::trace!(?cmd, error = %e, "ignoring undecodable scan notification");
                    continue;
                }
            };
            if status.ifindex != Some(ifindex) {
                tracing::trace!(?cmd, ifindex = ?status.ifindex, "notification for another interface");
                continue;
            }

            match cmd {
                Nl80211Cmd::TriggerScan => {
                    tracing::debug!(
                        ifindex,
                        wiphy = status.wiphy,
                        frequencies = status.frequencies.len(),
                        ssids = status.ssids.len(),
                        "kernel started scan"
                    );
                }
                Nl80211Cmd::NewScanResults => return Ok(true),
                Nl80211Cmd::ScanAborted => return Err(ScanError::Aborted { ifindex }.into()),
                _ => {}
            }
        }
        Ok(false)
    }
}

/// One network per BSSID, first occurrence wins.
fn dedup_by_bssid(results: &[ScanResult]) -> Vec<Network> {
    let mut seen = HashSet::new();
    results
        .iter()
        .filter(|result| seen.insert(result.bss.bssid))
        .map(|result| result.bss.to_network())
        .collect()
}
