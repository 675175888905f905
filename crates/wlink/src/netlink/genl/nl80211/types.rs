//! nl80211 record types.

use super::{BssAttr, BssStatus, Nl80211Attr};
use crate::netlink::codec::{AttrRecord, AttrValue, Codec, FieldSpec, Fields};
use crate::netlink::error::AttributeError;
use crate::wlan::{Bssid, Network, Ssid, ie};

type Result<T> = std::result::Result<T, AttributeError>;

const SSID_BYTES: Codec = Codec::Bytes;
const FREQUENCY: Codec = Codec::U32;

/// One BSS as reported in `NL80211_ATTR_BSS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bss {
    pub bssid: Bssid,
    /// Center frequency in MHz.
    pub frequency: Option<u32>,
    /// Timing synchronization function value.
    pub tsf: Option<u64>,
    /// Beacon interval in time units.
    pub beacon_interval: Option<u16>,
    /// Capability information field.
    pub capability: Option<u16>,
    /// Raw information elements from the last frame received.
    pub information_elements: Vec<u8>,
    /// Signal strength in mBm (100 * dBm).
    pub signal_mbm: Option<i32>,
    /// Association status (`NL80211_BSS_STATUS_*`).
    pub status: Option<u32>,
    /// Milliseconds since the BSS was last seen.
    pub seen_ms_ago: Option<u32>,
}

impl Bss {
    /// Create a BSS record with only the mandatory fields.
    pub fn new(bssid: Bssid, information_elements: Vec<u8>) -> Self {
        Self {
            bssid,
            frequency: None,
            tsf: None,
            beacon_interval: None,
            capability: None,
            information_elements,
            signal_mbm: None,
            status: None,
            seen_ms_ago: None,
        }
    }

    /// SSID from the information elements.
    pub fn ssid(&self) -> Option<Ssid> {
        ie::find_ssid(&self.information_elements)
    }

    /// Signal strength in dBm.
    pub fn signal_dbm(&self) -> Option<i32> {
        self.signal_mbm.map(|mbm| mbm / 100)
    }

    /// Whether we are associated with this BSS.
    pub fn is_associated(&self) -> bool {
        self.status.and_then(BssStatus::from_u32) == Some(BssStatus::Associated)
    }

    /// Convert to a [`Network`]. A BSS without an SSID element is hidden.
    pub fn to_network(&self) -> Network {
        Network {
            ssid: self.ssid().unwrap_or_default(),
            bssid: self.bssid,
            frequency: self.frequency,
            signal_dbm: self.signal_dbm(),
        }
    }
}

impl AttrRecord for Bss {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("bssid", BssAttr::Bssid as u16, Codec::Bytes),
        FieldSpec::new("frequency", BssAttr::Frequency as u16, Codec::U32),
        FieldSpec::new("tsf", BssAttr::Tsf as u16, Codec::U64),
        FieldSpec::new("beacon_interval", BssAttr::BeaconInterval as u16, Codec::U16),
        FieldSpec::new("capability", BssAttr::Capability as u16, Codec::U16),
        FieldSpec::new(
            "information_elements",
            BssAttr::InformationElements as u16,
            Codec::Bytes,
        ),
        FieldSpec::new("signal_mbm", BssAttr::SignalMbm as u16, Codec::S32),
        FieldSpec::new("status", BssAttr::Status as u16, Codec::U32),
        FieldSpec::new("seen_ms_ago", BssAttr::SeenMsAgo as u16, Codec::U32),
    ];

    fn from_fields(fields: &Fields) -> Result<Self> {
        let raw = fields.bytes("bssid")?;
        let bssid = Bssid::from_slice(raw).ok_or(AttributeError::ValueCorrupted {
            name: "bssid",
            expected: Bssid::LEN,
            actual: raw.len(),
        })?;

        Ok(Self {
            bssid,
            frequency: fields.opt_u32("frequency")?,
            tsf: fields.opt_u64("tsf")?,
            beacon_interval: fields.opt_u16("beacon_interval")?,
            capability: fields.opt_u16("capability")?,
            information_elements: fields
                .opt_bytes("information_elements")?
                .map(<[u8]>::to_vec)
                .unwrap_or_default(),
            signal_mbm: fields.opt_s32("signal_mbm")?,
            status: fields.opt_u32("status")?,
            seen_ms_ago: fields.opt_u32("seen_ms_ago")?,
        })
    }

    fn to_fields(&self) -> Fields {
        Fields::new()
            .with("bssid", AttrValue::Bytes(self.bssid.as_bytes().to_vec()))
            .with_opt("frequency", self.frequency.map(AttrValue::U32))
            .with_opt("tsf", self.tsf.map(AttrValue::U64))
            .with_opt("beacon_interval", self.beacon_interval.map(AttrValue::U16))
            .with_opt("capability", self.capability.map(AttrValue::U16))
            .with(
                "information_elements",
                AttrValue::Bytes(self.information_elements.clone()),
            )
            .with_opt("signal_mbm", self.signal_mbm.map(AttrValue::S32))
            .with_opt("status", self.status.map(AttrValue::U32))
            .with_opt("seen_ms_ago", self.seen_ms_ago.map(AttrValue::U32))
    }
}

const BSS: Codec = Codec::Record(Bss::FIELDS);

/// One `NL80211_CMD_NEW_SCAN_RESULTS` record from a `GET_SCAN` dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub ifindex: u32,
    /// Scan generation; changes whenever the BSS list changes.
    pub generation: u32,
    /// Wireless device identifier.
    pub wdev: Option<u64>,
    pub bss: Bss,
}

impl AttrRecord for ScanResult {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("ifindex", Nl80211Attr::Ifindex as u16, Codec::U32),
        FieldSpec::new("generation", Nl80211Attr::Generation as u16, Codec::U32),
        FieldSpec::new("wdev", Nl80211Attr::Wdev as u16, Codec::U64),
        FieldSpec::new("bss", Nl80211Attr::Bss as u16, BSS),
    ];

    fn from_fields(fields: &Fields) -> Result<Self> {
        Ok(Self {
            ifindex: fields.u32("ifindex")?,
            generation: fields.u32("generation")?,
            wdev: fields.opt_u64("wdev")?,
            bss: Bss::from_fields(fields.record("bss")?)?,
        })
    }

    fn to_fields(&self) -> Fields {
        Fields::new()
            .with("ifindex", AttrValue::U32(self.ifindex))
            .with("generation", AttrValue::U32(self.generation))
            .with_opt("wdev", self.wdev.map(AttrValue::U64))
            .with("bss", AttrValue::Record(self.bss.to_fields()))
    }
}

fn ssids_from(fields: &Fields, name: &'static str) -> Result<Vec<Ssid>> {
    let Some(items) = fields.opt_array(name)? else {
        return Ok(Vec::new());
    };
    items
        .iter()
        .map(|item| {
            let bytes = item
                .as_bytes()
                .ok_or(AttributeError::UnexpectedValue { name })?;
            Ssid::new(bytes).map_err(|_| AttributeError::ValueCorrupted {
                name,
                expected: Ssid::MAX_LEN,
                actual: bytes.len(),
            })
        })
        .collect()
}

fn frequencies_from(fields: &Fields, name: &'static str) -> Result<Vec<u32>> {
    let Some(items) = fields.opt_array(name)? else {
        return Ok(Vec::new());
    };
    items
        .iter()
        .map(|item| item.as_u32().ok_or(AttributeError::UnexpectedValue { name }))
        .collect()
}

fn ssids_value(ssids: &[Ssid]) -> AttrValue {
    AttrValue::Array(
        ssids
            .iter()
            .map(|s| AttrValue::Bytes(s.as_bytes().to_vec()))
            .collect(),
    )
}

fn frequencies_value(frequencies: &[u32]) -> AttrValue {
    AttrValue::Array(frequencies.iter().map(|f| AttrValue::U32(*f)).collect())
}

/// Scan notification multicast on the `"scan"` group.
///
/// The kernel sends the same attribute set with `TRIGGER_SCAN` (scan
/// started), `NEW_SCAN_RESULTS` (scan finished) and `SCAN_ABORTED`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerScanStatus {
    pub wiphy: u32,
    /// Absent for scans on a wdev without a netdev (e.g. P2P device).
    pub ifindex: Option<u32>,
    pub wdev: Option<u64>,
    /// SSIDs probed; an empty SSID is the wildcard.
    pub ssids: Vec<Ssid>,
    /// Frequencies scanned, in MHz.
    pub frequencies: Vec<u32>,
}

impl AttrRecord for TriggerScanStatus {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("wiphy", Nl80211Attr::Wiphy as u16, Codec::U32),
        FieldSpec::new("ifindex", Nl80211Attr::Ifindex as u16, Codec::U32),
        FieldSpec::new("wdev", Nl80211Attr::Wdev as u16, Codec::U64),
        FieldSpec::new("ssids", Nl80211Attr::ScanSsids as u16, Codec::Array(&SSID_BYTES)),
        FieldSpec::new(
            "frequencies",
            Nl80211Attr::ScanFrequencies as u16,
            Codec::Array(&FREQUENCY),
        ),
    ];

    fn from_fields(fields: &Fields) -> Result<Self> {
        Ok(Self {
            wiphy: fields.u32("wiphy")?,
            ifindex: fields.opt_u32("ifindex")?,
            wdev: fields.opt_u64("wdev")?,
            ssids: ssids_from(fields, "ssids")?,
            frequencies: frequencies_from(fields, "frequencies")?,
        })
    }

    fn to_fields(&self) -> Fields {
        Fields::new()
            .with("wiphy", AttrValue::U32(self.wiphy))
            .with_opt("ifindex", self.ifindex.map(AttrValue::U32))
            .with_opt("wdev", self.wdev.map(AttrValue::U64))
            .with("ssids", ssids_value(&self.ssids))
            .with("frequencies", frequencies_value(&self.frequencies))
    }
}

/// Attributes of an `NL80211_CMD_TRIGGER_SCAN` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerScanRequest {
    pub ifindex: u32,
    /// SSIDs to probe for. `[Ssid::wildcard()]` is a broadcast scan.
    pub ssids: Vec<Ssid>,
    /// Restrict the scan to these frequencies (MHz). Empty scans all.
    pub frequencies: Vec<u32>,
}

impl TriggerScanRequest {
    /// Broadcast scan on every supported frequency.
    pub fn new(ifindex: u32) -> Self {
        Self {
            ifindex,
            ssids: vec![Ssid::wildcard()],
            frequencies: Vec::new(),
        }
    }
}

impl AttrRecord for TriggerScanRequest {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("ifindex", Nl80211Attr::Ifindex as u16, Codec::U32),
        FieldSpec::new("ssids", Nl80211Attr::ScanSsids as u16, Codec::Array(&SSID_BYTES)),
        FieldSpec::new(
            "frequencies",
            Nl80211Attr::ScanFrequencies as u16,
            Codec::Array(&FREQUENCY),
        ),
    ];

    fn from_fields(fields: &Fields) -> Result<Self> {
        Ok(Self {
            ifindex: fields.u32("ifindex")?,
            ssids: ssids_from(fields, "ssids")?,
            frequencies: frequencies_from(fields, "frequencies")?,
        })
    }

    fn to_fields(&self) -> Fields {
        let frequencies =
            (!self.frequencies.is_empty()).then(|| frequencies_value(&self.frequencies));
        Fields::new()
            .with("ifindex", AttrValue::U32(self.ifindex))
            .with("ssids", ssids_value(&self.ssids))
            .with_opt("frequencies", frequencies)
    }
}

/// A wireless PHY (`NL80211_CMD_NEW_WIPHY`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wiphy {
    pub index: u32,
    pub name: String,
    pub generation: Option<u32>,
    /// Maximum SSIDs per scan request.
    pub max_scan_ssids: Option<u8>,
    /// Maximum extra IE bytes per scan request.
    pub max_scan_ie_len: Option<u16>,
}

impl Wiphy {
    /// Fold a later fragment of a split wiphy dump into this record.
    pub fn merge(&mut self, other: Wiphy) {
        self.generation = self.generation.or(other.generation);
        self.max_scan_ssids = self.max_scan_ssids.or(other.max_scan_ssids);
        self.max_scan_ie_len = self.max_scan_ie_len.or(other.max_scan_ie_len);
    }
}

impl AttrRecord for Wiphy {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("index", Nl80211Attr::Wiphy as u16, Codec::U32),
        FieldSpec::new("name", Nl80211Attr::WiphyName as u16, Codec::Str),
        FieldSpec::new("generation", Nl80211Attr::Generation as u16, Codec::U32),
        FieldSpec::new(
            "max_scan_ssids",
            Nl80211Attr::MaxNumScanSsids as u16,
            Codec::U8,
        ),
        FieldSpec::new(
            "max_scan_ie_len",
            Nl80211Attr::MaxScanIeLen as u16,
            Codec::U16,
        ),
    ];

    fn from_fields(fields: &Fields) -> Result<Self> {
        Ok(Self {
            index: fields.u32("index")?,
            name: fields.str("name")?.to_owned(),
            generation: fields.opt_u32("generation")?,
            max_scan_ssids: fields.opt_u8("max_scan_ssids")?,
            max_scan_ie_len: fields.opt_u16("max_scan_ie_len")?,
        })
    }

    fn to_fields(&self) -> Fields {
        Fields::new()
            .with("index", AttrValue::U32(self.index))
            .with("name", AttrValue::Str(self.name.clone()))
            .with_opt("generation", self.generation.map(AttrValue::U32))
            .with_opt("max_scan_ssids", self.max_scan_ssids.map(AttrValue::U8))
            .with_opt("max_scan_ie_len", self.max_scan_ie_len.map(AttrValue::U16))
    }
}
