//! A discovered wireless network.

use super::{Bssid, Ssid};

/// One access point seen by a scan.
///
/// Networks are identified by BSSID; two networks with the same SSID but
/// different BSSIDs are distinct access points.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "output", derive(serde::Serialize))]
pub struct Network {
    pub ssid: Ssid,
    pub bssid: Bssid,
    /// Center frequency in MHz.
    #[cfg_attr(feature = "output", serde(skip_serializing_if = "Option::is_none"))]
    pub frequency: Option<u32>,
    /// Signal strength in dBm.
    #[cfg_attr(feature = "output", serde(skip_serializing_if = "Option::is_none"))]
    pub signal_dbm: Option<i32>,
}

impl Network {
    pub fn new(ssid: Ssid, bssid: Bssid) -> Self {
        Self {
            ssid,
            bssid,
            frequency: None,
            signal_dbm: None,
        }
    }

    pub fn with_frequency(mut self, mhz: u32) -> Self {
        self.frequency = Some(mhz);
        self
    }

    pub fn with_signal_dbm(mut self, dbm: i32) -> Self {
        self.signal_dbm = Some(dbm);
        self
    }

    /// Channel number derived from the frequency.
    pub fn channel(&self) -> Option<u32> {
        self.frequency.and_then(frequency_to_channel)
    }

    /// Band label ("2.4GHz", "5GHz", "6GHz").
    pub fn band(&self) -> Option<&'static str> {
        match self.frequency? {
            2400..=2500 => Some("2.4GHz"),
            4900..=5899 => Some("5GHz"),
            5925..=7125 => Some("6GHz"),
            _ => None,
        }
    }
}

/// IEEE 802.11 channel number for a center frequency in MHz.
pub fn frequency_to_channel(mhz: u32) -> Option<u32> {
    match mhz {
        2484 => Some(14),
        2412..=2472 => Some((mhz - 2407) / 5),
        // 6 GHz channel 2 sits below the regular 20 MHz grid
        5935 => Some(2),
        5955..=7115 => Some((mhz - 5950) / 5),
        5000..=5900 => Some((mhz - 5000) / 5),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels() {
        assert_eq!(frequency_to_channel(2412), Some(1));
        assert_eq!(frequency_to_channel(2437), Some(6));
        assert_eq!(frequency_to_channel(2484), Some(14));
        assert_eq!(frequency_to_channel(5180), Some(36));
        assert_eq!(frequency_to_channel(5825), Some(165));
        assert_eq!(frequency_to_channel(5955), Some(1));
        assert_eq!(frequency_to_channel(5935), Some(2));
        assert_eq!(frequency_to_channel(900), None);
    }

    #[test]
    fn test_band() {
        let net = Network::new(Ssid::wildcard(), Bssid::default());
        assert_eq!(net.band(), None);
        assert_eq!(net.clone().with_frequency(2462).band(), Some("2.4GHz"));
        assert_eq!(net.clone().with_frequency(5500).band(), Some("5GHz"));
        assert_eq!(net.with_frequency(6115).band(), Some("6GHz"));
    }
}
