//! Basic Service Set Identifier.

use std::fmt;
use std::str::FromStr;

use super::ValueError;

/// 48-bit BSSID in transmitted octet order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bssid([u8; 6]);

impl Bssid {
    /// Number of octets.
    pub const LEN: usize = 6;

    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Build from a slice of exactly six octets.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        bytes.try_into().ok().map(Self)
    }

    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 6]> for Bssid {
    fn from(octets: [u8; 6]) -> Self {
        Self(octets)
    }
}

impl fmt::Display for Bssid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl FromStr for Bssid {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != Self::LEN {
            return Err(ValueError::InvalidBssid(s.to_string()));
        }

        let mut octets = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            if part.len() != 2 {
                return Err(ValueError::InvalidBssid(s.to_string()));
            }
            octets[i] =
                u8::from_str_radix(part, 16).map_err(|_| ValueError::InvalidBssid(s.to_string()))?;
        }
        Ok(Self(octets))
    }
}

#[cfg(feature = "output")]
impl serde::Serialize for Bssid {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_upper_hex() {
        let bssid = Bssid::new([0x18, 0xa6, 0xf7, 0x99, 0x81, 0x90]);
        assert_eq!(bssid.to_string(), "18:A6:F7:99:81:90");
    }

    #[test]
    fn test_parse() {
        let bssid: Bssid = "d8:c7:71:41:c1:db".parse().unwrap();
        assert_eq!(bssid.octets(), [0xd8, 0xc7, 0x71, 0x41, 0xc1, 0xdb]);
        assert_eq!(bssid.to_string(), "D8:C7:71:41:C1:DB");
    }

    #[test]
    fn test_parse_rejects() {
        for bad in ["", "D8C77141C1DB", "D8:C7:71:41:C1:DB:", "D8:C7:71:41:C1", "D8:C7:71:41:C1:G0", "D8:C7:71:41:C1:1DB"] {
            assert!(bad.parse::<Bssid>().is_err(), "{bad:?} parsed");
        }
    }

    #[test]
    fn test_from_slice() {
        assert!(Bssid::from_slice(&[1, 2, 3, 4, 5, 6]).is_some());
        assert!(Bssid::from_slice(&[1, 2, 3, 4, 5]).is_none());
    }
}
