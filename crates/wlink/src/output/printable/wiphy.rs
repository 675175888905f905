//! Printable implementation for Wiphy.

use std::io::Write;

use crate::netlink::genl::nl80211::Wiphy;
use crate::output::{OutputOptions, Printable};

impl Printable for Wiphy {
    fn print_text<W: Write>(&self, w: &mut W, opts: &OutputOptions) -> std::io::Result<()> {
        write!(w, "phy#{} {}", self.index, self.name)?;

        if let Some(ssids) = self.max_scan_ssids {
            write!(w, " max_scan_ssids {}", ssids)?;
        }
        if let Some(ie_len) = self.max_scan_ie_len {
            write!(w, " max_scan_ie_len {}", ie_len)?;
        }
        if opts.details
            && let Some(generation) = self.generation
        {
            write!(w, " generation {}", generation)?;
        }

        writeln!(w)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "index": self.index,
            "name": self.name,
            "generation": self.generation,
            "max_scan_ssids": self.max_scan_ssids,
            "max_scan_ie_len": self.max_scan_ie_len,
        })
    }
}
