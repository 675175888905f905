//! Printable implementation for Network.

use std::io::Write;

use crate::output::formatting::{format_frequency, signal_bars};
use crate::output::{OutputOptions, Printable};
use crate::wlan::Network;

impl Printable for Network {
    fn print_text<W: Write>(&self, w: &mut W, opts: &OutputOptions) -> std::io::Result<()> {
        write!(w, "{}", self.bssid)?;

        if opts.details {
            match (self.frequency, self.channel()) {
                (Some(freq), _) if opts.numeric => write!(w, "  {:>9}", format_frequency(freq))?,
                (_, Some(channel)) => write!(w, "  ch {:>3}", channel)?,
                _ => write!(w, "  {:>6}", "-")?,
            }
            match self.signal_dbm {
                Some(dbm) => write!(w, "  {:>4} dBm {}", dbm, signal_bars(dbm))?,
                None => write!(w, "  {:>8}", "-")?,
            }
        }

        if self.ssid.is_empty() {
            writeln!(w, "  <hidden>")
        } else {
            writeln!(w, "  {}", self.ssid)
        }
    }

    fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "bssid": self.bssid.to_string(),
            "ssid": self.ssid.to_string(),
        });

        if let Some(freq) = self.frequency {
            obj["frequency"] = serde_json::json!(freq);
        }
        if let Some(channel) = self.channel() {
            obj["channel"] = serde_json::json!(channel);
        }
        if let Some(band) = self.band() {
            obj["band"] = serde_json::json!(band);
        }
        if let Some(dbm) = self.signal_dbm {
            obj["signal_dbm"] = serde_json::json!(dbm);
        }

        obj
    }
}
