//! Printable row for `wifi interfaces`.

use std::io::Write;

use crate::output::{OutputOptions, Printable};

/// A network interface and whether it is wireless.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct InterfaceRow {
    pub name: String,
    pub index: u32,
    pub wireless: bool,
}

impl Printable for InterfaceRow {
    fn print_text<W: Write>(&self, w: &mut W, _opts: &OutputOptions) -> std::io::Result<()> {
        write!(w, "{}: {}", self.index, self.name)?;
        if self.wireless {
            write!(w, " <wireless>")?;
        }
        writeln!(w)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
