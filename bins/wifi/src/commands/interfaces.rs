//! wifi interfaces

use clap::Args;
use wlink::output::{InterfaceRow, OutputFormat, OutputOptions, print_all};
use wlink::util::ifname;

#[derive(Args)]
pub struct InterfacesCmd {
    /// Include interfaces that are not wireless.
    #[arg(short, long)]
    all: bool,
}

impl InterfacesCmd {
    pub fn run(self, format: OutputFormat, opts: &OutputOptions) -> anyhow::Result<()> {
        let names = if self.all {
            ifname::list_interfaces()?
        } else {
            ifname::list_wireless_interfaces()?
        };

        let mut rows = Vec::with_capacity(names.len());
        for name in names {
            // interfaces can vanish between listing and lookup
            let Ok(index) = ifname::name_to_index(&name) else {
                continue;
            };
            let wireless = ifname::is_wireless(&name);
            rows.push(InterfaceRow {
                name,
                index,
                wireless,
            });
        }
        rows.sort_by_key(|row| row.index);

        print_all(&rows, format, opts)?;
        Ok(())
    }
}
