//! wifi wiphy

use clap::Args;
use wlink::netlink::genl::nl80211::Nl80211Connection;
use wlink::output::{OutputFormat, OutputOptions, print_all};

#[derive(Args)]
pub struct WiphyCmd {
    /// Only show this PHY (e.g. phy0).
    name: Option<String>,
}

impl WiphyCmd {
    pub async fn run(self, format: OutputFormat, opts: &OutputOptions) -> anyhow::Result<()> {
        let conn = Nl80211Connection::new().await?;
        let mut wiphys = conn.get_wiphys().await?;

        if let Some(name) = &self.name {
            wiphys.retain(|w| &w.name == name);
            if wiphys.is_empty() {
                anyhow::bail!("no such wiphy: {name}");
            }
        }

        print_all(&wiphys, format, opts)?;
        Ok(())
    }
}
