//! wifi scan

use std::time::{Duration, Instant};

use clap::Args;
use tokio_stream::StreamExt;
use wlink::Ssid;
use wlink::netlink::genl::nl80211::{DEFAULT_SCAN_TIMEOUT, Nl80211Connection, ScanConfig};
use wlink::output::formatting::format_duration_compact;
use wlink::output::{OutputFormat, OutputOptions, print_all};
use wlink::util::ifname;

#[derive(Args)]
pub struct ScanCmd {
    /// Wireless interface to scan on (name or index).
    interface: String,

    /// Probe for this SSID (finds hidden networks).
    #[arg(long)]
    ssid: Option<Ssid>,

    /// Seconds to wait for the scan to complete [default: library scan timeout].
    #[arg(short, long, value_parser = parse_seconds)]
    timeout: Option<Duration>,

    /// Only scan these frequencies (MHz).
    #[arg(short, long = "freq", value_name = "MHZ")]
    frequencies: Vec<u32>,
}

fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|_| format!("invalid number of seconds: {s}"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| e.to_string())
}

impl ScanCmd {
    pub async fn run(self, format: OutputFormat, opts: &OutputOptions) -> anyhow::Result<()> {
        let (name, index) = ifname::resolve(&self.interface)?;
        let timeout = self.timeout.unwrap_or(DEFAULT_SCAN_TIMEOUT);
        tracing::debug!(%name, index, ?timeout, "scanning");

        let mut config = ScanConfig::new(&name)
            .frequencies(self.frequencies)
            .timeout(timeout);
        if let Some(ssid) = self.ssid {
            config = config.ssid(ssid);
        }

        let conn = Nl80211Connection::new().await?;
        let mut networks = conn.scan_with(config);

        let token = networks.cancellation_token();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        });

        let started = Instant::now();
        let mut found = Vec::new();
        while let Some(network) = networks.next().await {
            found.push(network?);
        }

        if found.is_empty() && networks.cancellation_token().is_cancelled() {
            eprintln!("scan cancelled");
            return Ok(());
        }

        // strongest first, unknown signal last
        found.sort_by_key(|n| std::cmp::Reverse(n.signal_dbm.unwrap_or(i32::MIN)));
        print_all(&found, format, opts)?;

        if format == OutputFormat::Text && opts.details {
            eprintln!(
                "{} networks in {}",
                found.len(),
                format_duration_compact(started.elapsed())
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds("2.5").unwrap(), Duration::from_millis(2500));
        assert!(parse_seconds("-1").is_err());
        assert!(parse_seconds("soon").is_err());
    }
}
