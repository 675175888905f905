//! Shared formatting utilities for CLI output.
//!
//! # Example
//!
//! ```
//! use wlink::output::formatting::{format_duration_compact, format_frequency, signal_bars};
//! use std::time::Duration;
//!
//! assert_eq!(format_frequency(2437), "2.437 GHz");
//! assert_eq!(signal_bars(-48), "▂▄▆█");
//! assert_eq!(format_duration_compact(Duration::from_millis(2300)), "2.3s");
//! ```

use std::time::Duration;

/// Format a duration compactly.
///
/// Sub-minute durations keep one decimal; longer ones are split into units.
///
/// # Example
///
/// ```
/// use wlink::output::formatting::format_duration_compact;
/// use std::time::Duration;
///
/// assert_eq!(format_duration_compact(Duration::from_millis(0)), "0ms");
/// assert_eq!(format_duration_compact(Duration::from_millis(850)), "850ms");
/// assert_eq!(format_duration_compact(Duration::from_secs(45)), "45.0s");
/// assert_eq!(format_duration_compact(Duration::from_secs(90)), "1m 30s");
/// assert_eq!(format_duration_compact(Duration::from_secs(3661)), "1h 1m 1s");
/// ```
pub fn format_duration_compact(duration: Duration) -> String {
    let total_secs = duration.as_secs();

    if total_secs == 0 {
        return format!("{}ms", duration.subsec_millis());
    }
    if total_secs < 60 {
        return format!("{:.1}s", duration.as_secs_f64());
    }

    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    let mut parts = Vec::new();

    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if seconds > 0 {
        parts.push(format!("{}s", seconds));
    }

    parts.join(" ")
}

/// Format a frequency in MHz as GHz.
pub fn format_frequency(mhz: u32) -> String {
    format!("{}.{:03} GHz", mhz / 1000, mhz % 1000)
}

/// Four-step signal strength indicator.
pub fn signal_bars(dbm: i32) -> &'static str {
    match dbm {
        d if d >= -55 => "▂▄▆█",
        d if d >= -67 => "▂▄▆_",
        d if d >= -78 => "▂▄__",
        d if d >= -89 => "▂___",
        _ => "____",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_compact() {
        assert_eq!(format_duration_compact(Duration::from_millis(12)), "12ms");
        assert_eq!(format_duration_compact(Duration::from_millis(2300)), "2.3s");
        assert_eq!(format_duration_compact(Duration::from_secs(60)), "1m");
        assert_eq!(format_duration_compact(Duration::from_secs(3600)), "1h");
        assert_eq!(
            format_duration_compact(Duration::from_secs(3661)),
            "1h 1m 1s"
        );
    }

    #[test]
    fn test_format_frequency() {
        assert_eq!(format_frequency(5180), "5.180 GHz");
        assert_eq!(format_frequency(2412), "2.412 GHz");
    }

    #[test]
    fn test_signal_bars() {
        assert_eq!(signal_bars(-30), "▂▄▆█");
        assert_eq!(signal_bars(-60), "▂▄▆_");
        assert_eq!(signal_bars(-70), "▂▄__");
        assert_eq!(signal_bars(-85), "▂___");
        assert_eq!(signal_bars(-95), "____");
    }
}
