//! Formatting helpers shared by the panels

use crate::data::snapshot::Channel;
use chrono::{DateTime, Local};

/// `V_Main: 12.00 V`
pub fn format_reading(channel: Channel, value: f64, decimals: usize) -> String {
    format!(
        "{}: {:.*} {}",
        channel.name(),
        decimals,
        value,
        channel.unit().symbol()
    )
}

/// Default file name offered by the export prompt
pub fn default_export_name(now: DateTime<Local>) -> String {
    format!("power_export_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// Keep the tail of a long string so the most specific part stays visible.
pub fn truncate_left(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let tail: String = text.chars().skip(count - (max_chars - 1)).collect();
    format!("…{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_reading() {
        assert_eq!(format_reading(Channel::VMain, 12.0, 2), "V_Main: 12.00 V");
        assert_eq!(format_reading(Channel::Temp1, 31.456, 3), "Temp1: 31.456 °C");
        assert_eq!(format_reading(Channel::PProbe1, 3.6, 3), "P_Probe1: 3.600 W");
    }

    #[test]
    fn test_default_export_name() {
        let now = Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(default_export_name(now), "power_export_20250102_030405.csv");
    }

    #[test]
    fn test_truncate_left() {
        assert_eq!(truncate_left("short", 10), "short");
        assert_eq!(truncate_left("https://example.com/config.json", 12), "…config.json");
        assert_eq!(truncate_left("abc", 0), "");
    }
}
