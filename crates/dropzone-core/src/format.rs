//! Human-readable formatting for sizes and timestamps.

use chrono::{DateTime, Utc};

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Format a byte count with binary units and at most one decimal,
/// e.g. `0 Bytes`, `512 Bytes`, `1.5 KB`, `50 MB`.
///
/// Values past the gigabyte range stay in GB.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut divisor = 1u64;
    while unit + 1 < SIZE_UNITS.len() && bytes >= divisor * 1024 {
        divisor *= 1024;
        unit += 1;
    }

    let value = bytes as f64 / divisor as f64;
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{} {}", rounded as u64, SIZE_UNITS[unit])
    } else {
        format!("{:.1} {}", rounded, SIZE_UNITS[unit])
    }
}

/// Format an upload timestamp as `Oct 18, 2026, 02:05 PM` (UTC).
pub fn format_uploaded_at(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%b %-d, %Y, %I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(2 * 1024 * 1024), "2 MB");
        assert_eq!(format_file_size(50 * 1024 * 1024), "50 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3 GB");
        assert_eq!(format_file_size(5000 * 1024 * 1024 * 1024), "5000 GB");
    }

    #[test]
    fn test_format_rounds_to_one_decimal() {
        // 1.25 KB rounds half away from zero
        assert_eq!(format_file_size(1280), "1.3 KB");
        assert_eq!(format_file_size(1023), "1023 Bytes");
    }

    #[test]
    fn test_format_uploaded_at() {
        let ts = Utc.with_ymd_and_hms(2026, 10, 18, 14, 5, 0).unwrap();
        assert_eq!(format_uploaded_at(&ts), "Oct 18, 2026, 02:05 PM");
    }
}
