//! Display formatting for decoded layout values
//!
//! Pure functions: sizes, grouped counters, reference numbers, timestamps and
//! flag sets turned into the strings shown in the value column.

use crate::ntfs::structs::{
    filetime_to_datetime, AttributeType, FILE_LAYOUT_NAME_ENTRY_DOS,
    FILE_LAYOUT_NAME_ENTRY_PRIMARY, STREAM_LAYOUT_ENTRY_HAS_INFORMATION,
    STREAM_LAYOUT_ENTRY_IMMOVABLE, STREAM_LAYOUT_ENTRY_NO_CLUSTERS_ALLOCATED,
    STREAM_LAYOUT_ENTRY_PINNED, STREAM_LAYOUT_ENTRY_RESIDENT,
};
use chrono::{DateTime, TimeZone, Utc};
use indicatif::HumanDuration;
use std::fmt::Display;

/// Format bytes as human-readable string
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let exp = (bytes as f64).log(1024.0).floor() as usize;
    let exp = exp.min(UNITS.len() - 1);
    let size = bytes as f64 / 1024_f64.powi(exp as i32);

    if exp == 0 {
        format!("{} B", bytes)
    } else {
        let text = format!("{:.2}", size);
        let text = text.trim_end_matches('0').trim_end_matches('.');
        format!("{} {}", text, UNITS[exp])
    }
}

/// Decimal with thousands separators: `1234567` -> `1,234,567`
pub fn format_grouped(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}

/// Reference numbers are shown in decimal and hex
pub fn format_reference(value: u64) -> String {
    format!("{} (0x{:x})", value, value)
}

/// Render a FILETIME as `"<date>, <time> (<span> ago)"` in the given zone.
///
/// Times later than `now` clamp to a zero span.
pub fn format_relative_time<Tz>(filetime: i64, now: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let time = filetime_to_datetime(filetime);
    let span = (now - time).to_std().unwrap_or_default();
    let local = time.with_timezone(tz);

    format!(
        "{} ({} ago)",
        local.format("%A, %B %-d, %Y, %I:%M:%S %p"),
        HumanDuration(span)
    )
}

/// Label for a hard-link name entry, from its name-kind flags
pub fn name_flags_to_string(flags: u32) -> &'static str {
    if flags == 0 {
        return "HLINK Name";
    }

    if flags & FILE_LAYOUT_NAME_ENTRY_PRIMARY != 0 {
        return "NTFS Name";
    }

    if flags & FILE_LAYOUT_NAME_ENTRY_DOS != 0 {
        return "DOS Name";
    }

    "UNKNOWN"
}

/// Stream entry flags as `"Resident, Pinned (0x6)"`; `"(0x0)"` when none are set
pub fn stream_flags_to_string(flags: u32) -> String {
    const NAMES: &[(u32, &str)] = &[
        (STREAM_LAYOUT_ENTRY_IMMOVABLE, "Immovable"),
        (STREAM_LAYOUT_ENTRY_PINNED, "Pinned"),
        (STREAM_LAYOUT_ENTRY_RESIDENT, "Resident"),
        (STREAM_LAYOUT_ENTRY_NO_CLUSTERS_ALLOCATED, "No clusters allocated"),
        (STREAM_LAYOUT_ENTRY_HAS_INFORMATION, "Has parsed information"),
    ];

    let set: Vec<&str> = NAMES
        .iter()
        .filter(|(bit, _)| flags & bit != 0)
        .map(|(_, name)| *name)
        .collect();

    if set.is_empty() {
        format!("(0x{:x})", flags)
    } else {
        format!("{} (0x{:x})", set.join(", "), flags)
    }
}

/// Display name of a stream: its identifier, or a synthetic `::$TYPE` name
/// for unnamed streams
pub fn stream_display_name(type_code: u32, identifier: &str) -> String {
    if !identifier.is_empty() {
        return identifier.to_string();
    }

    match AttributeType::from_u32(type_code) {
        Some(kind) => format!("::{}", kind.as_str()),
        None => format!("::0x{:x}", type_code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ntfs::structs::FILETIME_UNIX_EPOCH;

    #[test]
    fn sizes_trim_trailing_zeros() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(4096), "4 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(3 * 1024 * 1024 + 1024 * 256), "3.25 MB");
    }

    #[test]
    fn grouping_inserts_separators() {
        assert_eq!(format_grouped(0), "0");
        assert_eq!(format_grouped(999), "999");
        assert_eq!(format_grouped(1000), "1,000");
        assert_eq!(format_grouped(1234567), "1,234,567");
    }

    #[test]
    fn references_show_decimal_and_hex() {
        assert_eq!(format_reference(255), "255 (0xff)");
    }

    #[test]
    fn stream_flags_without_bits_have_no_separator() {
        assert_eq!(stream_flags_to_string(0), "(0x0)");
    }

    #[test]
    fn stream_flags_join_names_in_order() {
        let flags = STREAM_LAYOUT_ENTRY_RESIDENT | STREAM_LAYOUT_ENTRY_IMMOVABLE;
        assert_eq!(stream_flags_to_string(flags), "Immovable, Resident (0x5)");
        assert_eq!(stream_flags_to_string(0x40), "(0x40)");
    }

    #[test]
    fn name_kinds() {
        assert_eq!(name_flags_to_string(0), "HLINK Name");
        assert_eq!(name_flags_to_string(FILE_LAYOUT_NAME_ENTRY_PRIMARY), "NTFS Name");
        assert_eq!(
            name_flags_to_string(FILE_LAYOUT_NAME_ENTRY_PRIMARY | FILE_LAYOUT_NAME_ENTRY_DOS),
            "NTFS Name"
        );
        assert_eq!(name_flags_to_string(FILE_LAYOUT_NAME_ENTRY_DOS), "DOS Name");
        assert_eq!(name_flags_to_string(0x10), "UNKNOWN");
    }

    #[test]
    fn unnamed_streams_get_synthetic_names() {
        assert_eq!(stream_display_name(0x80, ""), "::$DATA");
        assert_eq!(stream_display_name(0x90, ""), "::$INDEX_ROOT");
        assert_eq!(stream_display_name(0x80, ":Zone.Identifier:$DATA"), ":Zone.Identifier:$DATA");
    }

    #[test]
    fn relative_time_renders_date_and_span() {
        // 2021-01-01 00:00:00 UTC
        let filetime = FILETIME_UNIX_EPOCH + 1_609_459_200 * 10_000_000;
        let now = Utc.with_ymd_and_hms(2021, 1, 3, 0, 0, 0).unwrap();

        let text = format_relative_time(filetime, now, &Utc);
        assert!(text.starts_with("Friday, January 1, 2021, 12:00:00 AM ("));
        assert!(text.ends_with(" ago)"));
    }

    #[test]
    fn future_times_clamp_to_zero_span() {
        let now = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let filetime = FILETIME_UNIX_EPOCH + 1_609_459_200 * 10_000_000;

        let text = format_relative_time(filetime, now, &Utc);
        assert!(text.starts_with("Friday, January 1, 2021"));
        assert!(text.ends_with(" ago)"));
    }
}
