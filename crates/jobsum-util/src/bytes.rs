//! Byte-size parsing and humanization.

const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Parse an sacct memory string to bytes.
///
/// Handles the formats sacct emits for ReqMem and MaxRSS:
/// - "16G", "4000M", "4096K" (optionally fractional, e.g. "1.5G")
/// - "16Gn" / "4000Mc" (per-node / per-core suffix on older sacct)
/// - bare numbers, taken as megabytes
///
/// Returns None for empty strings or placeholder values.
pub fn parse_memory_bytes(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() || s == "-" {
        return None;
    }

    // Strip per-node/per-core suffix first
    let s = s.trim_end_matches(['n', 'c']);

    let (number, scale) = match s.chars().last()? {
        'K' | 'k' => (&s[..s.len() - 1], 1u64 << 10),
        'M' | 'm' => (&s[..s.len() - 1], 1u64 << 20),
        'G' | 'g' => (&s[..s.len() - 1], 1u64 << 30),
        'T' | 't' => (&s[..s.len() - 1], 1u64 << 40),
        // No suffix means megabytes
        _ => (s, 1u64 << 20),
    };

    let value: f64 = number.parse().ok()?;
    Some((value * scale as f64) as u64)
}

/// Format a byte count as a human-readable size (e.g. "4.0 GB").
///
/// Uses 1024-based units with one decimal place.
pub fn format_bytes(bytes: u64) -> String {
    humanize(bytes as f64, true)
}

/// Format a plain count with K/M/G scaling but no byte unit.
///
/// Used for IOPS totals, where a "GB" suffix would be nonsense.
pub fn format_count(count: u64) -> String {
    humanize(count as f64, false)
}

fn humanize(mut value: f64, with_unit: bool) -> String {
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if with_unit {
        format!("{:.1} {}", value, UNITS[unit])
    } else if unit == 0 {
        format!("{:.1}", value)
    } else {
        // Strip the trailing "B" to get a bare K/M/G multiplier
        format!("{:.1} {}", value, &UNITS[unit][..1])
    }
}
