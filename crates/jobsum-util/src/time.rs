//! Duration parsing and formatting for scheduler fields.

/// Parse a Slurm duration string to seconds.
///
/// Supports:
/// - D-HH:MM:SS (time limits with days)
/// - HH:MM:SS
/// - MM:SS
/// - seconds as a bare integer
///
/// Returns None for "UNLIMITED", placeholders, or empty strings.
pub fn parse_duration_secs(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() || s == "UNLIMITED" || s == "Partition_Limit" || s == "-" {
        return None;
    }

    // Strip fractional seconds (e.g. UserCPU "01:30:00.123")
    let s = s.split('.').next().unwrap_or(s);

    let (days, time_part) = match s.split_once('-') {
        Some((d, rest)) => (d.parse::<u64>().ok()?, rest),
        None => (0, s),
    };

    let parts: Vec<u64> = time_part
        .split(':')
        .map(|p| p.parse::<u64>())
        .collect::<Result<_, _>>()
        .ok()?;

    let seconds = match parts.len() {
        3 => parts[0] * 3600 + parts[1] * 60 + parts[2],
        2 => parts[0] * 60 + parts[1],
        1 => parts[0],
        _ => return None,
    };

    Some(days * 86400 + seconds)
}

/// Format seconds as a human-readable duration.
///
/// Examples: "1d 02:30:00", "01:30:00", "05:30".
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours >= 24 {
        let days = hours / 24;
        let hours = hours % 24;
        format!("{}d {:02}:{:02}:{:02}", days, hours, mins, secs)
    } else if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}", mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_secs() {
        assert_eq!(parse_duration_secs("1:00:00"), Some(3600));
        assert_eq!(parse_duration_secs("1-00:00:00"), Some(86400));
        assert_eq!(parse_duration_secs("30:00"), Some(1800));
        assert_eq!(parse_duration_secs("3600"), Some(3600));
        assert_eq!(parse_duration_secs("00:01:20.500"), Some(80));
        assert_eq!(parse_duration_secs("UNLIMITED"), None);
        assert_eq!(parse_duration_secs("-"), None);
        assert_eq!(parse_duration_secs(""), None);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(300), "05:00");
        assert_eq!(format_duration(5400), "01:30:00");
        assert_eq!(format_duration(93600), "1d 02:00:00");
        assert_eq!(format_duration(0), "00:00");
    }
}
