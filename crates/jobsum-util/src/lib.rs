//! Shared parsing and formatting helpers for jobsum.
//!
//! Scheduler-output parsing lives here so the sacct client stays thin,
//! and all report formatting (byte sizes, durations, bars, tables) is
//! kept as stateless functions that the renderer tests can assert on
//! character for character.

pub mod bar;
pub mod bytes;
pub mod command;
pub mod table;
pub mod time;

pub use bar::{BarStyle, percentage_bar};
pub use bytes::{format_bytes, format_count, parse_memory_bytes};
pub use command::{CommandError, run_command};
pub use table::render_table;
pub use time::{format_duration, parse_duration_secs};

/// Split a pipe-delimited sacct line and validate field count.
pub fn split_delimited(line: &str, min_fields: usize) -> Result<Vec<&str>, String> {
    let fields: Vec<&str> = line.split('|').collect();
    if fields.len() < min_fields {
        return Err(format!(
            "Expected {} fields, got {}: {}",
            min_fields,
            fields.len(),
            line
        ));
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_delimited() {
        let line = "a|b|c|d";
        assert_eq!(split_delimited(line, 4).unwrap(), vec!["a", "b", "c", "d"]);
        assert!(split_delimited(line, 5).is_err());
    }
}
