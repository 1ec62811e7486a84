//! Bordered text report rendering.
//!
//! Pure functions over a finished [`JobSummary`]; no external queries
//! happen here, and the framing is character-exact for testing.

use crate::summary::JobSummary;
use jobsum_util::{BarStyle, format_bytes, format_count, format_duration, percentage_bar, render_table};

/// Width of the label column on the bar lines.
const HEADING_WIDTH: usize = 14;

const NO_DATA: &str = "No data available";

/// Display paths for the Lustre filesystem short names telemetry uses.
const FS_PATHS: &[(&str, &str)] = &[
    ("dagg", "/fred"),
    ("home", "/home"),
    ("apps", "/apps"),
    ("images", "OS"),
];

/// Render the full framed report.
pub fn render(summary: &JobSummary) -> String {
    let mut lines = vec![
        mem_line(summary),
        cpu_line(summary),
        time_line(summary),
        String::new(),
    ];
    lines.extend(lustre_lines(summary));
    lines.extend(warnings_lines(&summary.warnings));

    let title = format!("Job Summary: {} ({})", summary.job_id, summary.state);
    frame(&title, &lines)
}

fn labelled(name: &str, content: &str) -> String {
    format!("{:<width$}{}", name, content, width = HEADING_WIDTH)
}

fn mem_line(summary: &JobSummary) -> String {
    let content = match summary.max_mem_bytes {
        Some(max) if summary.req_mem_bytes > 0 => format!(
            "{} ({} peak / {})",
            percentage_bar(max as f64 / summary.req_mem_bytes as f64, BarStyle::Block),
            format_bytes(max),
            format_bytes(summary.req_mem_bytes),
        ),
        _ => NO_DATA.to_string(),
    };
    labelled("Memory (RAM)", &content)
}

fn cpu_line(summary: &JobSummary) -> String {
    let content = match summary.avg_cpu_percent {
        Some(avg) => format!("{} average", percentage_bar(avg / 100.0, BarStyle::Block)),
        None => NO_DATA.to_string(),
    };
    labelled("CPU", &content)
}

fn time_line(summary: &JobSummary) -> String {
    let content = match summary.time_limit_seconds {
        Some(limit) if limit > 0 => format!(
            "{} ({} / {})",
            percentage_bar(
                summary.elapsed_seconds as f64 / limit as f64,
                BarStyle::Arrow
            ),
            format_duration(summary.elapsed_seconds),
            format_duration(limit),
        ),
        _ => NO_DATA.to_string(),
    };
    labelled("Time", &content)
}

fn lustre_lines(summary: &JobSummary) -> Vec<String> {
    let mut lines = vec!["Lustre Filesystem:".to_string()];

    match &summary.lustre_stats {
        None => lines.push(format!("  {NO_DATA}")),
        Some(stats) => {
            let rows: Vec<Vec<String>> = stats
                .iter()
                .map(|(fs, usage)| {
                    vec![
                        display_path(fs).to_string(),
                        format_bytes(usage.total_read),
                        format_bytes(usage.total_write),
                        format_count(usage.total_iops),
                    ]
                })
                .collect();

            let table = render_table(&["Path", "Total Read", "Total Write", "Total IOPS"], &rows);
            lines.extend(table.lines().map(|l| format!("  {l}")));
        }
    }

    lines
}

/// Map a telemetry filesystem short name to its mount path.
///
/// Telemetry should only ever report the enumerated names; an unknown
/// one is rendered as-is with a warning rather than aborting the
/// report.
fn display_path(fs: &str) -> &str {
    match FS_PATHS.iter().find(|(name, _)| *name == fs) {
        Some((_, path)) => path,
        None => {
            tracing::warn!("Unknown Lustre filesystem in telemetry: {}", fs);
            fs
        }
    }
}

fn warnings_lines(warnings: &[String]) -> Vec<String> {
    if warnings.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![String::new(), "Warnings:".to_string()];
    lines.extend(warnings.iter().map(|w| format!("  - {w}")));
    lines
}

/// Enclose the content lines in a +---+ border with the title centered
/// in the top edge (extra dash on the right when the padding is odd).
fn frame(title: &str, lines: &[String]) -> String {
    let max_len = lines
        .iter()
        .map(|l| l.len())
        .max()
        .unwrap_or(0)
        .max(title.len());

    let ndash = max_len - title.len();
    let ldashes = "-".repeat(ndash / 2);
    let rdashes = "-".repeat(ndash / 2 + ndash % 2);

    let mut framed = Vec::with_capacity(lines.len() + 2);
    framed.push(format!("+{ldashes} {title} {rdashes}+"));
    for line in lines {
        framed.push(format!("| {:<max_len$} |", line));
    }
    framed.push(format!("+{}+", "-".repeat(max_len + 2)));

    framed.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::ResolvedJob;
    use crate::summary::{LustreUsage, summarize};
    use jobsum_influx::{FieldSeries, JobstatsData, MetricsSource};
    use jobsum_slurm::{JobRecord, JobState, JobStats, StepStats};
    use std::collections::BTreeMap;

    const GIB: u64 = 1024 * 1024 * 1024;

    fn base_summary() -> JobSummary {
        JobSummary {
            job_id: "123".to_string(),
            state: JobState::Completed,
            req_mem_bytes: 8 * GIB,
            max_mem_bytes: Some(4 * GIB),
            elapsed_seconds: 300,
            time_limit_seconds: Some(36000),
            avg_cpu_percent: Some(80.0),
            lustre_stats: None,
            warnings: vec![],
        }
    }

    #[test]
    fn test_mem_line() {
        assert_eq!(
            mem_line(&base_summary()),
            "Memory (RAM)  [##########..........] 50.0% (4.0 GB peak / 8.0 GB)"
        );
    }

    #[test]
    fn test_mem_line_no_data() {
        let mut summary = base_summary();
        summary.max_mem_bytes = None;
        assert_eq!(mem_line(&summary), "Memory (RAM)  No data available");

        // Unstarted job: requested is zero, no ratio to draw
        let mut summary = base_summary();
        summary.req_mem_bytes = 0;
        assert_eq!(mem_line(&summary), "Memory (RAM)  No data available");
    }

    #[test]
    fn test_cpu_line() {
        assert_eq!(
            cpu_line(&base_summary()),
            "CPU           [################....] 80.0% average"
        );
    }

    #[test]
    fn test_time_line_uses_arrow_style() {
        let mut summary = base_summary();
        summary.elapsed_seconds = 18000;
        assert_eq!(
            time_line(&summary),
            "Time          [=========>..........] 50.0% (05:00:00 / 10:00:00)"
        );
    }

    #[test]
    fn test_lustre_no_data() {
        let lines = lustre_lines(&base_summary());
        assert_eq!(lines, vec!["Lustre Filesystem:", "  No data available"]);
    }

    #[test]
    fn test_lustre_table_rows_and_unknown_fs() {
        let mut stats = BTreeMap::new();
        stats.insert(
            "dagg".to_string(),
            LustreUsage {
                total_read: 4 * GIB,
                total_write: 1024 * 1024,
                total_iops: 2048,
            },
        );
        stats.insert("scratch2".to_string(), LustreUsage::default());

        let mut summary = base_summary();
        summary.lustre_stats = Some(stats);

        let lines = lustre_lines(&summary);
        assert_eq!(lines[0], "Lustre Filesystem:");
        assert_eq!(lines[1], "  Path      Total Read  Total Write  Total IOPS");
        assert_eq!(lines[2], "  --------  ----------  -----------  ----------");
        assert_eq!(lines[3], "  /fred     4.0 GB      1.0 MB       2.0 K");
        // Unknown short names render as-is instead of failing the report
        assert_eq!(lines[4], "  scratch2  0.0 B       0.0 B        0.0");
    }

    #[test]
    fn test_warnings_section_omitted_when_empty() {
        assert!(warnings_lines(&[]).is_empty());
    }

    #[test]
    fn test_warnings_section() {
        let lines = warnings_lines(&[
            "Too much memory requested".to_string(),
            "CPU usage is low".to_string(),
        ]);
        assert_eq!(
            lines,
            vec![
                "",
                "Warnings:",
                "  - Too much memory requested",
                "  - CPU usage is low"
            ]
        );
    }

    #[test]
    fn test_frame_short_title() {
        let framed = frame("T", &["abcdefghij".to_string()]);
        let expected = "\
+---- T -----+
| abcdefghij |
+------------+";
        assert_eq!(framed, expected);
    }

    #[test]
    fn test_frame_title_longer_than_content() {
        let framed = frame("A much longer title", &["short".to_string()]);
        let lines: Vec<&str> = framed.lines().collect();
        assert_eq!(lines[0], "+ A much longer title +");
        assert_eq!(lines[1], "| short               |");
        assert_eq!(lines[2], "+---------------------+");
        // All rows share one width
        assert!(lines.iter().all(|l| l.len() == lines[0].len()));
    }

    #[test]
    fn test_frame_odd_padding_dash_goes_right() {
        // Content width 8, title width 5: three dashes to distribute
        let framed = frame("title", &["12345678".to_string()]);
        let top = framed.lines().next().unwrap();
        assert_eq!(top, "+- title --+");
    }

    /// Canned metrics gateway for the end-to-end test.
    struct StubMetrics(JobstatsData);

    impl MetricsSource for StubMetrics {
        async fn peak_memory(&self, _id: &str, _window: &str) -> Option<u64> {
            None
        }

        async fn average_cpu(&self, _id: &str) -> Option<f64> {
            None
        }

        async fn lustre_jobstats(&self, _id: &str) -> Option<JobstatsData> {
            Some(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_end_to_end_report() {
        // Finished job: 16 GiB over 2 nodes, 3 GiB peak, 80s user CPU of
        // 100s CPU time, 300s elapsed of a 600 minute limit.
        let record = JobRecord {
            id: 123,
            state: JobState::Completed,
            req_mem_bytes: 16 * GIB,
            num_nodes: 2,
            elapsed_seconds: Some(300),
            time_limit_minutes: Some(600),
            array_job_id: None,
            array_task_id: None,
            stats: JobStats {
                max_resident_memory: 3 * GIB,
                elapsed_cpu_time: 100,
            },
            steps: vec![StepStats {
                name: "123.batch".to_string(),
                user_cpu_seconds: 80,
            }],
        };
        let resolved = ResolvedJob {
            user_id: "123".to_string(),
            metrics_id: "123".to_string(),
            record,
        };

        let mut jobstats = JobstatsData::new();
        let dagg = jobstats.entry("dagg".to_string()).or_default();
        let oss = dagg.entry("oss".to_string()).or_default();
        oss.insert(
            "read_bytes".to_string(),
            FieldSeries {
                value: vec![(GIB / 2) as f64, GIB as f64],
            },
        );
        oss.insert(
            "write_bytes".to_string(),
            FieldSeries {
                value: vec![(2 * GIB) as f64],
            },
        );
        dagg.entry("mds".to_string()).or_default().insert(
            "iops".to_string(),
            FieldSeries {
                value: vec![1024.0],
            },
        );

        let summary = summarize(&resolved, Some(&StubMetrics(jobstats))).await;
        assert_eq!(summary.req_mem_bytes, 8 * GIB);
        assert_eq!(summary.avg_cpu_percent, Some(80.0));
        // 3 GiB / 8 GiB is under half requested
        assert_eq!(summary.warnings, vec!["Too much memory requested"]);

        let report = render(&summary);
        let lines: Vec<&str> = report.lines().collect();

        // The memory line is the longest content line (65 chars), so it
        // sits flush against the right border.
        assert_eq!(
            lines[1],
            "| Memory (RAM)  [########............] 37.5% (3.0 GB peak / 8.0 GB) |"
        );

        // Title centered in the top border: 37 dashes of padding split
        // 18 left / 19 right, total width 65 + 4.
        assert_eq!(
            lines[0],
            format!(
                "+{} Job Summary: 123 (COMPLETED) {}+",
                "-".repeat(18),
                "-".repeat(19)
            )
        );
        assert_eq!(*lines.last().unwrap(), format!("+{}+", "-".repeat(67)));
        assert!(lines.iter().all(|l| l.len() == 69));

        assert!(lines[2].starts_with("| CPU           [################....] 80.0% average"));
        assert!(lines[3].starts_with("| Time          [....................] 0.8% (05:00 / 10:00:00)"));
        assert!(report.contains("| Lustre Filesystem:"));
        assert!(report.contains("|   /fred  1.0 GB      2.0 GB       1.0 K"));
        assert!(report.contains("| Warnings:"));
        assert!(report.contains("|   - Too much memory requested"));
    }
}
