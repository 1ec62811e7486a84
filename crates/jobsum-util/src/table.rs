//! Plain-text table rendering.

/// Render a left-aligned table with a dashed rule under the header.
///
/// ```text
/// Path    Total Read
/// ------  ----------
/// /fred   4.0 GB
/// ```
///
/// Columns are separated by two spaces and sized to the widest cell.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let ncols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(ncols) {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_row(
        &headers.iter().map(|h| h.to_string()).collect::<Vec<_>>(),
        &widths,
    ));
    lines.push(format_row(
        &widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>(),
        &widths,
    ));
    for row in rows {
        lines.push(format_row(row, &widths));
    }

    lines.join("\n")
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{:<width$}", cell, width = w))
        .collect();
    padded.join("  ").trim_end().to_string()
}
