//! Percentage-bar rendering for the report.

/// Number of fill cells inside the brackets.
pub const BAR_WIDTH: usize = 20;

/// Visual style of a percentage bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarStyle {
    /// Solid fill: `[##########..........]`
    Block,
    /// Directional fill: `[=========>..........]`
    Arrow,
}

/// Render a fixed-width percentage bar for a 0.0–1.0 fraction.
///
/// The fill is clamped to the bar width, but the printed percentage is
/// not, so a job that used 130% CPU shows a full bar labelled "130.0%".
pub fn percentage_bar(fraction: f64, style: BarStyle) -> String {
    let clamped = fraction.clamp(0.0, 1.0);
    let filled = (clamped * BAR_WIDTH as f64).round() as usize;

    let mut bar = String::with_capacity(BAR_WIDTH + 10);
    bar.push('[');
    match style {
        BarStyle::Block => {
            for _ in 0..filled {
                bar.push('#');
            }
        }
        BarStyle::Arrow => {
            if filled > 0 {
                for _ in 0..filled - 1 {
                    bar.push('=');
                }
                bar.push('>');
            }
        }
    }
    for _ in filled..BAR_WIDTH {
        bar.push('.');
    }
    bar.push(']');
    bar.push_str(&format!(" {:.1}%", fraction * 100.0));
    bar
}
