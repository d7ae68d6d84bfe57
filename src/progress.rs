//! Text progress bar rendering

pub const DEFAULT_BAR_LENGTH: usize = 40;

const FILLED: &str = "█";
const EMPTY: &str = "░";

/// Number of filled cells: `floor(bar_length * current / total)`.
pub fn filled_length(current: usize, total: usize, bar_length: usize) -> usize {
    if total == 0 {
        return 0;
    }
    bar_length * current.min(total) / total
}

/// Whole-number percentage, rounded to nearest with ties to even (1/8 is 12%).
pub fn percent(current: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (current.min(total) as f64 / total as f64 * 100.0).round_ties_even() as u32
}

/// Renders `Progress: |███░░░| current/total (pct%)`.
///
/// `total == 0` renders an empty bar instead of dividing by zero; `current`
/// past `total` is clamped.
pub fn render_progress(current: usize, total: usize, bar_length: usize) -> String {
    let current = current.min(total);
    let filled = filled_length(current, total, bar_length);
    format!(
        "Progress: |{}{}| {}/{} ({}%)",
        FILLED.repeat(filled),
        EMPTY.repeat(bar_length - filled),
        current,
        total,
        percent(current, total)
    )
}
