/// Playback progress in percent for a track running from `start` to `end`,
/// all in milliseconds since the epoch.
///
/// Returns `None` when the window is empty or inverted; callers render that as
/// "nothing to show" rather than zero.
pub fn progress(start: i64, end: i64, now: i64) -> Option<f64> {
    if end <= start {
        return None;
    }
    // Widened so windows spanning most of the i64 range cannot overflow.
    let elapsed = (i128::from(now) - i128::from(start)) as f64;
    let total = (i128::from(end) - i128::from(start)) as f64;
    Some((elapsed / total * 100.0).clamp(0.0, 100.0))
}

/// Renders an elapsed/total pair of milliseconds as `m:ss / m:ss`.
pub fn format_position(elapsed_ms: i64, total_ms: i64) -> String {
    let total_ms = total_ms.max(0);
    let elapsed_ms = elapsed_ms.clamp(0, total_ms);
    format!("{} / {}", clock(elapsed_ms), clock(total_ms))
}

fn clock(ms: i64) -> String {
    let secs = ms / 1_000;
    format!("{}:{:02}", secs / 60, secs % 60)
}
