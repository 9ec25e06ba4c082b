use std::time::Duration;

const SIZE_UNITS: [&str; 6] = ["Bytes", "KB", "MB", "GB", "TB", "PB"];

/// Human-scaled byte count, e.g. `1536.0` → `"1.50 KB"`.
///
/// Scaling stops at PB, so anything past 1024 PB is still shown in PB.
pub fn format_size(bytes: f64) -> String {
    let mut size = bytes;
    let mut unit = 0;
    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, SIZE_UNITS[unit])
}

/// Whole seconds from a float mpv time; negative or non-finite is zero.
pub fn whole_seconds(secs: f64) -> Duration {
    if secs.is_finite() && secs > 0.0 {
        Duration::from_secs(secs.trunc() as u64)
    } else {
        Duration::ZERO
    }
}

/// `H:MM:SS`, hours unpadded.
pub fn format_clock(d: Duration) -> String {
    let total = d.as_secs();
    format!("{}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
}

/// Progress through the track, truncated toward zero.  A zero, negative or
/// unknown duration yields 0.
pub fn percent(elapsed_secs: f64, duration_secs: f64) -> i64 {
    if !duration_secs.is_finite() || duration_secs <= 0.0 || !elapsed_secs.is_finite() {
        return 0;
    }
    (100.0 * elapsed_secs / duration_secs).trunc() as i64
}
