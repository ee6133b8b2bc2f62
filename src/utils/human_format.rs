//! Human-readable formatting for run durations

use std::time::Duration;

/// Formats a duration as `Hh Mm Ss` style text, dropping leading zero units
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis() as u64;
    if millis < 1000 {
        return format!("{millis}ms");
    }

    if millis < 60_000 {
        let seconds = millis as f64 / 1000.0;
        return if seconds >= 10.0 {
            format!("{seconds:.1}s")
        } else {
            format!("{seconds:.2}s")
        };
    }

    let total_seconds = millis / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours == 0 {
        format!("{minutes}m {seconds:02}s")
    } else {
        format!("{hours}h {minutes:02}m {seconds:02}s")
    }
}
