//! Display formatting for elapsed times.

use chrono::Duration;

/// Format a span as minutes and seconds, e.g. `"6m 40s"`. Negative spans
/// render as zero.
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.num_milliseconds().max(0);
    let minutes = millis / 60_000;
    let seconds = (millis % 60_000) / 1_000;
    format!("{}m {}s", minutes, seconds)
}

/// Format a live timer reading as `MM:SS`. Minutes keep counting past 99.
pub fn format_timer(elapsed_seconds: u64) -> String {
    format!("{:02}:{:02}", elapsed_seconds / 60, elapsed_seconds % 60)
}
