//! Timecode Module
//!
//! Converts between the `HH:MM:SS,mmm` subtitle timestamp format and a
//! numeric seconds offset. Formatting always emits the comma separator;
//! parsing also tolerates a dot, since transcription services emit both.

use std::sync::OnceLock;

use regex::Regex;

use crate::core::{CoreError, CoreResult, TimeSec};

/// Matches `HH:MM:SS,mmm` (or `.mmm`). Hours are unbounded so long media
/// is representable.
fn timestamp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(\d+):(\d{1,2}):(\d{1,2})[,.](\d{1,3})\s*$")
            .expect("timestamp regex is valid")
    })
}

/// Parses a `HH:MM:SS,mmm` timestamp into seconds.
///
/// Fails with [`CoreError::MalformedTimestamp`] when the input does not
/// match the pattern.
pub fn parse(text: &str) -> CoreResult<TimeSec> {
    let caps = timestamp_pattern()
        .captures(text)
        .ok_or_else(|| CoreError::MalformedTimestamp(text.to_string()))?;

    let group = |i: usize| -> CoreResult<u64> {
        caps.get(i)
            .ok_or_else(|| CoreError::MalformedTimestamp(text.to_string()))?
            .as_str()
            .parse::<u64>()
            .map_err(|_| CoreError::MalformedTimestamp(text.to_string()))
    };

    let hours = group(1)?;
    let minutes = group(2)?;
    let seconds = group(3)?;

    // The fractional part is a decimal fraction: "5" means 500ms, not 5ms.
    let frac = caps.get(4).map(|m| m.as_str()).unwrap_or("0");
    let millis = frac
        .parse::<u64>()
        .map_err(|_| CoreError::MalformedTimestamp(text.to_string()))?
        * 10u64.pow(3 - frac.len() as u32);

    let total_ms = hours * 3_600_000 + minutes * 60_000 + seconds * 1000 + millis;
    Ok(total_ms as f64 / 1000.0)
}

/// Formats seconds as a `HH:MM:SS,mmm` timestamp.
///
/// Negative inputs clamp to `00:00:00,000`.
pub fn format(seconds: TimeSec) -> String {
    let clamped = if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    };

    let total_ms = (clamped * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    let mins = total_mins % 60;
    let hours = total_mins / 60;

    format!("{:02}:{:02}:{:02},{:03}", hours, mins, secs, ms)
}

// =============================================================================
// Tests
// =============================================================================
