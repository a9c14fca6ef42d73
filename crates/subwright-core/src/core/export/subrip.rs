//! SubRip Interchange Format
//!
//! Serializes the cue sequence to SRT and parses existing SRT files back
//! into cues (the CLI's file-based entry path).

use crate::core::subtitles::Cue;
use crate::core::{timecode, CoreError, CoreResult};

/// Exports cues to SRT, in ascending start-time order:
///
/// ```text
/// 1
/// 00:00:01,000 --> 00:00:04,000
/// First caption text
///
/// 2
/// ...
/// ```
pub fn export_srt(cues: &[Cue]) -> String {
    let mut ordered: Vec<&Cue> = cues.iter().collect();
    ordered.sort_by(|a, b| {
        a.start_sec
            .partial_cmp(&b.start_sec)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut output = String::new();
    for (index, cue) in ordered.iter().enumerate() {
        output.push_str(&format!("{}\n", index + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            timecode::format(cue.start_sec),
            timecode::format(cue.end_sec)
        ));
        output.push_str(&cue.text);
        output.push_str("\n\n");
    }

    output.trim_end().to_string()
}

/// Parses SRT content into cues. Fresh ids are assigned; sequence numbers
/// in the file are ignored (real-world files renumber freely).
pub fn parse_srt(content: &str) -> CoreResult<Vec<Cue>> {
    let mut cues = Vec::new();
    let mut lines = content.lines().peekable();

    while lines.peek().is_some() {
        // Skip blank separator lines
        while lines.peek().is_some_and(|l| l.trim().is_empty()) {
            lines.next();
        }
        if lines.peek().is_none() {
            break;
        }

        // Sequence number line (unvalidated)
        let _seq = lines
            .next()
            .ok_or_else(|| CoreError::ValidationError("unexpected end of input".to_string()))?;

        let timestamp_line = lines
            .next()
            .ok_or_else(|| CoreError::ValidationError("missing timestamp line".to_string()))?;
        let (start_sec, end_sec) = parse_timestamp_line(timestamp_line)?;

        let mut text_lines = Vec::new();
        while let Some(line) = lines.peek() {
            if line.trim().is_empty() {
                break;
            }
            text_lines.push(lines.next().unwrap_or_default().to_string());
        }

        if text_lines.is_empty() {
            return Err(CoreError::ValidationError(
                "entry has no text lines".to_string(),
            ));
        }

        cues.push(Cue::create(start_sec, end_sec, &text_lines.join("\n")));
    }

    Ok(cues)
}

/// Parses a `start --> end` timestamp line
fn parse_timestamp_line(line: &str) -> CoreResult<(f64, f64)> {
    let parts: Vec<&str> = line.split("-->").collect();
    if parts.len() != 2 {
        return Err(CoreError::ValidationError(format!(
            "expected 'start --> end': {}",
            line
        )));
    }

    let start = timecode::parse(parts[0].trim())?;
    let end = timecode::parse(parts[1].trim())?;
    Ok((start, end))
}

// =============================================================================
// Tests
// =============================================================================
