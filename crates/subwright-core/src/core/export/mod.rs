//! Export Module
//!
//! Pure serializers over the current cue sequence:
//! - `subrip.rs` - SRT interchange format (export and import)
//! - `json.rs`   - structured pretty-printed serialization

mod json;
mod subrip;

use std::path::Path;

pub use json::{export_json, parse_json};
pub use subrip::{export_srt, parse_srt};

/// Builds the conventional export file name:
/// `<project-name-without-extension>_subs.<format>`.
pub fn export_file_name(project_name: &str, format: &str) -> String {
    let stem = Path::new(project_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| project_name.to_string());
    format!("{}_subs.{}", stem, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_file_name_strips_extension() {
        assert_eq!(export_file_name("interview.mp4", "srt"), "interview_subs.srt");
        assert_eq!(export_file_name("talk.final.mov", "json"), "talk.final_subs.json");
    }

    #[test]
    fn test_export_file_name_without_extension() {
        assert_eq!(export_file_name("interview", "srt"), "interview_subs.srt");
    }
}
