//! Structured Export
//!
//! Pretty-printed JSON serialization of the full cue list, preserving
//! every field and the given order, for human inspection and re-import.

use crate::core::subtitles::Cue;
use crate::core::CoreResult;

/// Serializes cues to pretty-printed JSON, order preserved
pub fn export_json(cues: &[Cue]) -> CoreResult<String> {
    Ok(serde_json::to_string_pretty(cues)?)
}

/// Parses a structured export back into cues
pub fn parse_json(content: &str) -> CoreResult<Vec<Cue>> {
    Ok(serde_json::from_str(content)?)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_json_preserves_fields_and_order() {
        let mut first = Cue::new("b", 5.0, 6.0, "Später");
        first.original_text = Some("Later".to_string());
        first.speaker = Some("Narrator".to_string());
        first.confidence = Some(0.9);
        let second = Cue::new("a", 0.0, 1.0, "Früher");

        let json = export_json(&[first.clone(), second.clone()]).unwrap();
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();

        // Order preserved: no resort on export
        assert_eq!(parsed[0]["id"], "b");
        assert_eq!(parsed[0]["startTime"], 5.0);
        assert_eq!(parsed[0]["endTime"], 6.0);
        assert_eq!(parsed[0]["originalText"], "Later");
        assert_eq!(parsed[0]["speaker"], "Narrator");
        assert_eq!(parsed[0]["confidence"], 0.9);
        assert_eq!(parsed[1]["id"], "a");
    }

    #[test]
    fn test_export_json_is_pretty_printed() {
        let json = export_json(&[Cue::new("a", 0.0, 1.0, "x")]).unwrap();
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_json_round_trip() {
        let cues = vec![
            Cue::new("a", 0.0, 1.5, "one").with_speaker("S1"),
            Cue::new("b", 2.0, 3.0, "two"),
        ];

        let restored = parse_json(&export_json(&cues).unwrap()).unwrap();
        assert_eq!(restored, cues);
    }
}
