//! Cue Data Models
//!
//! Defines the timed subtitle cue structure shared by the store, history,
//! export, and dubbing modules.

use serde::{Deserialize, Serialize};

use crate::core::{CueId, TimeSec};

// =============================================================================
// Cue
// =============================================================================

/// A single subtitle cue with text and timing.
///
/// Wire field names (`startTime`, `endTime`, `originalText`) are fixed by
/// the structured export format and by persisted project state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cue {
    /// Unique identifier, stable for the cue's lifetime
    pub id: CueId,
    /// Start time in seconds
    #[serde(rename = "startTime")]
    pub start_sec: TimeSec,
    /// End time in seconds
    #[serde(rename = "endTime")]
    pub end_sec: TimeSec,
    /// Display text in the current language
    pub text: String,
    /// Pre-translation text, set once on first translation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    /// Speaker label from diarization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    /// Transcription confidence score in [0, 1]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Cue {
    /// Creates a new cue with the given id, timing, and text.
    ///
    /// Times clamp to non-negative and `end >= start` is enforced by
    /// widening the end bound.
    pub fn new(id: &str, start_sec: TimeSec, end_sec: TimeSec, text: &str) -> Self {
        let start = start_sec.max(0.0);
        Self {
            id: id.to_string(),
            start_sec: start,
            end_sec: end_sec.max(start),
            text: text.to_string(),
            original_text: None,
            speaker: None,
            confidence: None,
        }
    }

    /// Creates a cue with an auto-generated ID
    pub fn create(start_sec: TimeSec, end_sec: TimeSec, text: &str) -> Self {
        Self::new(&ulid::Ulid::new().to_string(), start_sec, end_sec, text)
    }

    /// Returns the duration of this cue in seconds
    pub fn duration(&self) -> TimeSec {
        self.end_sec - self.start_sec
    }

    /// Returns true if the cue is active at the given time (inclusive bounds)
    pub fn is_active_at(&self, time_sec: TimeSec) -> bool {
        time_sec >= self.start_sec && time_sec <= self.end_sec
    }

    /// Sets the speaker label
    pub fn with_speaker(mut self, speaker: &str) -> Self {
        self.speaker = Some(speaker.to_string());
        self
    }

    /// Sets the transcription confidence
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 1.0));
        self
    }
}

// =============================================================================
// Cue Update
// =============================================================================

/// Partial cue update: `Some` fields are merged, `None` fields are kept.
///
/// The cue `id` is deliberately absent - it can never change.
#[derive(Clone, Debug, Default)]
pub struct CueUpdate {
    pub start_sec: Option<TimeSec>,
    pub end_sec: Option<TimeSec>,
    pub text: Option<String>,
    pub speaker: Option<String>,
}

impl CueUpdate {
    /// Update that replaces only the text
    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    /// Update that replaces only the timing
    pub fn timing(start_sec: TimeSec, end_sec: TimeSec) -> Self {
        Self {
            start_sec: Some(start_sec),
            end_sec: Some(end_sec),
            ..Default::default()
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
