//! AI Capability Boundary
//!
//! Defines the trait and types for the external generative AI service the
//! engine consumes: transcription, cue translation, and speech synthesis.
//! The engine treats all three as untrusted collaborators - failures are
//! converted at the operation boundary, never leaked as panics.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::core::{CoreError, CoreResult};

// =============================================================================
// Transcription Types
// =============================================================================

/// One raw entry from the transcription service. Times arrive in the
/// `HH:MM:SS,mmm` textual format and are parsed by the project layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTranscriptEntry {
    /// Start timestamp, `HH:MM:SS,mmm`
    pub start_time: String,
    /// End timestamp, `HH:MM:SS,mmm`
    pub end_time: String,
    /// Utterance text
    pub text: String,
    /// Speaker label from diarization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    /// Confidence score in [0, 1]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Full transcription output
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionOutput {
    /// Detected language label (e.g. "English", "ko")
    pub language: String,
    /// Ordered raw entries
    pub entries: Vec<RawTranscriptEntry>,
}

// =============================================================================
// Translation Types
// =============================================================================

/// Input to the translation capability: one cue's id and current text
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCueText {
    pub id: String,
    pub text: String,
}

/// One translated cue coming back. The service may omit entries; omitted
/// cues keep their original text.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedCueText {
    pub id: String,
    pub translated_text: String,
}

// =============================================================================
// Provider Trait
// =============================================================================

/// The generative AI service boundary consumed by the engine
#[async_trait]
pub trait SubtitleAiProvider: Send + Sync {
    /// Returns the provider name
    fn name(&self) -> &str;

    /// Transcribes a media payload (audio-only, low sample rate, mono)
    /// into time-coded entries.
    async fn transcribe(&self, audio: &[u8], mime_type: &str)
        -> CoreResult<TranscriptionOutput>;

    /// Translates cue texts into `target_language`. Partial output is
    /// legal; callers must tolerate missing ids.
    async fn translate(
        &self,
        entries: Vec<SourceCueText>,
        target_language: &str,
    ) -> CoreResult<Vec<TranslatedCueText>>;

    /// Synthesizes one text chunk with the given voice, returning raw
    /// 16-bit PCM bytes. An empty vec means the service produced no audio
    /// for this chunk.
    async fn synthesize_speech(&self, chunk: &str, voice: &str) -> CoreResult<Vec<u8>>;

    /// Checks if the provider is configured and usable
    fn is_available(&self) -> bool;
}

// =============================================================================
// Mock Provider (for tests and offline runs)
// =============================================================================

/// Scripted provider: returns canned transcripts/translations and a fixed
/// number of PCM bytes per chunk, with optional per-chunk empty responses.
pub struct MockProvider {
    name: String,
    available: bool,
    transcription: Option<TranscriptionOutput>,
    translations: HashMap<String, String>,
    /// Chunk texts that should synthesize to empty audio
    silent_chunks: Vec<String>,
    /// Bytes of PCM produced per non-silent chunk
    pcm_bytes_per_chunk: usize,
    /// Chunks seen by `synthesize_speech`, in call order
    synthesized: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            name: "mock".to_string(),
            available: true,
            transcription: None,
            translations: HashMap::new(),
            silent_chunks: Vec::new(),
            pcm_bytes_per_chunk: 64,
            synthesized: Mutex::new(Vec::new()),
        }
    }

    /// Sets the canned transcription output
    pub fn with_transcription(mut self, output: TranscriptionOutput) -> Self {
        self.transcription = Some(output);
        self
    }

    /// Adds one canned translation (cue id → translated text)
    pub fn with_translation(mut self, id: &str, translated: &str) -> Self {
        self.translations.insert(id.to_string(), translated.to_string());
        self
    }

    /// Marks a chunk text as producing no audio
    pub fn with_silent_chunk(mut self, chunk: &str) -> Self {
        self.silent_chunks.push(chunk.to_string());
        self
    }

    /// Sets the PCM payload size per synthesized chunk
    pub fn with_pcm_bytes_per_chunk(mut self, bytes: usize) -> Self {
        self.pcm_bytes_per_chunk = bytes;
        self
    }

    /// Sets availability
    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Chunks passed to `synthesize_speech` so far
    pub fn synthesized_chunks(&self) -> Vec<String> {
        self.synthesized.lock().unwrap().clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubtitleAiProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn transcribe(
        &self,
        _audio: &[u8],
        _mime_type: &str,
    ) -> CoreResult<TranscriptionOutput> {
        if !self.available {
            return Err(CoreError::TranscriptionFailed(
                "provider not available".to_string(),
            ));
        }
        self.transcription
            .clone()
            .ok_or_else(|| CoreError::TranscriptionFailed("no scripted transcript".to_string()))
    }

    async fn translate(
        &self,
        entries: Vec<SourceCueText>,
        _target_language: &str,
    ) -> CoreResult<Vec<TranslatedCueText>> {
        if !self.available {
            return Err(CoreError::TranslationFailed(
                "provider not available".to_string(),
            ));
        }
        // Entries without a scripted translation are simply omitted,
        // which is exactly what real services do on partial failures.
        Ok(entries
            .into_iter()
            .filter_map(|entry| {
                self.translations.get(&entry.id).map(|t| TranslatedCueText {
                    id: entry.id,
                    translated_text: t.clone(),
                })
            })
            .collect())
    }

    async fn synthesize_speech(&self, chunk: &str, _voice: &str) -> CoreResult<Vec<u8>> {
        self.synthesized.lock().unwrap().push(chunk.to_string());

        if self.silent_chunks.iter().any(|s| s == chunk) {
            return Ok(Vec::new());
        }
        // Deterministic ramp so tests can verify ordering after reassembly
        let index = self.synthesized.lock().unwrap().len() as u8;
        Ok(vec![index; self.pcm_bytes_per_chunk])
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_output() -> TranscriptionOutput {
        TranscriptionOutput {
            language: "English".to_string(),
            entries: vec![RawTranscriptEntry {
                start_time: "00:00:00,000".to_string(),
                end_time: "00:00:02,000".to_string(),
                text: "Hi".to_string(),
                speaker: Some("A".to_string()),
                confidence: Some(0.97),
            }],
        }
    }

    #[tokio::test]
    async fn test_mock_transcribe() {
        let provider = MockProvider::new().with_transcription(sample_output());
        let output = provider.transcribe(b"pcm", "audio/wav").await.unwrap();

        assert_eq!(output.language, "English");
        assert_eq!(output.entries.len(), 1);
        assert_eq!(output.entries[0].text, "Hi");
    }

    #[tokio::test]
    async fn test_mock_transcribe_unavailable() {
        let provider = MockProvider::new()
            .with_transcription(sample_output())
            .with_available(false);

        let result = provider.transcribe(b"pcm", "audio/wav").await;
        assert!(matches!(result, Err(CoreError::TranscriptionFailed(_))));
    }

    #[tokio::test]
    async fn test_mock_translate_omits_unscripted_entries() {
        let provider = MockProvider::new().with_translation("a", "Hola");

        let result = provider
            .translate(
                vec![
                    SourceCueText {
                        id: "a".to_string(),
                        text: "Hello".to_string(),
                    },
                    SourceCueText {
                        id: "b".to_string(),
                        text: "World".to_string(),
                    },
                ],
                "Spanish",
            )
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "a");
        assert_eq!(result[0].translated_text, "Hola");
    }

    #[tokio::test]
    async fn test_mock_synthesize_records_chunks() {
        let provider = MockProvider::new().with_silent_chunk("quiet");

        let loud = provider.synthesize_speech("loud", "Kore").await.unwrap();
        let quiet = provider.synthesize_speech("quiet", "Kore").await.unwrap();

        assert!(!loud.is_empty());
        assert!(quiet.is_empty());
        assert_eq!(provider.synthesized_chunks(), vec!["loud", "quiet"]);
    }

    #[test]
    fn test_raw_entry_serialization() {
        let entry = RawTranscriptEntry {
            start_time: "00:00:01,000".to_string(),
            end_time: "00:00:02,500".to_string(),
            text: "Hello".to_string(),
            speaker: None,
            confidence: None,
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["startTime"], "00:00:01,000");
        assert!(json.get("speaker").is_none());
    }
}
