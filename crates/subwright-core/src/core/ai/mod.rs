//! AI Module
//!
//! The external generative AI boundary: the capability trait the engine
//! consumes, a scripted mock for tests and offline runs, and the Gemini
//! implementation behind the `ai-providers` feature.

#[cfg(feature = "ai-providers")]
mod gemini;
mod provider;

#[cfg(feature = "ai-providers")]
pub use gemini::{GeminiConfig, GeminiProvider};
pub use provider::{
    MockProvider, RawTranscriptEntry, SourceCueText, SubtitleAiProvider, TranscriptionOutput,
    TranslatedCueText,
};
