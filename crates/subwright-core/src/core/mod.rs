//! Subwright Core Engine
//!
//! Core subtitle authoring engine: the timed-cue data model, edit
//! history, playback synchronization, the speech batch pipeline, export
//! encoders, the AI capability boundary, and local persistence.

pub mod ai;
pub mod dubbing;
pub mod export;
pub mod history;
pub mod persistence;
pub mod playback;
pub mod project;
pub mod settings;
pub mod subtitles;
pub mod timecode;

// Re-export common types
mod types;
pub use types::*;

mod error;
pub use error::*;
