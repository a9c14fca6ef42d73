//! Dubbing Module
//!
//! The speech batch pipeline that turns the project's cue text into one
//! playable dub track:
//! - `chunker.rs`  - sentence splitting and greedy chunk packing
//! - `pipeline.rs` - sequential synthesis with progress and skip policy
//! - `wav.rs`      - PCM reassembly into a single WAV container

pub mod chunker;
mod pipeline;
mod wav;

pub use chunker::{chunk_text, MAX_CHUNK_CHARS};
pub use pipeline::{generate_dub, DubRequest, DubResource, ProgressFn, INTER_REQUEST_PAUSE};
pub use wav::{assemble_wav, DUB_BITS_PER_SAMPLE, DUB_SAMPLE_RATE};
