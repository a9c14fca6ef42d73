//! Dub Audio Assembly
//!
//! Concatenates the raw PCM payloads produced per chunk and wraps them in
//! a single WAV container so the result is one playable resource.

use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::warn;

use crate::core::{CoreError, CoreResult};

/// Sample rate of the synthesized speech stream
pub const DUB_SAMPLE_RATE: u32 = 24_000;

/// Bits per sample of the synthesized speech stream
pub const DUB_BITS_PER_SAMPLE: u16 = 16;

/// Wraps ordered raw 16-bit little-endian PCM chunk payloads in one WAV
/// container (mono, 24 kHz, 16-bit). Returns the container bytes and the
/// total duration in seconds.
pub fn assemble_wav(chunks: &[Vec<u8>]) -> CoreResult<(Vec<u8>, f64)> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: DUB_SAMPLE_RATE,
        bits_per_sample: DUB_BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut sample_count: u64 = 0;
    {
        let mut writer = WavWriter::new(&mut cursor, spec)
            .map_err(|e| CoreError::DubbingFailed(format!("WAV writer: {}", e)))?;

        for chunk in chunks {
            if chunk.len() % 2 != 0 {
                // A 16-bit stream should never have an odd byte count;
                // drop the dangling byte rather than shifting every
                // following sample.
                warn!("PCM chunk has odd length {}, dropping last byte", chunk.len());
            }
            for pair in chunk.chunks_exact(2) {
                let sample = i16::from_le_bytes([pair[0], pair[1]]);
                writer
                    .write_sample(sample)
                    .map_err(|e| CoreError::DubbingFailed(format!("WAV write: {}", e)))?;
                sample_count += 1;
            }
        }

        writer
            .finalize()
            .map_err(|e| CoreError::DubbingFailed(format!("WAV finalize: {}", e)))?;
    }

    let duration_sec = sample_count as f64 / DUB_SAMPLE_RATE as f64;
    Ok((cursor.into_inner(), duration_sec))
}

// =============================================================================
// Tests
// =============================================================================
