//! Speech Batch Pipeline
//!
//! Turns arbitrary-length text into one playable audio resource: chunk,
//! synthesize sequentially, reassemble. Sequential invocation trades
//! latency for respecting the service's rate limits and for keeping
//! chunk order trivially correct in the reassembled track.

use std::time::Duration;

use tracing::{info, warn};

use crate::core::ai::SubtitleAiProvider;
use crate::core::dubbing::chunker::chunk_text;
use crate::core::dubbing::wav::{assemble_wav, DUB_SAMPLE_RATE};
use crate::core::{CoreError, CoreResult, DubId};

/// Pause between consecutive synthesis calls
pub const INTER_REQUEST_PAUSE: Duration = Duration::from_millis(250);

// =============================================================================
// Dub Resource
// =============================================================================

/// One generated audio asset covering the whole cue text. Replaced
/// wholesale on each new dub request, never patched in place.
#[derive(Clone, Debug)]
pub struct DubResource {
    /// Unique resource id
    pub id: DubId,
    /// Assembled WAV container bytes
    pub wav_bytes: Vec<u8>,
    /// Container sample rate
    pub sample_rate: u32,
    /// Total audio duration in seconds
    pub duration_sec: f64,
    /// Chunks that produced audio
    pub synthesized_chunks: usize,
    /// Chunks the service returned empty audio for
    pub skipped_chunks: usize,
    /// Generation this dub belongs to; stale generations are discarded
    pub generation: u64,
}

/// A dub request. The generation tag lets the owner ignore results and
/// progress from a pipeline that outlived a project reset.
#[derive(Clone, Debug)]
pub struct DubRequest {
    pub text: String,
    pub voice: String,
    pub generation: u64,
}

/// Progress callback: receives percentages in 0–100, tagged with the
/// request's generation.
pub type ProgressFn = dyn Fn(u64, f64) + Send + Sync;

// =============================================================================
// Pipeline
// =============================================================================

/// Runs the full batch pipeline for one request.
///
/// Chunks that yield no audio are skipped silently (no retry, not fatal);
/// the pipeline fails with [`CoreError::NoAudioGenerated`] only when
/// *zero* chunks across the whole input produced audio. Progress reaches
/// exactly 100 only after the last chunk has resolved.
pub async fn generate_dub(
    provider: &dyn SubtitleAiProvider,
    request: &DubRequest,
    progress: Option<&ProgressFn>,
) -> CoreResult<DubResource> {
    let chunks = chunk_text(&request.text);
    if chunks.is_empty() {
        return Err(CoreError::NoAudioGenerated);
    }

    let total = chunks.len();
    info!("dubbing {} chunk(s) with voice {}", total, request.voice);

    let mut payloads: Vec<Vec<u8>> = Vec::with_capacity(total);
    let mut skipped = 0usize;

    for (index, chunk) in chunks.iter().enumerate() {
        match provider.synthesize_speech(chunk, &request.voice).await {
            Ok(pcm) if !pcm.is_empty() => payloads.push(pcm),
            Ok(_) => {
                warn!("chunk {}/{} produced no audio, skipping", index + 1, total);
                skipped += 1;
            }
            Err(e) => {
                // Absorbed locally: a single bad chunk must not abort the
                // batch unless every chunk fails.
                warn!("chunk {}/{} synthesis failed ({}), skipping", index + 1, total, e);
                skipped += 1;
            }
        }

        if let Some(report) = progress {
            let percent = (index + 1) as f64 / total as f64 * 100.0;
            report(request.generation, percent);
        }

        if index + 1 < total {
            tokio::time::sleep(INTER_REQUEST_PAUSE).await;
        }
    }

    if payloads.is_empty() {
        return Err(CoreError::NoAudioGenerated);
    }

    let synthesized = payloads.len();
    let (wav_bytes, duration_sec) = assemble_wav(&payloads)?;

    Ok(DubResource {
        id: ulid::Ulid::new().to_string(),
        wav_bytes,
        sample_rate: DUB_SAMPLE_RATE,
        duration_sec,
        synthesized_chunks: synthesized,
        skipped_chunks: skipped,
        generation: request.generation,
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ai::MockProvider;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    fn request(text: &str) -> DubRequest {
        DubRequest {
            text: text.to_string(),
            voice: "Kore".to_string(),
            generation: 1,
        }
    }

    fn three_sentence_text() -> String {
        // Long enough that each sentence packs into its own chunk
        let a = "alpha ".repeat(45).trim_end().to_string() + ".";
        let b = "bravo ".repeat(45).trim_end().to_string() + ".";
        let c = "charlie ".repeat(35).trim_end().to_string() + ".";
        format!("{} {} {}", a, b, c)
    }

    #[tokio::test(start_paused = true)]
    async fn test_pipeline_happy_path() {
        let provider = MockProvider::new();
        let resource = generate_dub(&provider, &request("Hello there. General Kenobi."), None)
            .await
            .unwrap();

        assert_eq!(resource.synthesized_chunks, 1); // both sentences pack into one chunk
        assert_eq!(resource.skipped_chunks, 0);
        assert_eq!(resource.sample_rate, DUB_SAMPLE_RATE);
        assert!(!resource.wav_bytes.is_empty());
        assert!(!resource.id.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pipeline_reports_scaled_progress() {
        let provider = MockProvider::new();
        let seen: Arc<Mutex<Vec<(u64, f64)>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_in_cb = seen.clone();
        let progress = move |generation: u64, percent: f64| {
            seen_in_cb.lock().unwrap().push((generation, percent));
        };

        generate_dub(&provider, &request(&three_sentence_text()), Some(&progress))
            .await
            .unwrap();

        let reports = seen.lock().unwrap();
        assert_eq!(reports.len(), 3);
        assert!((reports[0].1 - 100.0 / 3.0).abs() < 1e-9);
        assert!((reports[1].1 - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(reports[2].1, 100.0);
        assert!(reports.iter().all(|(generation, _)| *generation == 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pipeline_skips_silent_chunk_and_still_reaches_100() {
        // Scenario D: chunk 2 of 3 yields no audio - the final resource
        // holds chunks 1 and 3, and progress still reaches 100.
        let text = three_sentence_text();
        let chunks = crate::core::dubbing::chunker::chunk_text(&text);
        assert_eq!(chunks.len(), 3);

        let provider = MockProvider::new()
            .with_pcm_bytes_per_chunk(4)
            .with_silent_chunk(&chunks[1]);

        let last_percent: Arc<Mutex<f64>> = Arc::new(Mutex::new(0.0));
        let last_in_cb = last_percent.clone();
        let progress = move |_generation: u64, percent: f64| {
            *last_in_cb.lock().unwrap() = percent;
        };

        let resource = generate_dub(&provider, &request(&text), Some(&progress))
            .await
            .unwrap();

        assert_eq!(resource.synthesized_chunks, 2);
        assert_eq!(resource.skipped_chunks, 1);
        assert_eq!(*last_percent.lock().unwrap(), 100.0);

        // Chunks 1 and 3 concatenated: 2 chunks * 2 samples each
        let reader = hound::WavReader::new(Cursor::new(resource.wav_bytes)).unwrap();
        assert_eq!(reader.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pipeline_all_chunks_silent_is_terminal() {
        let provider = MockProvider::new().with_silent_chunk("Nothing here.");
        let result = generate_dub(&provider, &request("Nothing here."), None).await;

        assert!(matches!(result, Err(CoreError::NoAudioGenerated)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pipeline_empty_text_is_terminal() {
        let provider = MockProvider::new();
        let result = generate_dub(&provider, &request("   "), None).await;

        assert!(matches!(result, Err(CoreError::NoAudioGenerated)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pipeline_synthesizes_sequentially_in_order() {
        let provider = MockProvider::new();
        let text = three_sentence_text();
        let expected = crate::core::dubbing::chunker::chunk_text(&text);

        generate_dub(&provider, &request(&text), None).await.unwrap();

        assert_eq!(provider.synthesized_chunks(), expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pipeline_result_carries_generation() {
        let provider = MockProvider::new();
        let mut req = request("One line.");
        req.generation = 7;

        let resource = generate_dub(&provider, &req, None).await.unwrap();
        assert_eq!(resource.generation, 7);
    }
}
