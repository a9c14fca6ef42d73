//! Project Module
//!
//! The working set behind one editing session: the cue store, the edit
//! history, the loaded media reference, the current dub resource, and the
//! operation status state machine. All mutations flow through this type,
//! which is what decides when an edit becomes an undoable history commit.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::ai::{SubtitleAiProvider, TranscriptionOutput, TranslatedCueText, SourceCueText};
use crate::core::dubbing::{self, DubRequest, DubResource, ProgressFn};
use crate::core::export;
use crate::core::history::EditHistory;
use crate::core::persistence::PersistenceSink;
use crate::core::subtitles::{Cue, CueStore, CueUpdate};
use crate::core::{timecode, CoreError, CoreResult, TimeSec};

// =============================================================================
// Media Reference
// =============================================================================

/// Reference to the loaded media resource
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRef {
    /// Original file name (doubles as the project display name)
    pub file_name: String,
    /// MIME type of the imported media
    pub mime_type: String,
}

// =============================================================================
// Operation Status
// =============================================================================

/// Status of the project's single in-flight long-running operation.
/// A closed variant set - the UI's loose status strings have no place in
/// the engine.
#[derive(Clone, Debug, PartialEq)]
pub enum OperationStatus {
    /// Nothing running
    Idle,
    /// Transcription call in flight
    Transcribing,
    /// Translation call in flight
    Translating,
    /// Batch dub pipeline in flight
    Dubbing { progress: f64 },
    /// Last operation ended in a terminal failure
    Failed { message: String },
}

impl OperationStatus {
    /// Whether a new long-running operation may start
    pub fn can_start(&self) -> bool {
        matches!(self, OperationStatus::Idle | OperationStatus::Failed { .. })
    }
}

// =============================================================================
// Project
// =============================================================================

/// Default display name before any media is loaded
pub const UNTITLED: &str = "Untitled";

/// One editing session's full working set
pub struct Project {
    name: String,
    media: Option<MediaRef>,
    store: CueStore,
    history: EditHistory,
    dub: Option<DubResource>,
    status: OperationStatus,
    dub_generation: u64,
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

impl Project {
    /// Creates an empty project with no autosave collaborator
    pub fn new() -> Self {
        Self {
            name: UNTITLED.to_string(),
            media: None,
            store: CueStore::new(),
            history: EditHistory::new(),
            dub: None,
            status: OperationStatus::Idle,
            dub_generation: 0,
        }
    }

    /// Creates a project whose history commits autosave through `sink`
    pub fn with_autosave(sink: Arc<dyn PersistenceSink>, user_id: &str) -> Self {
        let mut project = Self::new();
        project.history = EditHistory::new().with_autosave(sink, user_id);
        project
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media(&self) -> Option<&MediaRef> {
        self.media.as_ref()
    }

    pub fn status(&self) -> &OperationStatus {
        &self.status
    }

    pub fn dub(&self) -> Option<&DubResource> {
        self.dub.as_ref()
    }

    pub fn store(&self) -> &CueStore {
        &self.store
    }

    /// Cues active at the given playback time, in store order
    pub fn active_cues(&self, time_sec: TimeSec) -> Vec<&Cue> {
        self.store.active_at(time_sec)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Loads a new media resource, discarding the previous working set.
    /// Any in-flight dub becomes stale (its generation no longer matches).
    pub fn load_media(&mut self, file_name: &str, mime_type: &str) {
        info!("loading media {} ({})", file_name, mime_type);
        self.name = file_name.to_string();
        self.media = Some(MediaRef {
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
        });
        self.store.clear();
        self.history.reset();
        self.dub = None;
        self.status = OperationStatus::Idle;
        self.dub_generation += 1;
    }

    /// Resets the project to its initial empty state
    pub fn reset(&mut self) {
        self.name = UNTITLED.to_string();
        self.media = None;
        self.store.clear();
        self.history.reset();
        self.dub = None;
        self.status = OperationStatus::Idle;
        self.dub_generation += 1;
    }

    /// Replaces the working set with an externally loaded cue sequence
    /// (e.g. a parsed subtitle file) and takes the initial snapshot.
    pub fn load_cues(&mut self, cues: Vec<Cue>) {
        self.store = CueStore::from_cues(cues);
        self.history.reset();
        self.dub = None;
        self.status = OperationStatus::Idle;
        self.dub_generation += 1;
        self.commit();
    }

    /// Restores the last saved working set for `user_id` from the sink.
    /// Returns false when nothing was saved.
    pub fn load_saved(&mut self, sink: &dyn PersistenceSink, user_id: &str) -> CoreResult<bool> {
        let Some((cues, name)) = sink.load_project_state(user_id)? else {
            return Ok(false);
        };

        self.name = name;
        self.history.reset();
        self.dub = None;
        self.status = OperationStatus::Idle;
        self.dub_generation += 1;
        self.store = CueStore::from_cues(cues);
        self.commit();
        Ok(true)
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Merges a partial update into a cue. Deliberately does NOT commit to
    /// history, so keystroke-level edits can be batched; call
    /// [`Project::commit_edit`] when the edit is done.
    pub fn update_cue(&mut self, id: &str, update: CueUpdate) -> bool {
        self.store.update(id, update)
    }

    /// Commits the current cue sequence as one undoable step
    pub fn commit_edit(&mut self) {
        self.commit();
    }

    /// Deletes a cue. Deletion is always a discrete undoable action, so
    /// this commits immediately.
    pub fn delete_cue(&mut self, id: &str) -> CoreResult<()> {
        self.store
            .delete(id)
            .ok_or_else(|| CoreError::CueNotFound(id.to_string()))?;
        self.commit();
        Ok(())
    }

    /// Shifts every cue by `delta_sec` (clamped at zero per bound) and
    /// commits immediately.
    pub fn shift_all(&mut self, delta_sec: TimeSec) {
        self.store.shift_all(delta_sec);
        self.commit();
    }

    /// Splits a cue at `at_sec`, which must fall strictly inside the cue.
    /// The original keeps the first half of the text and `[start, at]`;
    /// the new sibling takes the rest and `[at, end]`. Commits.
    pub fn split_cue(&mut self, id: &str, at_sec: TimeSec) -> CoreResult<String> {
        let cue = self
            .store
            .get(id)
            .ok_or_else(|| CoreError::CueNotFound(id.to_string()))?;

        if at_sec <= cue.start_sec || at_sec >= cue.end_sec {
            return Err(CoreError::InvalidSplitPoint(at_sec));
        }

        let words: Vec<&str> = cue.text.split_whitespace().collect();
        let half = words.len() / 2;
        let (first_text, second_text) = if words.len() < 2 {
            (cue.text.clone(), String::new())
        } else {
            (words[..half].join(" "), words[half..].join(" "))
        };

        let end_sec = cue.end_sec;
        let speaker = cue.speaker.clone();

        self.store.update(
            id,
            CueUpdate {
                end_sec: Some(at_sec),
                text: Some(first_text),
                ..Default::default()
            },
        );

        let mut sibling = Cue::create(at_sec, end_sec, &second_text);
        sibling.speaker = speaker;
        let sibling_id = sibling.id.clone();
        self.store.insert_many(vec![sibling]);

        self.commit();
        Ok(sibling_id)
    }

    /// Restores the previous snapshot; a no-op at the boundary
    pub fn undo(&mut self) -> bool {
        if let Some(snapshot) = self.history.undo() {
            let cues = snapshot.clone();
            self.store.restore(cues);
            return true;
        }
        false
    }

    /// Restores the next snapshot; a no-op at the boundary
    pub fn redo(&mut self) -> bool {
        if let Some(snapshot) = self.history.redo() {
            let cues = snapshot.clone();
            self.store.restore(cues);
            return true;
        }
        false
    }

    fn commit(&mut self) {
        let snapshot = self.store.snapshot();
        self.history.commit(snapshot, &self.name);
    }

    // =========================================================================
    // Transcription
    // =========================================================================

    /// Runs the transcription capability over the given media payload and
    /// populates the store. The store is untouched on failure.
    pub async fn run_transcription(
        &mut self,
        provider: &dyn SubtitleAiProvider,
        audio: &[u8],
        mime_type: &str,
    ) -> CoreResult<()> {
        self.ensure_can_start("transcription")?;
        self.status = OperationStatus::Transcribing;

        match provider.transcribe(audio, mime_type).await {
            Ok(output) => {
                let result = self.apply_transcription(output);
                self.status = match &result {
                    Ok(_) => OperationStatus::Idle,
                    Err(e) => OperationStatus::Failed {
                        message: e.to_string(),
                    },
                };
                result
            }
            Err(e) => {
                self.status = OperationStatus::Failed {
                    message: e.to_string(),
                };
                Err(e)
            }
        }
    }

    /// Converts raw transcript entries into cues and inserts them as one
    /// batch with an initial history commit. All timestamps are parsed
    /// before any mutation, so a malformed entry leaves the store as-is.
    pub fn apply_transcription(&mut self, output: TranscriptionOutput) -> CoreResult<()> {
        let mut cues = Vec::with_capacity(output.entries.len());
        for entry in &output.entries {
            let start = timecode::parse(&entry.start_time)?;
            let end = timecode::parse(&entry.end_time)?;
            let mut cue = Cue::create(start, end, &entry.text);
            cue.speaker = entry.speaker.clone();
            cue.confidence = entry.confidence.map(|c| c.clamp(0.0, 1.0));
            cues.push(cue);
        }

        info!(
            "transcription produced {} cue(s), language {}",
            cues.len(),
            output.language
        );
        self.store.insert_many(cues);
        self.commit();
        Ok(())
    }

    // =========================================================================
    // Translation
    // =========================================================================

    /// Translates all cue texts into `target_language`. Cues missing from
    /// the response keep their text; the store is untouched on failure.
    pub async fn run_translation(
        &mut self,
        provider: &dyn SubtitleAiProvider,
        target_language: &str,
    ) -> CoreResult<()> {
        self.ensure_can_start("translation")?;
        self.status = OperationStatus::Translating;

        let entries: Vec<SourceCueText> = self
            .store
            .iter()
            .map(|cue| SourceCueText {
                id: cue.id.clone(),
                text: cue.text.clone(),
            })
            .collect();

        match provider.translate(entries, target_language).await {
            Ok(translated) => {
                self.apply_translation(translated);
                self.status = OperationStatus::Idle;
                Ok(())
            }
            Err(e) => {
                self.status = OperationStatus::Failed {
                    message: e.to_string(),
                };
                Err(e)
            }
        }
    }

    /// Applies a (possibly partial) translation response. Cues missing
    /// from the response keep their text; unknown ids are ignored.
    /// Commits once at the end.
    pub fn apply_translation(&mut self, translated: Vec<TranslatedCueText>) {
        let mut touched = 0usize;
        for entry in translated {
            if self.store.apply_translation(&entry.id, &entry.translated_text) {
                touched += 1;
            } else {
                warn!("translation response for unknown cue {}", entry.id);
            }
        }

        info!("translation updated {} cue(s)", touched);
        self.commit();
    }

    // =========================================================================
    // Dubbing
    // =========================================================================

    /// Starts a dub: marks the status and returns the generation-tagged
    /// request for the batch pipeline. The split into begin/apply lets
    /// the owner drop results that outlive a reset.
    pub fn begin_dub(&mut self, voice: &str) -> CoreResult<DubRequest> {
        self.ensure_can_start("dubbing")?;
        let text = self.store.concatenated_text();
        if text.is_empty() {
            return Err(CoreError::DubbingFailed("no cue text to dub".to_string()));
        }

        self.status = OperationStatus::Dubbing { progress: 0.0 };
        Ok(DubRequest {
            text,
            voice: voice.to_string(),
            generation: self.dub_generation,
        })
    }

    /// Forwards pipeline progress, ignoring reports from stale generations
    pub fn apply_dub_progress(&mut self, generation: u64, percent: f64) {
        if generation != self.dub_generation {
            return;
        }
        if matches!(self.status, OperationStatus::Dubbing { .. }) {
            self.status = OperationStatus::Dubbing {
                progress: percent.clamp(0.0, 100.0),
            };
        }
    }

    /// Applies a finished pipeline run. Results from a stale generation
    /// (the project was reset or reloaded mid-flight) are dropped.
    pub fn apply_dub_result(&mut self, result: CoreResult<DubResource>) -> CoreResult<()> {
        match result {
            Ok(resource) => {
                if resource.generation != self.dub_generation {
                    warn!(
                        "dropping stale dub result (generation {} != {})",
                        resource.generation, self.dub_generation
                    );
                    return Ok(());
                }
                info!(
                    "dub ready: {:.2}s audio, {} chunk(s) synthesized, {} skipped",
                    resource.duration_sec, resource.synthesized_chunks, resource.skipped_chunks
                );
                self.dub = Some(resource);
                self.status = OperationStatus::Idle;
                Ok(())
            }
            Err(e) => {
                if matches!(self.status, OperationStatus::Dubbing { .. }) {
                    self.status = OperationStatus::Failed {
                        message: e.to_string(),
                    };
                }
                Err(e)
            }
        }
    }

    /// Convenience wrapper running the whole dub flow inline
    pub async fn run_dub(
        &mut self,
        provider: &dyn SubtitleAiProvider,
        voice: &str,
        progress: Option<&ProgressFn>,
    ) -> CoreResult<()> {
        let request = self.begin_dub(voice)?;
        let result = dubbing::generate_dub(provider, &request, progress).await;
        self.apply_dub_result(result)
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Exports the cue sequence as SRT
    pub fn export_srt(&self) -> String {
        export::export_srt(&self.store.snapshot())
    }

    /// Exports the cue sequence as pretty-printed JSON
    pub fn export_json(&self) -> CoreResult<String> {
        export::export_json(&self.store.snapshot())
    }

    /// Conventional export file name for this project
    pub fn export_file_name(&self, format: &str) -> String {
        export::export_file_name(&self.name, format)
    }

    fn ensure_can_start(&self, operation: &str) -> CoreResult<()> {
        if self.status.can_start() {
            Ok(())
        } else {
            Err(CoreError::OperationInProgress(operation.to_string()))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ai::{MockProvider, RawTranscriptEntry};

    fn transcript() -> TranscriptionOutput {
        TranscriptionOutput {
            language: "English".to_string(),
            entries: vec![
                RawTranscriptEntry {
                    start_time: "00:00:00,000".to_string(),
                    end_time: "00:00:02,000".to_string(),
                    text: "Hi".to_string(),
                    speaker: Some("A".to_string()),
                    confidence: Some(0.95),
                },
                RawTranscriptEntry {
                    start_time: "00:00:02,000".to_string(),
                    end_time: "00:00:05,000".to_string(),
                    text: "There".to_string(),
                    speaker: None,
                    confidence: None,
                },
            ],
        }
    }

    fn populated_project() -> Project {
        let mut project = Project::new();
        project.load_media("interview.mp4", "video/mp4");
        project.apply_transcription(transcript()).unwrap();
        project
    }

    fn cue_ids(project: &Project) -> Vec<String> {
        project.store().iter().map(|c| c.id.clone()).collect()
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    #[test]
    fn test_load_media_sets_name_and_clears_state() {
        let mut project = populated_project();
        assert_eq!(project.store().len(), 2);

        project.load_media("other.webm", "video/webm");
        assert_eq!(project.name(), "other.webm");
        assert!(project.store().is_empty());
        assert!(!project.can_undo());
        assert!(project.dub().is_none());
    }

    #[test]
    fn test_apply_transcription_populates_and_commits() {
        let project = populated_project();
        assert_eq!(project.store().len(), 2);
        assert_eq!(project.store().iter().next().unwrap().speaker, Some("A".to_string()));
        // One initial snapshot, no undo below it
        assert!(!project.can_undo());
    }

    #[test]
    fn test_apply_transcription_malformed_leaves_store_untouched() {
        let mut project = Project::new();
        project.load_media("clip.mp4", "video/mp4");

        let mut output = transcript();
        output.entries[1].end_time = "bogus".to_string();

        let result = project.apply_transcription(output);
        assert!(matches!(result, Err(CoreError::MalformedTimestamp(_))));
        assert!(project.store().is_empty());
    }

    #[tokio::test]
    async fn test_run_transcription_failure_sets_terminal_status() {
        let provider = MockProvider::new().with_available(false);
        let mut project = Project::new();
        project.load_media("clip.mp4", "video/mp4");

        let result = project.run_transcription(&provider, b"pcm", "audio/wav").await;
        assert!(matches!(result, Err(CoreError::TranscriptionFailed(_))));
        assert!(matches!(project.status(), OperationStatus::Failed { .. }));
        assert!(project.store().is_empty());
    }

    // -------------------------------------------------------------------------
    // Editing & History
    // -------------------------------------------------------------------------

    #[test]
    fn test_update_without_commit_is_not_undoable_alone() {
        let mut project = populated_project();
        let id = cue_ids(&project)[0].clone();

        project.update_cue(&id, CueUpdate::text("Hello"));
        project.update_cue(&id, CueUpdate::text("Hello world"));
        project.commit_edit();

        // One undo steps over both keystroke-level edits
        assert!(project.undo());
        assert_eq!(project.store().get(&id).unwrap().text, "Hi");
    }

    #[test]
    fn test_delete_commits_immediately() {
        let mut project = populated_project();
        let id = cue_ids(&project)[0].clone();

        project.delete_cue(&id).unwrap();
        assert_eq!(project.store().len(), 1);

        assert!(project.undo());
        assert_eq!(project.store().len(), 2);
    }

    #[test]
    fn test_delete_missing_cue_errors() {
        let mut project = populated_project();
        assert!(matches!(
            project.delete_cue("ghost"),
            Err(CoreError::CueNotFound(_))
        ));
    }

    #[test]
    fn test_shift_all_scenario_a() {
        // [{0,2,"Hi"},{2,5,"There"}] shifted by -1.0 → [{0,1},{1,4}]
        let mut project = populated_project();
        project.shift_all(-1.0);

        let cues = project.store().sorted_by_start();
        assert_eq!(cues[0].start_sec, 0.0);
        assert_eq!(cues[0].end_sec, 1.0);
        assert_eq!(cues[1].start_sec, 1.0);
        assert_eq!(cues[1].end_sec, 4.0);

        assert!(project.undo());
        let cues = project.store().sorted_by_start();
        assert_eq!(cues[1].end_sec, 5.0);
    }

    #[test]
    fn test_split_cue() {
        let mut project = populated_project();
        let id = cue_ids(&project)[1].clone(); // "There", 2..5

        let sibling_id = project.split_cue(&id, 3.5).unwrap();
        assert_ne!(sibling_id, id);

        let first = project.store().get(&id).unwrap();
        assert_eq!(first.end_sec, 3.5);
        let second = project.store().get(&sibling_id).unwrap();
        assert_eq!(second.start_sec, 3.5);
        assert_eq!(second.end_sec, 5.0);

        // Split is one undoable action
        assert!(project.undo());
        assert!(project.store().get(&sibling_id).is_none());
        assert_eq!(project.store().get(&id).unwrap().end_sec, 5.0);
    }

    #[test]
    fn test_split_cue_rejects_out_of_range_point() {
        let mut project = populated_project();
        let id = cue_ids(&project)[0].clone(); // 0..2

        assert!(matches!(
            project.split_cue(&id, 2.0),
            Err(CoreError::InvalidSplitPoint(_))
        ));
        assert!(matches!(
            project.split_cue(&id, 0.0),
            Err(CoreError::InvalidSplitPoint(_))
        ));
    }

    #[test]
    fn test_undo_redo_scenario_b() {
        let mut project = populated_project(); // S0 committed
        let id = cue_ids(&project)[0].clone();

        project.update_cue(&id, CueUpdate::text("S1"));
        project.commit_edit(); // S1
        assert!(project.undo()); // back to S0
        assert_eq!(project.store().get(&id).unwrap().text, "Hi");

        project.update_cue(&id, CueUpdate::text("S2"));
        project.commit_edit(); // S2 discards S1

        assert!(!project.redo()); // forward branch is gone
        assert_eq!(project.store().get(&id).unwrap().text, "S2");

        assert!(project.undo());
        assert_eq!(project.store().get(&id).unwrap().text, "Hi");
    }

    // -------------------------------------------------------------------------
    // Translation
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_translation_scenario_c_partial_response() {
        let mut project = populated_project();
        let ids = cue_ids(&project);

        // First translation covers only the first cue
        let provider = MockProvider::new().with_translation(&ids[0], "Hola");
        project.run_translation(&provider, "Spanish").await.unwrap();

        let first = project.store().get(&ids[0]).unwrap();
        assert_eq!(first.text, "Hola");
        assert_eq!(first.original_text, Some("Hi".to_string()));

        let second = project.store().get(&ids[1]).unwrap();
        assert_eq!(second.text, "There");
        assert!(second.original_text.is_none());

        // Second translation round: original_text must not be overwritten
        let provider = MockProvider::new().with_translation(&ids[0], "Bonjour");
        project.run_translation(&provider, "French").await.unwrap();

        let first = project.store().get(&ids[0]).unwrap();
        assert_eq!(first.text, "Bonjour");
        assert_eq!(first.original_text, Some("Hi".to_string()));
    }

    #[tokio::test]
    async fn test_translation_unknown_id_is_ignored() {
        let mut project = populated_project();
        project.apply_translation(vec![TranslatedCueText {
            id: "ghost".to_string(),
            translated_text: "Boo".to_string(),
        }]);
        assert_eq!(project.store().len(), 2);
    }

    #[tokio::test]
    async fn test_translation_failure_leaves_store_unchanged() {
        let mut project = populated_project();
        let provider = MockProvider::new().with_available(false);

        let result = project.run_translation(&provider, "Spanish").await;
        assert!(matches!(result, Err(CoreError::TranslationFailed(_))));
        assert!(matches!(project.status(), OperationStatus::Failed { .. }));
        assert_eq!(project.store().get(&cue_ids(&project)[0]).unwrap().text, "Hi");
    }

    // -------------------------------------------------------------------------
    // Dubbing
    // -------------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn test_run_dub_stores_resource() {
        let mut project = populated_project();
        let provider = MockProvider::new();

        project.run_dub(&provider, "Kore", None).await.unwrap();

        let dub = project.dub().unwrap();
        assert!(dub.duration_sec > 0.0);
        assert_eq!(*project.status(), OperationStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_dub_result_is_dropped_after_reset() {
        let mut project = populated_project();
        let provider = MockProvider::new();

        let request = project.begin_dub("Kore").unwrap();
        let result = dubbing::generate_dub(&provider, &request, None).await;

        // The project is reset while the pipeline was "in flight"
        project.reset();
        project.apply_dub_result(result).unwrap();

        assert!(project.dub().is_none());
    }

    #[test]
    fn test_stale_progress_is_ignored() {
        let mut project = populated_project();
        let request = project.begin_dub("Kore").unwrap();

        project.apply_dub_progress(request.generation, 50.0);
        assert_eq!(
            *project.status(),
            OperationStatus::Dubbing { progress: 50.0 }
        );

        project.apply_dub_progress(request.generation.wrapping_sub(1), 99.0);
        assert_eq!(
            *project.status(),
            OperationStatus::Dubbing { progress: 50.0 }
        );
    }

    #[test]
    fn test_begin_dub_guards_concurrent_operations() {
        let mut project = populated_project();
        let _request = project.begin_dub("Kore").unwrap();

        assert!(matches!(
            project.begin_dub("Kore"),
            Err(CoreError::OperationInProgress(_))
        ));
    }

    #[test]
    fn test_begin_dub_requires_text() {
        let mut project = Project::new();
        project.load_media("clip.mp4", "video/mp4");

        assert!(matches!(
            project.begin_dub("Kore"),
            Err(CoreError::DubbingFailed(_))
        ));
    }

    // -------------------------------------------------------------------------
    // Export
    // -------------------------------------------------------------------------

    #[test]
    fn test_export_file_name_uses_project_name() {
        let project = populated_project();
        assert_eq!(project.export_file_name("srt"), "interview_subs.srt");
        assert_eq!(project.export_file_name("json"), "interview_subs.json");
    }

    #[test]
    fn test_export_srt_from_project() {
        let project = populated_project();
        let srt = project.export_srt();
        assert!(srt.contains("00:00:00,000 --> 00:00:02,000"));
        assert!(srt.contains("Hi"));
        assert!(srt.contains("There"));
    }

    // -------------------------------------------------------------------------
    // Persistence integration
    // -------------------------------------------------------------------------

    #[test]
    fn test_autosave_and_load_saved_round_trip() {
        use crate::core::persistence::SqliteStore;

        let sink = Arc::new(SqliteStore::in_memory().unwrap());
        let mut project = Project::with_autosave(sink.clone(), "user-1");
        project.load_media("talk.mp4", "video/mp4");
        project.apply_transcription(transcript()).unwrap(); // commit → autosave

        let mut restored = Project::new();
        assert!(restored.load_saved(sink.as_ref(), "user-1").unwrap());
        assert_eq!(restored.name(), "talk.mp4");
        assert_eq!(restored.store().len(), 2);

        let mut empty = Project::new();
        assert!(!empty.load_saved(sink.as_ref(), "user-2").unwrap());
    }
}
