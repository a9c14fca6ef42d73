//! Edit History Module
//!
//! Linear undo/redo log over full snapshots of the cue sequence. A commit
//! after an undo discards the forward branch; this is a deliberate policy,
//! not a defect. Snapshots are full copies - at subtitle scale the memory
//! cost is negligible and it keeps restore trivially correct.

use std::sync::Arc;

use tracing::warn;

use crate::core::persistence::PersistenceSink;
use crate::core::subtitles::Cue;
use crate::core::UserId;

/// An immutable full copy of the cue sequence at one history point
pub type Snapshot = Vec<Cue>;

// =============================================================================
// Edit History
// =============================================================================

/// Linear snapshot history with a cursor. The cursor is -1 when the
/// history is empty and otherwise always a valid snapshot index.
pub struct EditHistory {
    snapshots: Vec<Snapshot>,
    cursor: isize,
    autosave: Option<AutosaveTarget>,
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Where commits are autosaved to
struct AutosaveTarget {
    sink: Arc<dyn PersistenceSink>,
    user_id: UserId,
}

impl EditHistory {
    /// Creates an empty history with no autosave collaborator
    pub fn new() -> Self {
        Self {
            snapshots: Vec::new(),
            cursor: -1,
            autosave: None,
        }
    }

    /// Configures the autosave collaborator. Every subsequent commit
    /// persists the committed snapshot for this user.
    pub fn with_autosave(mut self, sink: Arc<dyn PersistenceSink>, user_id: &str) -> Self {
        self.autosave = Some(AutosaveTarget {
            sink,
            user_id: user_id.to_string(),
        });
        self
    }

    /// Commits a snapshot: truncates any redo branch beyond the cursor,
    /// appends, advances the cursor, and fires autosave.
    ///
    /// Autosave failures are logged and swallowed - a broken disk must
    /// never block editing.
    pub fn commit(&mut self, snapshot: Snapshot, project_name: &str) {
        self.snapshots.truncate((self.cursor + 1) as usize);
        self.snapshots.push(snapshot);
        self.cursor = self.snapshots.len() as isize - 1;

        if let Some(target) = &self.autosave {
            let committed = &self.snapshots[self.cursor as usize];
            if let Err(e) =
                target
                    .sink
                    .save_project_state(&target.user_id, committed, project_name)
            {
                warn!("autosave failed: {}", e);
            }
        }
    }

    /// Steps back one snapshot and returns it. A no-op returning `None`
    /// at the lower bound.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.cursor <= 0 {
            return None;
        }
        self.cursor -= 1;
        self.snapshots.get(self.cursor as usize)
    }

    /// Steps forward one snapshot and returns it. A no-op returning
    /// `None` at the upper bound.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.cursor + 1 >= self.snapshots.len() as isize {
            return None;
        }
        self.cursor += 1;
        self.snapshots.get(self.cursor as usize)
    }

    /// Returns the snapshot the cursor points at
    pub fn current(&self) -> Option<&Snapshot> {
        if self.cursor < 0 {
            return None;
        }
        self.snapshots.get(self.cursor as usize)
    }

    /// Empties the history (cursor back to -1). Used on project reset and
    /// on loading a new project. The autosave collaborator is kept.
    pub fn reset(&mut self) {
        self.snapshots.clear();
        self.cursor = -1;
    }

    /// Number of snapshots currently held
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Returns true when no snapshot has been committed
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Current cursor index (-1 when empty)
    pub fn cursor(&self) -> isize {
        self.cursor
    }

    /// Whether an undo step is available
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether a redo step is available
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len() as isize
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::subtitles::Cue;
    use crate::core::CoreResult;
    use std::sync::Mutex;

    fn snap(text: &str) -> Snapshot {
        vec![Cue::new("c1", 0.0, 1.0, text)]
    }

    fn text_of(snapshot: &Snapshot) -> &str {
        &snapshot[0].text
    }

    #[test]
    fn test_empty_history() {
        let mut history = EditHistory::new();
        assert_eq!(history.cursor(), -1);
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert!(history.current().is_none());
    }

    #[test]
    fn test_commit_advances_cursor() {
        let mut history = EditHistory::new();
        history.commit(snap("S0"), "demo");
        history.commit(snap("S1"), "demo");

        assert_eq!(history.len(), 2);
        assert_eq!(history.cursor(), 1);
        assert_eq!(text_of(history.current().unwrap()), "S1");
    }

    #[test]
    fn test_undo_redo_boundaries_are_noops() {
        let mut history = EditHistory::new();
        history.commit(snap("S0"), "demo");

        assert!(history.undo().is_none());
        assert_eq!(history.cursor(), 0);
        assert!(history.redo().is_none());
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn test_commit_after_undo_discards_forward_branch() {
        // Scenario B: commit(S0), commit(S1), undo -> S0, commit(S2)
        // → history [S0, S2], cursor 1, redo is a no-op
        let mut history = EditHistory::new();
        history.commit(snap("S0"), "demo");
        history.commit(snap("S1"), "demo");

        let undone = history.undo().unwrap();
        assert_eq!(text_of(undone), "S0");

        history.commit(snap("S2"), "demo");
        assert_eq!(history.len(), 2);
        assert_eq!(history.cursor(), 1);
        assert_eq!(text_of(history.current().unwrap()), "S2");
        assert!(history.redo().is_none());

        let back = history.undo().unwrap();
        assert_eq!(text_of(back), "S0");
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut history = EditHistory::new();
        history.commit(snap("S0"), "demo");
        history.reset();

        assert!(history.is_empty());
        assert_eq!(history.cursor(), -1);
    }

    // -------------------------------------------------------------------------
    // Autosave
    // -------------------------------------------------------------------------

    #[derive(Default)]
    struct RecordingSink {
        saves: Mutex<Vec<(String, usize, String)>>,
        fail: bool,
    }

    impl PersistenceSink for RecordingSink {
        fn save_project_state(
            &self,
            user_id: &str,
            cues: &[Cue],
            project_name: &str,
        ) -> CoreResult<()> {
            if self.fail {
                return Err(crate::core::CoreError::PersistenceFailed(
                    "disk on fire".to_string(),
                ));
            }
            self.saves.lock().unwrap().push((
                user_id.to_string(),
                cues.len(),
                project_name.to_string(),
            ));
            Ok(())
        }

        fn load_project_state(&self, _user_id: &str) -> CoreResult<Option<(Vec<Cue>, String)>> {
            Ok(None)
        }

        fn log_activity(&self, _user_id: &str, _kind: &str, _details: &str) -> CoreResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_commit_triggers_autosave() {
        let sink = Arc::new(RecordingSink::default());
        let mut history = EditHistory::new().with_autosave(sink.clone(), "user-1");

        history.commit(snap("S0"), "interview");

        let saves = sink.saves.lock().unwrap();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0], ("user-1".to_string(), 1, "interview".to_string()));
    }

    #[test]
    fn test_autosave_failure_does_not_block_commit() {
        let sink = Arc::new(RecordingSink {
            fail: true,
            ..Default::default()
        });
        let mut history = EditHistory::new().with_autosave(sink, "user-1");

        history.commit(snap("S0"), "interview");
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_undo_without_autosave_configured() {
        let mut history = EditHistory::new();
        history.commit(snap("S0"), "demo");
        history.commit(snap("S1"), "demo");
        assert_eq!(text_of(history.undo().unwrap()), "S0");
    }
}
