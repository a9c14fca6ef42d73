//! Cue Store
//!
//! Ordered collection of subtitle cues for the current project. Storage
//! order is insertion order; read paths that need playback order sort on
//! demand, so mutations never pay for a resort.

use std::collections::HashSet;

use tracing::warn;

use crate::core::subtitles::{Cue, CueUpdate};
use crate::core::{TimeRange, TimeSec};

// =============================================================================
// Cue Store
// =============================================================================

/// The working set of cues. Ids are unique at all times; times are kept
/// non-negative.
#[derive(Clone, Debug, Default)]
pub struct CueStore {
    cues: Vec<Cue>,
}

impl CueStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store from an existing cue sequence (e.g. a restored
    /// snapshot or a parsed subtitle file). Duplicate ids get regenerated.
    pub fn from_cues(cues: Vec<Cue>) -> Self {
        let mut store = Self::new();
        store.insert_many(cues);
        store
    }

    /// Appends a batch of cues, assigning a fresh id to any cue that
    /// arrives without one. Does not sort.
    pub fn insert_many(&mut self, cues: Vec<Cue>) {
        let mut seen: HashSet<String> = self.cues.iter().map(|c| c.id.clone()).collect();

        for mut cue in cues {
            if cue.id.is_empty() || seen.contains(&cue.id) {
                if !cue.id.is_empty() {
                    warn!("duplicate cue id {} regenerated on insert", cue.id);
                }
                cue.id = ulid::Ulid::new().to_string();
            }
            cue.start_sec = cue.start_sec.max(0.0);
            cue.end_sec = cue.end_sec.max(cue.start_sec);
            seen.insert(cue.id.clone());
            self.cues.push(cue);
        }
    }

    /// Merges the update into the matching cue. Returns false (a no-op)
    /// when the id is absent. Never changes the cue id.
    pub fn update(&mut self, id: &str, update: CueUpdate) -> bool {
        let Some(cue) = self.cues.iter_mut().find(|c| c.id == id) else {
            return false;
        };

        if let Some(start) = update.start_sec {
            cue.start_sec = start.max(0.0);
        }
        if let Some(end) = update.end_sec {
            cue.end_sec = end.max(0.0);
        }
        if let Some(text) = update.text {
            cue.text = text;
        }
        if let Some(speaker) = update.speaker {
            cue.speaker = Some(speaker);
        }
        true
    }

    /// Replaces a cue's text with its translation, capturing
    /// `original_text` exactly once - the first translation wins, later
    /// rounds never overwrite the pre-translation text. Returns false
    /// when the id is absent.
    pub fn apply_translation(&mut self, id: &str, translated: &str) -> bool {
        let Some(cue) = self.cues.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        if cue.original_text.is_none() {
            cue.original_text = Some(cue.text.clone());
        }
        cue.text = translated.to_string();
        true
    }

    /// Removes and returns the cue with the given id
    pub fn delete(&mut self, id: &str) -> Option<Cue> {
        let pos = self.cues.iter().position(|c| c.id == id)?;
        Some(self.cues.remove(pos))
    }

    /// Adds `delta_sec` to every cue's start and end, clamping each bound
    /// to 0 independently. A cue straddling the clamp point shrinks.
    pub fn shift_all(&mut self, delta_sec: TimeSec) {
        for cue in &mut self.cues {
            cue.start_sec = (cue.start_sec + delta_sec).max(0.0);
            cue.end_sec = (cue.end_sec + delta_sec).max(0.0);
        }
    }

    /// Returns every cue active at `time_sec` (`start <= t <= end`), in
    /// store order. Overlapping cues are all returned.
    pub fn active_at(&self, time_sec: TimeSec) -> Vec<&Cue> {
        self.cues
            .iter()
            .filter(|c| c.is_active_at(time_sec))
            .collect()
    }

    /// Returns every cue overlapping the given window (the timeline's
    /// visible-region read path), in store order.
    pub fn in_range(&self, range: &TimeRange) -> Vec<&Cue> {
        self.cues
            .iter()
            .filter(|c| c.start_sec < range.end_sec && c.end_sec > range.start_sec)
            .collect()
    }

    /// Returns a cue by id
    pub fn get(&self, id: &str) -> Option<&Cue> {
        self.cues.iter().find(|c| c.id == id)
    }

    /// Returns the cues in playback order (ascending start time), without
    /// touching storage order.
    pub fn sorted_by_start(&self) -> Vec<Cue> {
        let mut sorted = self.cues.clone();
        sorted.sort_by(|a, b| {
            a.start_sec
                .partial_cmp(&b.start_sec)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        sorted
    }

    /// Concatenates cue texts in playback order with single spaces; this
    /// is the dub pipeline's input.
    pub fn concatenated_text(&self) -> String {
        self.sorted_by_start()
            .iter()
            .map(|c| c.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Returns a snapshot copy of the full cue sequence
    pub fn snapshot(&self) -> Vec<Cue> {
        self.cues.clone()
    }

    /// Replaces the entire cue sequence (undo/redo restore path)
    pub fn restore(&mut self, cues: Vec<Cue>) {
        self.cues = cues;
    }

    /// Removes every cue
    pub fn clear(&mut self) {
        self.cues.clear();
    }

    /// Returns the number of cues
    pub fn len(&self) -> usize {
        self.cues.len()
    }

    /// Returns true if the store holds no cues
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Iterates cues in storage order
    pub fn iter(&self) -> impl Iterator<Item = &Cue> {
        self.cues.iter()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(cues: Vec<Cue>) -> CueStore {
        let mut store = CueStore::new();
        store.insert_many(cues);
        store
    }

    #[test]
    fn test_insert_many_preserves_order_without_sorting() {
        let store = store_with(vec![
            Cue::new("b", 5.0, 8.0, "Second"),
            Cue::new("a", 0.0, 3.0, "First"),
        ]);

        let ids: Vec<&str> = store.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_insert_many_assigns_missing_ids() {
        let store = store_with(vec![Cue::new("", 0.0, 1.0, "x")]);
        assert!(!store.iter().next().unwrap().id.is_empty());
    }

    #[test]
    fn test_insert_many_regenerates_duplicate_ids() {
        let store = store_with(vec![
            Cue::new("dup", 0.0, 1.0, "one"),
            Cue::new("dup", 1.0, 2.0, "two"),
        ]);

        let ids: Vec<&str> = store.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn test_update_merges_partial_fields() {
        let mut store = store_with(vec![Cue::new("c1", 1.0, 2.0, "old")]);

        assert!(store.update("c1", CueUpdate::text("new")));
        let cue = store.get("c1").unwrap();
        assert_eq!(cue.text, "new");
        assert_eq!(cue.start_sec, 1.0);
        assert_eq!(cue.end_sec, 2.0);
    }

    #[test]
    fn test_update_missing_id_is_noop() {
        let mut store = store_with(vec![Cue::new("c1", 1.0, 2.0, "x")]);
        assert!(!store.update("nope", CueUpdate::text("y")));
        assert_eq!(store.get("c1").unwrap().text, "x");
    }

    #[test]
    fn test_update_never_changes_id() {
        let mut store = store_with(vec![Cue::new("c1", 1.0, 2.0, "x")]);
        store.update("c1", CueUpdate::timing(0.5, 3.0));
        assert!(store.get("c1").is_some());
    }

    #[test]
    fn test_apply_translation_captures_original_once() {
        let mut store = store_with(vec![Cue::new("c1", 0.0, 1.0, "Hello")]);

        assert!(store.apply_translation("c1", "Hola"));
        let cue = store.get("c1").unwrap();
        assert_eq!(cue.text, "Hola");
        assert_eq!(cue.original_text, Some("Hello".to_string()));

        store.apply_translation("c1", "Bonjour");
        let cue = store.get("c1").unwrap();
        assert_eq!(cue.text, "Bonjour");
        assert_eq!(cue.original_text, Some("Hello".to_string()));

        assert!(!store.apply_translation("ghost", "Boo"));
    }

    #[test]
    fn test_delete_returns_removed_cue() {
        let mut store = store_with(vec![Cue::new("c1", 0.0, 2.0, "bye")]);
        let removed = store.delete("c1").unwrap();
        assert_eq!(removed.text, "bye");
        assert!(store.is_empty());
        assert!(store.delete("c1").is_none());
    }

    #[test]
    fn test_shift_all_clamps_bounds_independently() {
        // Scenario A: [{0,2},{2,5}] shifted by -1.0 → [{0,1},{1,4}]
        let mut store = store_with(vec![
            Cue::new("a", 0.0, 2.0, "Hi"),
            Cue::new("b", 2.0, 5.0, "There"),
        ]);

        store.shift_all(-1.0);

        let a = store.get("a").unwrap();
        assert_eq!(a.start_sec, 0.0);
        assert_eq!(a.end_sec, 1.0);
        let b = store.get("b").unwrap();
        assert_eq!(b.start_sec, 1.0);
        assert_eq!(b.end_sec, 4.0);
    }

    #[test]
    fn test_shift_all_composes_modulo_clamping() {
        let mut once = store_with(vec![Cue::new("a", 3.0, 6.0, "x")]);
        once.shift_all(1.5);
        once.shift_all(-0.5);

        let mut combined = store_with(vec![Cue::new("a", 3.0, 6.0, "x")]);
        combined.shift_all(1.0);

        assert_eq!(once.get("a").unwrap(), combined.get("a").unwrap());
    }

    #[test]
    fn test_active_at_returns_all_overlapping_in_store_order() {
        let store = store_with(vec![
            Cue::new("late", 1.5, 3.5, "Second"),
            Cue::new("early", 0.0, 2.0, "First"),
            Cue::new("other", 4.0, 6.0, "Third"),
        ]);

        let active = store.active_at(1.75);
        let ids: Vec<&str> = active.iter().map(|c| c.id.as_str()).collect();
        // Store order, not time order
        assert_eq!(ids, vec!["late", "early"]);
    }

    #[test]
    fn test_active_at_bounds_inclusive() {
        let store = store_with(vec![Cue::new("c", 1.0, 2.0, "x")]);
        assert_eq!(store.active_at(1.0).len(), 1);
        assert_eq!(store.active_at(2.0).len(), 1);
        assert_eq!(store.active_at(2.0001).len(), 0);
    }

    #[test]
    fn test_in_range_returns_overlapping_cues() {
        let store = store_with(vec![
            Cue::new("a", 0.0, 2.0, "First"),
            Cue::new("b", 3.0, 5.0, "Second"),
            Cue::new("c", 6.0, 8.0, "Third"),
        ]);

        let window = TimeRange::new(1.0, 4.0);
        let visible = store.in_range(&window);
        let ids: Vec<&str> = visible.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_concatenated_text_orders_by_start_time() {
        let store = store_with(vec![
            Cue::new("b", 5.0, 8.0, "world."),
            Cue::new("a", 0.0, 3.0, "Hello"),
            Cue::new("c", 9.0, 10.0, "  "),
        ]);

        assert_eq!(store.concatenated_text(), "Hello world.");
    }

    #[test]
    fn test_snapshot_and_restore_round_trip() {
        let mut store = store_with(vec![Cue::new("a", 0.0, 1.0, "one")]);
        let snap = store.snapshot();

        store.update("a", CueUpdate::text("changed"));
        store.restore(snap);

        assert_eq!(store.get("a").unwrap().text, "one");
    }
}
