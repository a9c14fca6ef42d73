//! Media Clock Abstraction
//!
//! A playback clock is whatever is actually producing audio/video time -
//! in the app, a media element on the UI side. The synchronizer never
//! reads shared state out of a clock's callbacks; it owns clock handles
//! and issues explicit commands, which is what keeps the two clocks from
//! feeding corrections back into each other.

use std::sync::{Arc, Mutex};

use crate::core::{CoreError, CoreResult, TimeSec};

// =============================================================================
// Media Clock Trait
// =============================================================================

/// An owned handle to one playback clock
pub trait MediaClock: Send {
    /// Current playback position in seconds
    fn position(&self) -> TimeSec;

    /// Repositions the clock
    fn seek(&mut self, position: TimeSec);

    /// Starts playback. May fail (e.g. the underlying element refused to
    /// start); the synchronizer decides whether that is fatal.
    fn play(&mut self) -> CoreResult<()>;

    /// Pauses playback
    fn pause(&mut self);

    /// Whether the clock is currently advancing
    fn is_playing(&self) -> bool;

    /// Mutes or unmutes the clock's audio
    fn set_muted(&mut self, muted: bool);

    /// Whether the clock's audio is muted
    fn is_muted(&self) -> bool;

    /// Sets the clock's volume in [0, 1]
    fn set_volume(&mut self, volume: f64);
}

// =============================================================================
// Manual Clock
// =============================================================================

#[derive(Debug, Default)]
struct ManualClockState {
    position: TimeSec,
    playing: bool,
    muted: bool,
    volume: f64,
    fail_play: bool,
    seek_count: usize,
}

/// A hand-driven clock for tests and headless runs. Cloned handles share
/// state, so a test can keep one handle while the synchronizer owns the
/// other.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    state: Arc<Mutex<ManualClockState>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock whose `play()` always fails, for secondary-failure tests
    pub fn failing() -> Self {
        let clock = Self::new();
        clock.state.lock().unwrap().fail_play = true;
        clock
    }

    /// Advances the position by `delta` seconds if playing
    pub fn advance(&self, delta: TimeSec) {
        let mut state = self.state.lock().unwrap();
        if state.playing {
            state.position += delta;
        }
    }

    /// Forces the position regardless of play state (simulated drift)
    pub fn drift_to(&self, position: TimeSec) {
        self.state.lock().unwrap().position = position;
    }

    /// Number of seek commands this clock has received
    pub fn seek_count(&self) -> usize {
        self.state.lock().unwrap().seek_count
    }

    pub fn volume(&self) -> f64 {
        self.state.lock().unwrap().volume
    }
}

impl MediaClock for ManualClock {
    fn position(&self) -> TimeSec {
        self.state.lock().unwrap().position
    }

    fn seek(&mut self, position: TimeSec) {
        let mut state = self.state.lock().unwrap();
        state.position = position.max(0.0);
        state.seek_count += 1;
    }

    fn play(&mut self) -> CoreResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_play {
            return Err(CoreError::Internal("clock refused to start".to_string()));
        }
        state.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.state.lock().unwrap().playing = false;
    }

    fn is_playing(&self) -> bool {
        self.state.lock().unwrap().playing
    }

    fn set_muted(&mut self, muted: bool) {
        self.state.lock().unwrap().muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.state.lock().unwrap().muted
    }

    fn set_volume(&mut self, volume: f64) {
        self.state.lock().unwrap().volume = volume.clamp(0.0, 1.0);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances_only_while_playing() {
        let mut clock = ManualClock::new();
        clock.advance(1.0);
        assert_eq!(clock.position(), 0.0);

        clock.play().unwrap();
        clock.advance(1.5);
        assert_eq!(clock.position(), 1.5);

        clock.pause();
        clock.advance(1.0);
        assert_eq!(clock.position(), 1.5);
    }

    #[test]
    fn test_manual_clock_shared_handles() {
        let mut owned = ManualClock::new();
        let observer = owned.clone();

        owned.seek(4.25);
        assert_eq!(observer.position(), 4.25);
        assert_eq!(observer.seek_count(), 1);
    }

    #[test]
    fn test_failing_clock_refuses_play() {
        let mut clock = ManualClock::failing();
        assert!(clock.play().is_err());
        assert!(!clock.is_playing());
    }

    #[test]
    fn test_seek_clamps_negative() {
        let mut clock = ManualClock::new();
        clock.seek(-2.0);
        assert_eq!(clock.position(), 0.0);
    }
}
