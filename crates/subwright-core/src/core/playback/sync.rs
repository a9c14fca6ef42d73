//! Playback Synchronizer
//!
//! Keeps a primary media track and an optional dubbed audio track
//! time-aligned under play/pause/seek. The primary clock is the reference
//! the user edits against, so correction is strictly one-directional: the
//! dub track snaps to the primary, never the reverse.

use tracing::{debug, warn};

use crate::core::playback::MediaClock;
use crate::core::{CoreResult, TimeSec};

/// Observed-time delta beyond which a tick is treated as a user scrub and
/// the primary is forcibly repositioned. Smaller deltas are natural
/// playback progress and must not cause a reposition every frame.
pub const SEEK_THRESHOLD_SEC: f64 = 0.2;

/// Drift beyond which the dub track is snapped to the primary's position
pub const DRIFT_CORRECTION_SEC: f64 = 0.3;

// =============================================================================
// State Machine
// =============================================================================

/// Playback state of the synchronized track pair
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    /// No media loaded
    Idle,
    /// Media loaded, not advancing
    Paused,
    /// Both tracks advancing
    Playing,
    /// User is scrubbing; time-sync is suppressed to avoid feedback loops
    Seeking { resume_playing: bool },
}

/// Which track is audible; the other is force-muted but stays aligned
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AudibleTrack {
    #[default]
    Primary,
    Dub,
}

// =============================================================================
// Playback Synchronizer
// =============================================================================

/// Owns the two clock handles and issues all position/play/mute commands
pub struct PlaybackSynchronizer {
    primary: Option<Box<dyn MediaClock>>,
    dub: Option<Box<dyn MediaClock>>,
    state: PlaybackState,
    audible: AudibleTrack,
    volume: f64,
}

impl Default for PlaybackSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackSynchronizer {
    /// Creates an idle synchronizer with no media
    pub fn new() -> Self {
        Self {
            primary: None,
            dub: None,
            state: PlaybackState::Idle,
            audible: AudibleTrack::Primary,
            volume: 1.0,
        }
    }

    /// Loads the primary track, replacing any previous pair. The new pair
    /// starts paused at position 0.
    pub fn load(&mut self, primary: Box<dyn MediaClock>) {
        self.primary = Some(primary);
        self.dub = None;
        self.state = PlaybackState::Paused;
        self.audible = AudibleTrack::Primary;
        self.apply_audibility();
    }

    /// Attaches (or replaces) the dub track, aligning it to the primary
    pub fn attach_dub(&mut self, mut dub: Box<dyn MediaClock>) {
        if let Some(primary) = &self.primary {
            dub.seek(primary.position());
        }
        self.dub = Some(dub);
        self.apply_audibility();
        if self.state == PlaybackState::Playing {
            if let Some(dub) = &mut self.dub {
                if let Err(e) = dub.play() {
                    warn!("dub track failed to start: {}", e);
                }
            }
        }
    }

    /// Detaches the dub track; audibility falls back to the primary
    pub fn detach_dub(&mut self) {
        self.dub = None;
        self.audible = AudibleTrack::Primary;
        self.apply_audibility();
    }

    /// Current state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Which track is audible
    pub fn audible(&self) -> AudibleTrack {
        self.audible
    }

    /// Starts both tracks. Dub start failure is non-fatal - the primary
    /// proceeds and the dub stays attached (it will be realigned on the
    /// next tick once it recovers).
    pub fn play(&mut self) -> CoreResult<()> {
        let Some(primary) = &mut self.primary else {
            return Ok(()); // Idle: nothing to play
        };

        primary.play()?;
        if let Some(dub) = &mut self.dub {
            if let Err(e) = dub.play() {
                warn!("dub track failed to start, continuing without it: {}", e);
            }
        }
        self.state = PlaybackState::Playing;
        Ok(())
    }

    /// Pauses both tracks
    pub fn pause(&mut self) {
        if let Some(primary) = &mut self.primary {
            primary.pause();
        }
        if let Some(dub) = &mut self.dub {
            dub.pause();
        }
        if self.state != PlaybackState::Idle {
            self.state = PlaybackState::Paused;
        }
    }

    /// Marks the start of a user scrub; time-sync is suppressed until
    /// `end_seek`.
    pub fn begin_seek(&mut self) {
        if matches!(self.state, PlaybackState::Idle | PlaybackState::Seeking { .. }) {
            return;
        }
        let resume_playing = self.state == PlaybackState::Playing;
        if let Some(primary) = &mut self.primary {
            primary.pause();
        }
        if let Some(dub) = &mut self.dub {
            dub.pause();
        }
        self.state = PlaybackState::Seeking { resume_playing };
    }

    /// Completes a scrub at `target`, repositioning both tracks and
    /// restoring the prior play state.
    pub fn end_seek(&mut self, target: TimeSec) -> CoreResult<()> {
        let PlaybackState::Seeking { resume_playing } = self.state else {
            return Ok(());
        };

        if let Some(primary) = &mut self.primary {
            primary.seek(target);
        }
        if let Some(dub) = &mut self.dub {
            dub.seek(target);
        }

        self.state = PlaybackState::Paused;
        if resume_playing {
            self.play()?;
        }
        Ok(())
    }

    /// Periodic sync driven by the externally observed current time
    /// (e.g. the UI's playhead). Applies the time-jump contract to the
    /// primary, then one-directional drift correction to the dub.
    pub fn tick(&mut self, observed_sec: TimeSec) {
        if matches!(
            self.state,
            PlaybackState::Idle | PlaybackState::Seeking { .. }
        ) {
            return;
        }

        let Some(primary) = &mut self.primary else {
            return;
        };

        // Large delta = user scrub from outside; small delta = ordinary
        // playback progress, which must not trigger repositioning.
        if (observed_sec - primary.position()).abs() > SEEK_THRESHOLD_SEC {
            debug!(
                "external time jump to {:.3}s, repositioning primary",
                observed_sec
            );
            primary.seek(observed_sec);
            if let Some(dub) = &mut self.dub {
                dub.seek(observed_sec);
            }
            return;
        }

        // Drift correction only runs while playing; the dub follows the
        // primary, never the reverse.
        if self.state == PlaybackState::Playing {
            let reference = primary.position();
            if let Some(dub) = &mut self.dub {
                let drift = (reference - dub.position()).abs();
                if drift > DRIFT_CORRECTION_SEC {
                    debug!("dub drifted {:.3}s, snapping to primary", drift);
                    dub.seek(reference);
                }
            }
        }
    }

    /// Switches which track is audible. The inactive track is always
    /// muted and keeps being time-aligned so toggling is seamless.
    pub fn set_audible(&mut self, track: AudibleTrack) {
        self.audible = track;
        self.apply_audibility();
    }

    /// Sets the shared volume, applied to whichever track is audible
    pub fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
        self.apply_audibility();
    }

    /// Current position of the primary track
    pub fn position(&self) -> TimeSec {
        self.primary.as_ref().map(|p| p.position()).unwrap_or(0.0)
    }

    fn apply_audibility(&mut self) {
        let volume = self.volume;
        let audible = self.audible;

        if let Some(primary) = &mut self.primary {
            let is_audible = audible == AudibleTrack::Primary;
            primary.set_muted(!is_audible);
            if is_audible {
                primary.set_volume(volume);
            }
        }
        if let Some(dub) = &mut self.dub {
            let is_audible = audible == AudibleTrack::Dub;
            dub.set_muted(!is_audible);
            if is_audible {
                dub.set_volume(volume);
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
