//! Playback Module
//!
//! Dual-track playback synchronization:
//! - `clock.rs` - the owned clock handle abstraction and a manual test clock
//! - `sync.rs`  - the state machine coordinating primary and dub tracks

mod clock;
mod sync;

pub use clock::{ManualClock, MediaClock};
pub use sync::{
    AudibleTrack, PlaybackState, PlaybackSynchronizer, DRIFT_CORRECTION_SEC, SEEK_THRESHOLD_SEC,
};
