//! Subtitle System Module
//!
//! Cue data model and the ordered cue store backing the editor:
//! - `models.rs` - Cue and partial-update structures
//! - `store.rs`  - insert/update/delete/shift/active-at over the working set

mod models;
mod store;

pub use models::{Cue, CueUpdate};
pub use store::CueStore;
