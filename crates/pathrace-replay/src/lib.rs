//! Recorded search histories and time travel over them.
//!
//! - [`Recorder`] captures one [`Step`] per search step into a [`Timeline`].
//! - [`ScrubController`] maps a single progress cursor onto several timelines
//!   at once and drives timed playback through [`pathrace_core::Effect`]s.

mod scrub;
mod timeline;
mod view;

pub use scrub::{ProgressPolicy, ScrubController};
pub use timeline::{DEFAULT_CHECKPOINT_INTERVAL, Recorder, Step, Timeline, record_run};
pub use view::CellView;
