use std::time::Duration;

use pathrace_replay::{DEFAULT_CHECKPOINT_INTERVAL, ProgressPolicy};

/// Configuration for creating a [`Visualizer`](crate::Visualizer).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VisualizerConfig {
    /// Initial side length; clamped into the supported range.
    pub grid_size: i32,
    /// Cursor behaviour when the timelines are recomputed.
    pub progress: ProgressPolicy,
    /// Delay between two playback steps.
    pub playback_interval: Duration,
    /// Steps between two full grid checkpoints in each timeline.
    pub checkpoint_interval: usize,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            grid_size: 20,
            progress: ProgressPolicy::Reset,
            playback_interval: Duration::from_millis(60),
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
        }
    }
}
