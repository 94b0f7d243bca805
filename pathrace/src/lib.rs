//! **pathrace**: uniform-cost, greedy best-first and A* search racing over
//! one obstacle grid, with every expansion recorded and scrubbable.
//!
//! [`Visualizer`] is the entry point. It owns the editable
//! [`Configuration`], recomputes all three searches whenever it changes, and
//! exposes one progress cursor over the recorded timelines. It implements
//! [`pathrace_core::Model`], so a [`pathrace_core::Runner`] can drive it with
//! [`pathrace_core::Command`]s and playback ticks.

pub mod config;
pub mod configuration;
pub mod input;
pub mod render;
pub mod visualizer;

pub use config::VisualizerConfig;
pub use configuration::{Configuration, Rejection};
pub use input::{Input, ParseCommandError};
pub use visualizer::Visualizer;

pub use pathrace_replay::{CellView, ProgressPolicy};
pub use pathrace_search::{StepResult, Variant};
