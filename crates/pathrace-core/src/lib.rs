//! **pathrace-core**: shared types for the pathrace workspace.
//!
//! This crate provides the geometry primitives used by the search engine,
//! the command/message vocabulary understood by the visualizer, and the
//! Elm-architecture loop ([`Model`], [`Effect`], [`Runner`]) that drives
//! commands and the playback timer.

pub mod app;
pub mod geom;
pub mod messages;

pub use app::{Context, Effect, Model, Runner, cmd};
pub use geom::{Point, Range};
pub use messages::{Command, Msg};
