//! Messages delivered to a [`Model`](crate::app::Model): [`Msg`] and the
//! [`Command`] vocabulary understood by the visualizer.

use std::fmt;
use std::time::Instant;

use crate::geom::Point;

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A discrete request from the presentation layer.
///
/// Invalid commands (out-of-range sizes, endpoints on obstacles, toggles on
/// the start or end cell) are ignored by the receiver rather than reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Command {
    /// Resize the grid to `n × n`.
    SetGridSize(i32),
    /// Move the start cell.
    SetStart(Point),
    /// Move the goal cell.
    SetEnd(Point),
    /// Flip the obstacle bit of a cell.
    ToggleObstacle(Point),
    /// Remove every obstacle.
    ClearObstacles,
    /// Place up to `count` random obstacles, deterministic per `seed`.
    ScatterObstacles { count: usize, seed: u64 },
    /// Advance the progress cursor by one.
    StepForward,
    /// Move the progress cursor back by one.
    StepBackward,
    /// Jump the progress cursor.
    SetProgress(usize),
    /// Begin automatic forward playback.
    StartPlayback,
    /// Cancel automatic playback.
    StopPlayback,
    /// Stop playback and rewind to the initial step.
    Reset,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetGridSize(n) => write!(f, "size {n}"),
            Self::SetStart(p) => write!(f, "start {} {}", p.x, p.y),
            Self::SetEnd(p) => write!(f, "end {} {}", p.x, p.y),
            Self::ToggleObstacle(p) => write!(f, "wall {} {}", p.x, p.y),
            Self::ClearObstacles => f.write_str("clear"),
            Self::ScatterObstacles { count, seed } => write!(f, "scatter {count} {seed}"),
            Self::StepForward => f.write_str("next"),
            Self::StepBackward => f.write_str("prev"),
            Self::SetProgress(p) => write!(f, "seek {p}"),
            Self::StartPlayback => f.write_str("play"),
            Self::StopPlayback => f.write_str("stop"),
            Self::Reset => f.write_str("reset"),
        }
    }
}

// ---------------------------------------------------------------------------
// Msg
// ---------------------------------------------------------------------------

/// A message delivered to the application model.
#[derive(Clone, Debug)]
pub enum Msg {
    /// Sent once when the loop starts.
    Init,
    /// A user command.
    Command(Command),
    /// A playback timer fired. `token` identifies the playback session that
    /// scheduled it; ticks from a cancelled session are ignored.
    Tick { token: u64, time: Instant },
    /// Request to quit.
    Quit,
}

impl Msg {
    /// Convenience: wrap a command.
    pub fn command(command: Command) -> Self {
        Self::Command(command)
    }

    /// Convenience: a tick stamped with the current time.
    pub fn tick(token: u64) -> Self {
        Self::Tick {
            token,
            time: Instant::now(),
        }
    }
}

impl From<Command> for Msg {
    fn from(command: Command) -> Self {
        Self::Command(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_display_uses_line_syntax() {
        assert_eq!(Command::SetGridSize(12).to_string(), "size 12");
        assert_eq!(Command::SetStart(Point::new(1, 2)).to_string(), "start 1 2");
        assert_eq!(Command::ToggleObstacle(Point::new(3, 4)).to_string(), "wall 3 4");
        assert_eq!(
            Command::ScatterObstacles { count: 40, seed: 7 }.to_string(),
            "scatter 40 7"
        );
        assert_eq!(Command::StepBackward.to_string(), "prev");
    }

    #[test]
    fn msg_from_command() {
        let msg: Msg = Command::Reset.into();
        assert!(matches!(msg, Msg::Command(Command::Reset)));
        assert!(matches!(Msg::tick(3), Msg::Tick { token: 3, .. }));
    }
}
