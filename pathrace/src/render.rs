//! Plain-text rendering of the scrubbed state.
//!
//! | Glyph | Cell |
//! |---|---|
//! | `S` / `G` | start / goal |
//! | `#` | obstacle |
//! | `*` | on the current path |
//! | `x` | expanded (closed) |
//! | `o` | in the frontier (open) |
//! | `.` | not yet reached |

use std::fmt::Write;

use pathrace_search::{StepResult, Variant};

use crate::visualizer::Visualizer;

fn glyph(vis: &Visualizer, variant: Variant, x: i32, y: i32) -> char {
    let p = pathrace_core::Point::new(x, y);
    if p == vis.start() {
        return 'S';
    }
    if p == vis.end() {
        return 'G';
    }
    match vis.cell_at(variant, x, y) {
        Some(c) if c.is_obstacle => '#',
        Some(c) if c.is_on_path => '*',
        Some(c) if c.is_closed => 'x',
        Some(c) if c.is_open => 'o',
        _ => '.',
    }
}

/// One search at the current progress: a header line, then one text row per
/// grid row.
pub fn lane(vis: &Visualizer, variant: Variant) -> String {
    let mut out = String::new();
    let (index, last) = match (vis.step(variant), vis.timeline(variant)) {
        (Some(s), Some(t)) => (s.index(), t.last_index()),
        _ => (0, 0),
    };
    let status = match vis.step(variant).and_then(|s| s.result()) {
        Some(StepResult::GoalReached) => "goal reached",
        Some(StepResult::Exhausted) => "no path",
        Some(StepResult::Expanded(_)) => "searching",
        None => "ready",
    };
    let _ = writeln!(
        out,
        "{variant}: step {index}/{last}, {status}, path {}",
        vis.path(variant).len()
    );
    let n = vis.grid_size();
    for y in 0..n {
        out.extend((0..n).map(|x| glyph(vis, variant, x, y)));
        out.push('\n');
    }
    out
}

/// Every search, separated by blank lines, under a progress header.
pub fn summary(vis: &Visualizer) -> String {
    let mut out = format!(
        "progress {}/{}{}\n",
        vis.progress(),
        vis.max_progress(),
        if vis.is_playing() { " (playing)" } else { "" }
    );
    for variant in Variant::ALL {
        out.push('\n');
        out.push_str(&lane(vis, variant));
    }
    out
}
