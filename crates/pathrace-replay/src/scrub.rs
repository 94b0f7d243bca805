//! One progress cursor over several timelines, with timed playback.

use std::time::Duration;

use log::trace;
use pathrace_core::{Effect, Msg, Point, cmd};
use pathrace_search::Variant;

use crate::timeline::{Step, Timeline};
use crate::view::CellView;

/// What happens to the progress cursor when the timelines are replaced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProgressPolicy {
    /// Rewind to the initial step.
    #[default]
    Reset,
    /// Keep the old position, capped at the new maximum.
    Clamp,
}

#[derive(Clone, Debug)]
struct Lane {
    variant: Variant,
    timeline: Timeline,
    view: Step,
}

impl Lane {
    /// Bring the cached step to `min(progress, last)`. Moving forward by one
    /// applies a single delta; anything else rebuilds from a checkpoint.
    fn sync(&mut self, progress: usize) {
        let target = progress.min(self.timeline.last_index());
        let at = self.view.index();
        if target == at {
            return;
        }
        if target == at + 1 && self.timeline.advance(&mut self.view) {
            return;
        }
        if let Some(step) = self.timeline.step(target) {
            self.view = step;
        }
    }
}

/// Maps a single progress cursor onto one timeline per search variant.
///
/// Each variant shows step `min(progress, len - 1)`, so a run that finished
/// early holds at its final state while the others continue.
#[derive(Clone, Debug)]
pub struct ScrubController {
    lanes: Vec<Lane>,
    progress: usize,
    max_progress: usize,
    playing: bool,
    token: u64,
    interval: Duration,
}

impl ScrubController {
    /// An empty controller that plays back one step per `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            lanes: Vec::new(),
            progress: 0,
            max_progress: 0,
            playing: false,
            token: 0,
            interval,
        }
    }

    /// Replace every timeline at once. Playback stops and the cursor moves
    /// according to `policy`.
    pub fn load(&mut self, timelines: Vec<(Variant, Timeline)>, policy: ProgressPolicy) {
        self.stop_playback();
        self.max_progress = timelines
            .iter()
            .map(|(_, t)| t.last_index())
            .max()
            .unwrap_or(0);
        self.progress = match policy {
            ProgressPolicy::Reset => 0,
            ProgressPolicy::Clamp => self.progress.min(self.max_progress),
        };
        let progress = self.progress;
        self.lanes = timelines
            .into_iter()
            .filter_map(|(variant, timeline)| {
                let view = timeline.step(progress.min(timeline.last_index()))?;
                Some(Lane {
                    variant,
                    timeline,
                    view,
                })
            })
            .collect();
    }

    pub fn progress(&self) -> usize {
        self.progress
    }

    /// The largest valid cursor position: the longest timeline's last index.
    pub fn max_progress(&self) -> usize {
        self.max_progress
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Move the cursor to `p`. Returns `false` if `p` is past
    /// [`max_progress`](Self::max_progress) or already current.
    pub fn set_progress(&mut self, p: usize) -> bool {
        if p > self.max_progress || p == self.progress {
            return false;
        }
        self.progress = p;
        self.sync_views();
        true
    }

    pub fn step_forward(&mut self) -> bool {
        self.set_progress(self.progress.saturating_add(1).min(self.max_progress))
    }

    pub fn step_backward(&mut self) -> bool {
        self.set_progress(self.progress.saturating_sub(1))
    }

    pub fn rewind(&mut self) -> bool {
        self.set_progress(0)
    }

    /// Begin playback, returning the first timer effect.
    ///
    /// Playback from the last position starts over from 0. Returns `None` if
    /// already playing or there is nothing to play.
    pub fn start_playback(&mut self) -> Option<Effect> {
        if self.playing || self.max_progress == 0 {
            return None;
        }
        if self.progress >= self.max_progress {
            self.rewind();
        }
        self.playing = true;
        self.token = self.token.wrapping_add(1);
        trace!("playback started at {} (token {})", self.progress, self.token);
        Some(self.tick_effect())
    }

    /// Cancel playback. Ticks already scheduled become stale.
    pub fn stop_playback(&mut self) -> bool {
        if !self.playing {
            return false;
        }
        self.playing = false;
        self.token = self.token.wrapping_add(1);
        trace!("playback stopped at {}", self.progress);
        true
    }

    /// Handle a playback tick: advance by one and schedule the next tick, or
    /// stop at the end. Ticks from a cancelled session are ignored.
    pub fn on_tick(&mut self, token: u64) -> Option<Effect> {
        if !self.playing || token != self.token {
            trace!("stale tick {token} ignored");
            return None;
        }
        self.step_forward();
        trace!("tick {} -> {}/{}", token, self.progress, self.max_progress);
        if self.progress >= self.max_progress {
            self.stop_playback();
            return None;
        }
        Some(self.tick_effect())
    }

    fn tick_effect(&self) -> Effect {
        let interval = self.interval;
        let token = self.token;
        cmd(move || {
            if !interval.is_zero() {
                std::thread::sleep(interval);
            }
            Some(Msg::tick(token))
        })
    }

    fn sync_views(&mut self) {
        for lane in &mut self.lanes {
            lane.sync(self.progress);
        }
    }

    fn lane(&self, variant: Variant) -> Option<&Lane> {
        self.lanes.iter().find(|l| l.variant == variant)
    }

    /// The loaded variants, in load order.
    pub fn variants(&self) -> impl Iterator<Item = Variant> + '_ {
        self.lanes.iter().map(|l| l.variant)
    }

    pub fn timeline(&self, variant: Variant) -> Option<&Timeline> {
        self.lane(variant).map(|l| &l.timeline)
    }

    /// The step `variant` currently shows.
    pub fn step(&self, variant: Variant) -> Option<&Step> {
        self.lane(variant).map(|l| &l.view)
    }

    /// The index `variant` currently shows, `min(progress, len - 1)`.
    pub fn position(&self, variant: Variant) -> Option<usize> {
        self.step(variant).map(Step::index)
    }

    pub fn cell_at(&self, variant: Variant, p: Point) -> Option<CellView> {
        self.step(variant)?.cell_view(p)
    }
}
