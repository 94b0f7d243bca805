//! The run orchestrator: owns the configuration, the three recorded searches,
//! and the progress cursor over them.

use log::debug;
use pathrace_core::{Command, Effect, Model, Msg, Point};
use pathrace_replay::{CellView, ScrubController, Step, Timeline, record_run};
use pathrace_search::{AlgorithmRun, ObstacleMask, StepResult, Variant};

use crate::config::VisualizerConfig;
use crate::configuration::{Configuration, Rejection};

type Listener = Box<dyn FnMut(&Visualizer)>;

/// Side-by-side uniform-cost, greedy and A* searches over one shared
/// configuration, with a scrubbable timeline.
///
/// Every configuration change recomputes all three searches synchronously
/// and swaps the new timelines in together, so readers never see timelines
/// from two different configurations. Invalid commands are ignored: each
/// command returns whether it changed observable state.
pub struct Visualizer {
    config: VisualizerConfig,
    configuration: Configuration,
    scrub: ScrubController,
    generation: u64,
    revision: u64,
    listeners: Vec<Listener>,
}

impl Visualizer {
    pub fn new(config: VisualizerConfig) -> Self {
        let mut vis = Self {
            configuration: Configuration::new(config.grid_size),
            scrub: ScrubController::new(config.playback_interval),
            config,
            generation: 0,
            revision: 0,
            listeners: Vec::new(),
        };
        vis.recompute_all();
        vis
    }

    /// Re-run every search from scratch over the current configuration.
    pub fn recompute_all(&mut self) {
        let c = &self.configuration;
        let timelines: Vec<(Variant, Timeline)> = Variant::ALL
            .iter()
            .map(|&v| {
                let run = AlgorithmRun::new(v, c.mask(), c.start(), c.end());
                (v, record_run(run, self.config.checkpoint_interval))
            })
            .collect();
        for (v, t) in &timelines {
            debug!(
                "{v}: {} expansions, {:?}, path length {}",
                t.expansions(),
                t.outcome(),
                t.final_path().len()
            );
        }
        self.scrub.load(timelines, self.config.progress);
        self.generation += 1;
        debug!(
            "generation {}: {}x{} grid, {} -> {}, max progress {}",
            self.generation,
            c.size(),
            c.size(),
            c.start(),
            c.end(),
            self.scrub.max_progress()
        );
    }

    // -----------------------------------------------------------------------
    // Configuration commands
    // -----------------------------------------------------------------------

    pub fn set_grid_size(&mut self, n: i32) -> bool {
        self.reconfigure(Command::SetGridSize(n), |c| c.set_grid_size(n))
    }

    pub fn set_start(&mut self, p: Point) -> bool {
        self.reconfigure(Command::SetStart(p), |c| c.set_start(p))
    }

    pub fn set_end(&mut self, p: Point) -> bool {
        self.reconfigure(Command::SetEnd(p), |c| c.set_end(p))
    }

    pub fn toggle_obstacle(&mut self, x: i32, y: i32) -> bool {
        let p = Point::new(x, y);
        self.reconfigure(Command::ToggleObstacle(p), |c| c.toggle_obstacle(p).map(drop))
    }

    pub fn clear_obstacles(&mut self) -> bool {
        self.reconfigure(Command::ClearObstacles, |c| c.clear_obstacles().map(drop))
    }

    /// Place up to `count` random obstacles, deterministic per `seed`.
    pub fn scatter_obstacles(&mut self, count: usize, seed: u64) -> bool {
        self.reconfigure(Command::ScatterObstacles { count, seed }, |c| {
            c.scatter_obstacles(count, seed).map(drop)
        })
    }

    fn reconfigure(
        &mut self,
        command: Command,
        edit: impl FnOnce(&mut Configuration) -> Result<(), Rejection>,
    ) -> bool {
        match edit(&mut self.configuration) {
            Ok(()) => {
                self.recompute_all();
                self.notify();
                true
            }
            Err(reason) => {
                debug!("`{command}` ignored: {reason}");
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Scrub commands
    // -----------------------------------------------------------------------

    pub fn step_forward(&mut self) -> bool {
        let changed = self.scrub.step_forward();
        self.notify_if(changed)
    }

    pub fn step_backward(&mut self) -> bool {
        let changed = self.scrub.step_backward();
        self.notify_if(changed)
    }

    /// Jump to `p`; ignored unless `p <= max_progress()`.
    pub fn set_progress(&mut self, p: usize) -> bool {
        let changed = self.scrub.set_progress(p);
        if !changed && p > self.scrub.max_progress() {
            debug!("`seek {p}` ignored: past {}", self.scrub.max_progress());
        }
        self.notify_if(changed)
    }

    /// Begin playback. The returned timer effect must be handed to the
    /// [`Runner`](pathrace_core::Runner) driving this model; each tick it
    /// produces advances the cursor by one.
    pub fn start_playback(&mut self) -> Option<Effect> {
        let effect = self.scrub.start_playback();
        self.notify_if(effect.is_some());
        effect
    }

    pub fn stop_playback(&mut self) -> bool {
        let changed = self.scrub.stop_playback();
        self.notify_if(changed)
    }

    /// Stop playback and rewind to the initial step.
    pub fn reset(&mut self) -> bool {
        let stopped = self.scrub.stop_playback();
        let rewound = self.scrub.rewind();
        self.notify_if(stopped || rewound)
    }

    /// Handle a playback tick, returning the effect scheduling the next one.
    pub fn tick(&mut self, token: u64) -> Option<Effect> {
        let before = (self.scrub.progress(), self.scrub.is_playing());
        let effect = self.scrub.on_tick(token);
        let after = (self.scrub.progress(), self.scrub.is_playing());
        self.notify_if(before != after);
        effect
    }

    /// Execute a [`Command`], returning any follow-up effect.
    pub fn apply(&mut self, command: Command) -> Option<Effect> {
        match command {
            Command::SetGridSize(n) => {
                self.set_grid_size(n);
            }
            Command::SetStart(p) => {
                self.set_start(p);
            }
            Command::SetEnd(p) => {
                self.set_end(p);
            }
            Command::ToggleObstacle(p) => {
                self.toggle_obstacle(p.x, p.y);
            }
            Command::ClearObstacles => {
                self.clear_obstacles();
            }
            Command::ScatterObstacles { count, seed } => {
                self.scatter_obstacles(count, seed);
            }
            Command::StepForward => {
                self.step_forward();
            }
            Command::StepBackward => {
                self.step_backward();
            }
            Command::SetProgress(p) => {
                self.set_progress(p);
            }
            Command::StartPlayback => return self.start_playback(),
            Command::StopPlayback => {
                self.stop_playback();
            }
            Command::Reset => {
                self.reset();
            }
        }
        None
    }

    // -----------------------------------------------------------------------
    // Change notification
    // -----------------------------------------------------------------------

    /// Register a callback run once after every command that changed
    /// observable state.
    pub fn on_change(&mut self, listener: impl FnMut(&Visualizer) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn notify_if(&mut self, changed: bool) -> bool {
        if changed {
            self.notify();
        }
        changed
    }

    fn notify(&mut self) {
        self.revision += 1;
        let mut listeners = std::mem::take(&mut self.listeners);
        for listener in &mut listeners {
            listener(self);
        }
        // Listeners registered from inside a callback land after the old ones.
        listeners.append(&mut self.listeners);
        self.listeners = listeners;
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn obstacles(&self) -> &ObstacleMask {
        self.configuration.mask()
    }

    pub fn grid_size(&self) -> i32 {
        self.configuration.size()
    }

    pub fn start(&self) -> Point {
        self.configuration.start()
    }

    pub fn end(&self) -> Point {
        self.configuration.end()
    }

    pub fn progress(&self) -> usize {
        self.scrub.progress()
    }

    pub fn max_progress(&self) -> usize {
        self.scrub.max_progress()
    }

    pub fn is_playing(&self) -> bool {
        self.scrub.is_playing()
    }

    /// The cell at `(x, y)` as `variant` shows it at the current progress.
    pub fn cell_at(&self, variant: Variant, x: i32, y: i32) -> Option<CellView> {
        self.scrub.cell_at(variant, Point::new(x, y))
    }

    /// The step `variant` shows at the current progress.
    pub fn step(&self, variant: Variant) -> Option<&Step> {
        self.scrub.step(variant)
    }

    /// The path `variant` shows at the current progress.
    pub fn path(&self, variant: Variant) -> &[Point] {
        self.scrub
            .step(variant)
            .map(Step::path)
            .unwrap_or_default()
    }

    /// How `variant`'s search ended.
    pub fn outcome(&self, variant: Variant) -> Option<StepResult> {
        self.scrub.timeline(variant)?.outcome()
    }

    pub fn timeline(&self, variant: Variant) -> Option<&Timeline> {
        self.scrub.timeline(variant)
    }

    /// Incremented by every recompute.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Incremented by every observable change; equals the number of change
    /// notifications sent.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new(VisualizerConfig::default())
    }
}

impl std::fmt::Debug for Visualizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Visualizer")
            .field("configuration", &self.configuration)
            .field("progress", &self.scrub.progress())
            .field("max_progress", &self.scrub.max_progress())
            .field("playing", &self.scrub.is_playing())
            .field("generation", &self.generation)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl Model for Visualizer {
    fn update(&mut self, msg: Msg) -> Option<Effect> {
        match msg {
            Msg::Init => {
                debug!("visualizer ready: {self:?}");
                None
            }
            Msg::Command(command) => self.apply(command),
            Msg::Tick { token, .. } => self.tick(token),
            Msg::Quit => Some(Effect::End),
        }
    }
}
