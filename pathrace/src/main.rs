//! Terminal front end: reads commands from stdin and prints every search
//! after each change.
//!
//! Run: `cargo run -- --grid-size 12 --scatter 30`, then type commands such
//! as `wall 3 4`, `seek 10`, `play` or `quit`.

use std::io::BufRead;
use std::sync::mpsc::Sender;
use std::time::Duration;

use clap::Parser;
use log::info;
use pathrace::{Input, ProgressPolicy, Visualizer, VisualizerConfig, render};
use pathrace_core::{Context, Effect, Model, Msg, Runner};
use pathrace_search::{MAX_GRID_SIZE, MIN_GRID_SIZE};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(long, default_value_t = 20)]
    grid_size: i32,

    /// Random obstacles to place before the first search.
    #[arg(long, default_value_t = 0)]
    scatter: usize,

    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Delay between playback steps.
    #[arg(long, default_value_t = 60)]
    delay_ms: u64,

    #[arg(long, default_value_t = 32)]
    checkpoint_interval: usize,

    /// Keep the progress cursor across recomputes instead of rewinding.
    #[arg(long, default_value_t = false)]
    keep_progress: bool,
}

impl Cli {
    fn config(&self) -> VisualizerConfig {
        VisualizerConfig {
            grid_size: self.grid_size,
            progress: if self.keep_progress {
                ProgressPolicy::Clamp
            } else {
                ProgressPolicy::Reset
            },
            playback_interval: Duration::from_millis(self.delay_ms),
            checkpoint_interval: self.checkpoint_interval,
        }
    }
}

/// The visualizer plus the stdin subscription started on `Init`.
struct Session {
    vis: Visualizer,
}

impl Model for Session {
    fn update(&mut self, msg: Msg) -> Option<Effect> {
        let init = matches!(msg, Msg::Init);
        let effect = self.vis.update(msg);
        if init {
            let input = Effect::Sub(Box::new(read_commands));
            return Some(match effect {
                Some(e) => Effect::Batch(vec![e, input]),
                None => input,
            });
        }
        effect
    }
}

fn read_commands(ctx: Context, tx: Sender<Msg>) {
    for line in std::io::stdin().lock().lines() {
        if ctx.is_done() {
            return;
        }
        let Ok(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Input>() {
            Ok(input) => {
                if tx.send(input.into()).is_err() || input == Input::Quit {
                    return;
                }
            }
            Err(e) => eprintln!("{e}"),
        }
    }
    let _ = tx.send(Msg::Quit);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&cli.grid_size) {
        return Err(format!(
            "--grid-size must be within {MIN_GRID_SIZE}..={MAX_GRID_SIZE}, got {}",
            cli.grid_size
        )
        .into());
    }

    let mut vis = Visualizer::new(cli.config());
    if cli.scatter > 0 {
        vis.scatter_obstacles(cli.scatter, cli.seed);
    }
    info!(
        "{0}x{0} grid, {1} obstacles, max progress {2}",
        vis.grid_size(),
        vis.obstacles().count(),
        vis.max_progress()
    );
    print!("{}", render::summary(&vis));

    let mut shown = vis.revision();
    let mut runner = Runner::new(Session { vis });
    runner.run(|session| {
        if session.vis.revision() != shown {
            shown = session.vis.revision();
            print!("{}", render::summary(&session.vis));
        }
    });
    Ok(())
}
