//! Append-only search histories.
//!
//! A [`Timeline`] stores a full grid checkpoint every `checkpoint_interval`
//! steps and, for every step, only the cells that step changed plus the path
//! at that instant. Any step can be materialized as an independent [`Step`]
//! by replaying at most `checkpoint_interval - 1` deltas onto a checkpoint.

use pathrace_core::Point;
use pathrace_search::{AlgorithmRun, Ranking, SearchCell, SearchGrid, StepResult};

use crate::view::CellView;

/// Steps between two full grid checkpoints.
pub const DEFAULT_CHECKPOINT_INTERVAL: usize = 32;

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// An immutable snapshot of one run: its full annotated grid and the path
/// to the cell it had just expanded.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Step {
    index: usize,
    grid: SearchGrid,
    path: Vec<Point>,
    result: Option<StepResult>,
}

impl Step {
    /// Position in the timeline; 0 is the seeded initial state.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn grid(&self) -> &SearchGrid {
        &self.grid
    }

    pub fn path(&self) -> &[Point] {
        &self.path
    }

    /// The result of the search step that produced this snapshot, `None` for
    /// the initial state.
    pub fn result(&self) -> Option<StepResult> {
        self.result
    }

    pub fn is_on_path(&self, p: Point) -> bool {
        self.path.contains(&p)
    }

    /// The presentation view of the cell at `p`.
    pub fn cell_view(&self, p: Point) -> Option<CellView> {
        self.grid
            .at(p)
            .map(|cell| CellView::new(cell, self.is_on_path(p)))
    }

    /// Positions of the expanded cells, row-major.
    pub fn closed_cells(&self) -> impl Iterator<Item = Point> + '_ {
        self.grid.cells().iter().filter(|c| c.closed).map(|c| c.pos)
    }
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
struct Delta {
    cells: Vec<SearchCell>,
    path: Vec<Point>,
    result: Option<StepResult>,
}

/// The recorded history of one run. Index 0 is the initial state; the last
/// index is the step that reached the goal or exhausted the frontier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timeline {
    interval: usize,
    checkpoints: Vec<SearchGrid>,
    deltas: Vec<Delta>,
    outcome: Option<StepResult>,
    expansions: usize,
}

impl Timeline {
    /// Number of recorded steps.
    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Index of the last recorded step.
    pub fn last_index(&self) -> usize {
        self.len().saturating_sub(1)
    }

    /// The terminal result, if the run finished.
    pub fn outcome(&self) -> Option<StepResult> {
        self.outcome
    }

    /// Cells the run expanded by its last recorded step.
    pub fn expansions(&self) -> usize {
        self.expansions
    }

    pub fn checkpoint_interval(&self) -> usize {
        self.interval
    }

    /// Number of stored full-grid checkpoints.
    pub fn checkpoint_count(&self) -> usize {
        self.checkpoints.len()
    }

    /// The path recorded at step `i`.
    pub fn path_at(&self, i: usize) -> Option<&[Point]> {
        self.deltas.get(i).map(|d| d.path.as_slice())
    }

    /// The path at the last step: the final path, or `[start]` if exhausted.
    pub fn final_path(&self) -> &[Point] {
        self.deltas
            .last()
            .map(|d| d.path.as_slice())
            .unwrap_or_default()
    }

    /// Materialize step `i` as an independent snapshot.
    pub fn step(&self, i: usize) -> Option<Step> {
        let delta = self.deltas.get(i)?;
        let k = i / self.interval;
        let mut grid = self.checkpoints.get(k)?.clone();
        for d in &self.deltas[k * self.interval + 1..=i] {
            for &cell in &d.cells {
                grid.restore(cell);
            }
        }
        Some(Step {
            index: i,
            grid,
            path: delta.path.clone(),
            result: delta.result,
        })
    }

    /// Move `step` to the following index in place. Returns `false` at the
    /// end of the timeline.
    pub fn advance(&self, step: &mut Step) -> bool {
        let next = step.index + 1;
        let Some(delta) = self.deltas.get(next) else {
            return false;
        };
        for &cell in &delta.cells {
            step.grid.restore(cell);
        }
        step.path.clone_from(&delta.path);
        step.result = delta.result;
        step.index = next;
        true
    }
}

// ---------------------------------------------------------------------------
// Recorder
// ---------------------------------------------------------------------------

/// Builds a [`Timeline`] from a live run, one step at a time.
#[derive(Debug)]
pub struct Recorder {
    timeline: Timeline,
}

impl Recorder {
    /// Record the run's current (initial) state as step 0.
    pub fn begin<R>(run: &AlgorithmRun<R>) -> Self {
        Self::with_interval(run, DEFAULT_CHECKPOINT_INTERVAL)
    }

    /// Like [`begin`](Self::begin) with an explicit checkpoint interval.
    pub fn with_interval<R>(run: &AlgorithmRun<R>, interval: usize) -> Self {
        Self {
            timeline: Timeline {
                interval: interval.max(1),
                checkpoints: vec![run.grid().clone()],
                deltas: vec![Delta {
                    cells: run.changed_cells().copied().collect(),
                    path: run.path().to_vec(),
                    result: None,
                }],
                outcome: run.outcome(),
                expansions: run.expansions(),
            },
        }
    }

    /// Append the state produced by the step that returned `result`.
    /// Returns the new step's index.
    pub fn record<R>(&mut self, run: &AlgorithmRun<R>, result: StepResult) -> usize {
        let t = &mut self.timeline;
        let index = t.deltas.len();
        t.deltas.push(Delta {
            cells: run.changed_cells().copied().collect(),
            path: run.path().to_vec(),
            result: Some(result),
        });
        if index % t.interval == 0 {
            t.checkpoints.push(run.grid().clone());
        }
        if result.is_terminal() {
            t.outcome = Some(result);
        }
        t.expansions = run.expansions();
        index
    }

    /// Steps recorded so far.
    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    pub fn finish(self) -> Timeline {
        self.timeline
    }
}

/// Drive `run` to completion, recording every step.
pub fn record_run<R: Ranking>(mut run: AlgorithmRun<R>, interval: usize) -> Timeline {
    let mut recorder = Recorder::with_interval(&run, interval);
    run.run_to_completion(|r, result| {
        recorder.record(r, result);
    });
    recorder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathrace_search::{ObstacleMask, Variant};

    fn maze() -> ObstacleMask {
        let mut mask = ObstacleMask::new(12);
        for y in 0..10 {
            mask.set(Point::new(5, y), true);
        }
        for x in 6..11 {
            mask.set(Point::new(x, 4), true);
        }
        mask
    }

    fn run(v: Variant, mask: &ObstacleMask) -> AlgorithmRun {
        let n = mask.size();
        AlgorithmRun::new(v, mask, Point::new(0, 0), Point::new(n - 1, n - 1))
    }

    /// Record with an interval and, alongside, a full clone per step.
    fn record_with_snapshots(v: Variant, interval: usize) -> (Timeline, Vec<(SearchGrid, Vec<Point>)>) {
        let mask = maze();
        let mut live = run(v, &mask);
        let mut rec = Recorder::with_interval(&live, interval);
        let mut snaps = vec![(live.grid().clone(), live.path().to_vec())];
        live.run_to_completion(|r, result| {
            rec.record(r, result);
            snaps.push((r.grid().clone(), r.path().to_vec()));
        });
        (rec.finish(), snaps)
    }

    #[test]
    fn length_is_expansions_plus_one() {
        for v in Variant::ALL {
            let mask = maze();
            let mut live = run(v, &mask);
            let mut rec = Recorder::begin(&live);
            assert_eq!(rec.len(), 1);
            let mut last = rec.len();
            live.run_to_completion(|r, result| {
                rec.record(r, result);
                assert!(rec.len() > last);
                last = rec.len();
            });
            let t = rec.finish();
            assert_eq!(t.len(), live.expansions() + 1, "{v}");
            assert_eq!(t.expansions(), live.expansions());
            assert_eq!(t.outcome(), Some(StepResult::GoalReached));
            assert_eq!(t.final_path(), live.path());
        }
    }

    #[test]
    fn materialized_steps_match_live_snapshots() {
        for interval in [1, 4, DEFAULT_CHECKPOINT_INTERVAL] {
            for v in Variant::ALL {
                let (t, snaps) = record_with_snapshots(v, interval);
                assert_eq!(t.len(), snaps.len());
                for (i, (grid, path)) in snaps.iter().enumerate() {
                    let step = t.step(i).unwrap();
                    assert_eq!(step.index(), i);
                    assert_eq!(step.grid(), grid, "{v} step {i} interval {interval}");
                    assert_eq!(step.path(), path.as_slice());
                }
                assert!(t.step(t.len()).is_none());
            }
        }
    }

    #[test]
    fn advance_matches_random_access() {
        let (t, _) = record_with_snapshots(Variant::AStar, 5);
        let mut cursor = t.step(0).unwrap();
        while t.advance(&mut cursor) {
            assert_eq!(Some(&cursor), t.step(cursor.index()).as_ref());
        }
        assert_eq!(cursor.index(), t.last_index());
    }

    #[test]
    fn initial_step_has_only_the_start_open() {
        let t = record_run(run(Variant::UniformCost, &maze()), 8);
        let s0 = t.step(0).unwrap();
        assert_eq!(s0.result(), None);
        assert_eq!(s0.grid().open_count(), 1);
        assert_eq!(s0.grid().closed_count(), 0);
        assert!(s0.grid().at(Point::new(0, 0)).unwrap().open);
        assert!(s0.path().is_empty());
        assert_eq!(t.checkpoint_count(), t.last_index() / 8 + 1);
    }

    #[test]
    fn recorded_steps_are_independent_of_later_mutation() {
        let mask = maze();
        let mut live = run(Variant::Greedy, &mask);
        let mut rec = Recorder::with_interval(&live, 1);
        let r = live.step();
        rec.record(&live, r);
        let early = rec.timeline.step(1).unwrap();
        live.run_to_completion(|_, _| {});
        assert_eq!(rec.timeline.step(1).unwrap(), early);
        assert_eq!(early.grid().closed_count(), 1);
        assert!(early.grid().closed_count() < live.grid().closed_count());
    }

    #[test]
    fn exhausted_timeline_ends_with_start_only_path() {
        let mut mask = ObstacleMask::new(6);
        let goal = Point::new(5, 5);
        for p in goal.neighbors_4() {
            mask.set(p, true);
        }
        let t = record_run(run(Variant::AStar, &mask), 4);
        assert_eq!(t.outcome(), Some(StepResult::Exhausted));
        assert_eq!(t.final_path(), &[Point::new(0, 0)]);
        let last = t.step(t.last_index()).unwrap();
        assert_eq!(last.result(), Some(StepResult::Exhausted));
        for cell in last.grid().cells() {
            let view = last.cell_view(cell.pos).unwrap();
            assert_eq!(view.is_on_path, cell.pos == Point::new(0, 0));
        }
    }

    #[test]
    fn recording_twice_is_identical() {
        for v in Variant::ALL {
            let a = record_run(run(v, &maze()), 16);
            let b = record_run(run(v, &maze()), 16);
            assert_eq!(a, b);
        }
    }
}
