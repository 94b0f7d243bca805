use log::{debug, warn};
use pathrace_core::Point;

use crate::frontier::Frontier;
use crate::grid::{ObstacleMask, SearchCell, SearchGrid};
use crate::ranking::{Ranking, Variant};

/// Outcome of a single [`AlgorithmRun::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StepResult {
    /// A non-goal cell was expanded; the search continues.
    Expanded(Point),
    /// The goal was expanded; the path is final.
    GoalReached,
    /// No live frontier entry remains: there is no path.
    Exhausted,
}

impl StepResult {
    /// Whether the run is over after this result.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Expanded(_))
    }
}

/// Hard bound on the number of steps [`AlgorithmRun::run_to_completion`]
/// executes on a `size × size` grid.
#[inline]
pub fn iteration_cap(size: i32) -> usize {
    let n = size.max(0) as usize;
    2 * n * n
}

/// The live state of one search over one obstacle layout.
///
/// The run owns its own [`SearchGrid`]; nothing else mutates it. After each
/// [`step`](Self::step) the cells the step touched are available through
/// [`changed_cells`](Self::changed_cells), which is what history recording
/// builds on.
#[derive(Clone, Debug)]
pub struct AlgorithmRun<R = Variant> {
    ranking: R,
    grid: SearchGrid,
    frontier: Frontier,
    start: Point,
    goal: Point,
    path: Vec<Point>,
    outcome: Option<StepResult>,
    current: Option<Point>,
    expansions: usize,
    steps: usize,
    cap: usize,
    changed: Vec<usize>,
}

impl<R: Ranking> AlgorithmRun<R> {
    /// Build a fresh run over `mask` and seed the start cell: `g = 0`,
    /// `h = heuristic(start, goal)`, `f` per the ranking, opened and pushed.
    pub fn new(ranking: R, mask: &ObstacleMask, start: Point, goal: Point) -> Self {
        let mut grid = SearchGrid::from_mask(mask);
        let mut frontier = Frontier::default();
        let mut changed = Vec::new();

        if let Some(si) = grid.idx(start) {
            let h = ranking.heuristic(start, goal);
            let f = ranking.rank(0, h);
            let cell = grid.cell_mut(si);
            cell.g = 0;
            cell.h = h;
            cell.f = f;
            cell.open = true;
            frontier.push(si, f);
            changed.push(si);
        }

        Self {
            ranking,
            cap: iteration_cap(grid.size()),
            grid,
            frontier,
            start,
            goal,
            path: Vec::new(),
            outcome: None,
            current: None,
            expansions: 0,
            steps: 0,
            changed,
        }
    }

    /// Override the step bound used by [`run_to_completion`](Self::run_to_completion).
    pub fn set_iteration_cap(&mut self, cap: usize) {
        self.cap = cap;
    }

    /// Expand one cell.
    ///
    /// A finished run returns its terminal result again without mutating.
    pub fn step(&mut self) -> StepResult {
        self.changed.clear();
        if let Some(done) = self.outcome {
            return done;
        }
        self.steps += 1;

        let Some(ci) = self.frontier.pop_live(&self.grid) else {
            return self.exhaust();
        };

        self.expansions += 1;
        let cp = self.grid.point(ci);
        let current_g = {
            let c = self.grid.cell_mut(ci);
            c.open = false;
            c.closed = true;
            c.g
        };
        self.changed.push(ci);
        self.current = Some(cp);

        if cp == self.goal {
            self.path = self.grid.path_to(cp);
            self.outcome = Some(StepResult::GoalReached);
            debug!(
                "goal {} reached after {} expansions, path length {}",
                cp,
                self.expansions,
                self.path.len()
            );
            return StepResult::GoalReached;
        }

        let tentative = current_g.saturating_add(1);
        for np in cp.neighbors_4() {
            let Some(ni) = self.grid.idx(np) else {
                continue;
            };
            let n = self.grid.cell(ni);
            if n.obstacle || n.closed || tentative >= n.g {
                continue;
            }
            let was_open = n.open;
            let old_f = n.f;

            let h = self.ranking.heuristic(np, self.goal);
            let f = self.ranking.rank(tentative, h);
            let n = self.grid.cell_mut(ni);
            n.parent = Some(cp);
            n.g = tentative;
            n.h = h;
            n.f = f;
            n.open = true;
            if !was_open || f != old_f {
                self.frontier.push(ni, f);
            }
            self.changed.push(ni);
        }

        self.path = self.grid.path_to(cp);

        if !self.frontier.has_live(&self.grid) {
            return self.exhaust();
        }
        StepResult::Expanded(cp)
    }

    /// Step until the goal is reached or the frontier is exhausted, calling
    /// `on_step` after every step.
    ///
    /// At most [`iteration_cap`] steps are executed; hitting the bound ends
    /// the run as exhausted.
    pub fn run_to_completion(&mut self, mut on_step: impl FnMut(&Self, StepResult)) -> StepResult {
        loop {
            if let Some(done) = self.outcome {
                return done;
            }
            if self.steps >= self.cap {
                warn!(
                    "search stopped at the {}-step cap without reaching {}",
                    self.cap, self.goal
                );
                self.changed.clear();
                let r = self.exhaust();
                on_step(self, r);
                return r;
            }
            let r = self.step();
            on_step(self, r);
        }
    }

    fn exhaust(&mut self) -> StepResult {
        self.outcome = Some(StepResult::Exhausted);
        self.path = vec![self.start];
        debug!(
            "frontier exhausted after {} expansions, no path to {}",
            self.expansions, self.goal
        );
        StepResult::Exhausted
    }
}

impl<R> AlgorithmRun<R> {
    /// The annotated grid.
    pub fn grid(&self) -> &SearchGrid {
        &self.grid
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn goal(&self) -> Point {
        self.goal
    }

    /// Back-reference chain from the start to the last expanded cell, the
    /// final path once the goal is reached, or just the start once exhausted.
    pub fn path(&self) -> &[Point] {
        &self.path
    }

    /// Whether the run reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// The terminal result, once finished.
    pub fn outcome(&self) -> Option<StepResult> {
        self.outcome
    }

    /// The most recently expanded cell.
    pub fn current(&self) -> Option<Point> {
        self.current
    }

    /// Number of cells expanded so far.
    pub fn expansions(&self) -> usize {
        self.expansions
    }

    /// The cells modified by the last step (or by seeding, before the first).
    pub fn changed_cells(&self) -> impl Iterator<Item = &SearchCell> + '_ {
        self.changed.iter().map(|&i| self.grid.cell(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::manhattan;
    use crate::grid::UNREACHABLE;

    fn corner_run(v: Variant, mask: &ObstacleMask) -> AlgorithmRun {
        let n = mask.size();
        AlgorithmRun::new(v, mask, Point::new(0, 0), Point::new(n - 1, n - 1))
    }

    fn finish(run: &mut AlgorithmRun) -> StepResult {
        run.run_to_completion(|_, _| {})
    }

    #[test]
    fn seeding_opens_only_the_start() {
        let mask = ObstacleMask::new(5);
        let run = corner_run(Variant::AStar, &mask);
        let s = run.grid().at(Point::new(0, 0)).unwrap();
        assert_eq!((s.g, s.h, s.f), (0, 8, 8));
        assert!(s.open && !s.closed);
        assert_eq!(run.grid().open_count(), 1);
        assert_eq!(run.grid().closed_count(), 0);
        assert!(run.path().is_empty());
        assert_eq!(run.changed_cells().count(), 1);

        let greedy = corner_run(Variant::Greedy, &mask);
        assert_eq!(greedy.grid().at(Point::new(0, 0)).unwrap().f, 8);
        let uniform = corner_run(Variant::UniformCost, &mask);
        let s = uniform.grid().at(Point::new(0, 0)).unwrap();
        assert_eq!((s.h, s.f), (0, 0));
    }

    #[test]
    fn open_grids_reach_goal_with_manhattan_paths() {
        for n in 5..=50 {
            let mask = ObstacleMask::new(n);
            for v in Variant::ALL {
                let mut run = corner_run(v, &mask);
                assert_eq!(finish(&mut run), StepResult::GoalReached, "{v} on {n}");
                let expected = manhattan(run.start(), run.goal()) as usize + 1;
                assert_eq!(run.path().len(), expected, "{v} on {n}");
                assert_eq!(run.path().first(), Some(&run.start()));
                assert_eq!(run.path().last(), Some(&run.goal()));
            }
        }
    }

    #[test]
    fn five_by_five_expansion_counts() {
        let mask = ObstacleMask::new(5);
        let mut uniform = corner_run(Variant::UniformCost, &mask);
        let mut greedy = corner_run(Variant::Greedy, &mask);
        let mut astar = corner_run(Variant::AStar, &mask);
        finish(&mut uniform);
        finish(&mut greedy);
        finish(&mut astar);
        // The goal is the only cell at distance 8, so uniform cost closes all.
        assert_eq!(uniform.expansions(), 25);
        // Greedy walks straight along the top row and down the right edge.
        assert_eq!(greedy.expansions(), 9);
        assert!(astar.expansions() <= 25);
        assert_eq!(uniform.path().len(), 9);
        assert_eq!(astar.path().len(), 9);
    }

    fn maze() -> ObstacleMask {
        // A wall across most of column 3 and a partial wall on row 6 force a
        // detour; greedy is lured toward the goal side first.
        let mut mask = ObstacleMask::new(10);
        for y in 0..9 {
            mask.set(Point::new(3, y), true);
        }
        for x in 4..9 {
            mask.set(Point::new(x, 6), true);
        }
        mask
    }

    #[test]
    fn optimal_variants_agree_and_greedy_is_no_shorter() {
        let mask = maze();
        let mut lens = [0usize; 3];
        for v in Variant::ALL {
            let mut run = corner_run(v, &mask);
            assert_eq!(finish(&mut run), StepResult::GoalReached);
            lens[v.index()] = run.path().len();
        }
        assert_eq!(lens[Variant::UniformCost.index()], lens[Variant::AStar.index()]);
        assert!(lens[Variant::Greedy.index()] >= lens[Variant::AStar.index()]);
    }

    #[test]
    fn paths_are_connected_and_avoid_obstacles() {
        let mask = maze();
        for v in Variant::ALL {
            let mut run = corner_run(v, &mask);
            finish(&mut run);
            for w in run.path().windows(2) {
                assert_eq!(manhattan(w[0], w[1]), 1, "{v}");
            }
            assert!(run.path().iter().all(|&p| !mask.is_obstacle(p)), "{v}");
        }
    }

    #[test]
    fn costs_only_decrease_and_closed_cells_stay_closed() {
        let mask = maze();
        for v in Variant::ALL {
            let mut run = corner_run(v, &mask);
            let mut prev = run.grid().clone();
            run.run_to_completion(|r, _| {
                for (before, after) in prev.cells().iter().zip(r.grid().cells()) {
                    assert!(after.g <= before.g, "{v} g rose at {}", after.pos);
                    if before.closed {
                        assert!(after.closed && !after.open, "{v} reopened {}", after.pos);
                    }
                }
                prev = r.grid().clone();
            });
        }
    }

    #[test]
    fn expanded_path_ends_at_current_cell() {
        let mask = ObstacleMask::new(8);
        let mut run = corner_run(Variant::UniformCost, &mask);
        for _ in 0..10 {
            let StepResult::Expanded(p) = run.step() else {
                panic!("finished too early");
            };
            assert_eq!(run.current(), Some(p));
            assert_eq!(run.path().last(), Some(&p));
            assert_eq!(run.path().first(), Some(&run.start()));
        }
    }

    #[test]
    fn enclosed_goal_exhausts_with_start_only_path() {
        let mut mask = ObstacleMask::new(5);
        let goal = Point::new(4, 4);
        for p in goal.neighbors_4() {
            mask.set(p, true);
        }
        for v in Variant::ALL {
            let mut run = corner_run(v, &mask);
            assert_eq!(finish(&mut run), StepResult::Exhausted, "{v}");
            assert!(run.is_finished());
            assert_eq!(run.path(), &[Point::new(0, 0)]);
            assert_eq!(run.grid().at(goal).unwrap().g, UNREACHABLE);
            // Every reachable cell was expanded exactly once.
            assert_eq!(run.expansions(), run.grid().closed_count());
            assert_eq!(run.expansions(), 25 - 2 - 1);
        }
    }

    #[test]
    fn walled_in_interior_goal_exhausts() {
        let mut mask = ObstacleMask::new(9);
        let goal = Point::new(4, 4);
        for p in goal.neighbors_4() {
            mask.set(p, true);
        }
        for v in Variant::ALL {
            let mut run = AlgorithmRun::new(v, &mask, Point::new(0, 0), goal);
            assert_eq!(finish(&mut run), StepResult::Exhausted, "{v}");
            assert_eq!(run.path(), &[Point::new(0, 0)]);
            assert!(!run.grid().at(goal).unwrap().closed);
            assert_eq!(run.expansions(), 81 - 4 - 1, "{v}");
        }
    }

    #[test]
    fn enclosed_start_exhausts_on_first_step() {
        let mut mask = ObstacleMask::new(5);
        mask.set(Point::new(1, 0), true);
        mask.set(Point::new(0, 1), true);
        let mut run = corner_run(Variant::AStar, &mask);
        assert_eq!(run.step(), StepResult::Exhausted);
        assert_eq!(run.expansions(), 1);
        // Further steps are no-ops.
        assert_eq!(run.step(), StepResult::Exhausted);
        assert_eq!(run.expansions(), 1);
        assert_eq!(run.changed_cells().count(), 0);
    }

    #[test]
    fn finished_run_repeats_goal_reached() {
        let mask = ObstacleMask::new(5);
        let mut run = corner_run(Variant::Greedy, &mask);
        finish(&mut run);
        let closed = run.grid().closed_count();
        assert_eq!(run.step(), StepResult::GoalReached);
        assert_eq!(run.grid().closed_count(), closed);
    }

    #[test]
    fn expansion_order_is_deterministic() {
        let mask = maze();
        for v in Variant::ALL {
            let order = |mask: &ObstacleMask| {
                let mut run = corner_run(v, mask);
                let mut seen = Vec::new();
                run.run_to_completion(|r, _| seen.push(r.current()));
                seen
            };
            assert_eq!(order(&mask), order(&mask), "{v}");
        }
    }

    #[test]
    fn iteration_cap_is_treated_as_exhaustion() {
        let mask = ObstacleMask::new(10);
        let mut run = corner_run(Variant::UniformCost, &mask);
        run.set_iteration_cap(3);
        let mut calls = Vec::new();
        let r = run.run_to_completion(|_, r| calls.push(r));
        assert_eq!(r, StepResult::Exhausted);
        assert_eq!(run.expansions(), 3);
        assert_eq!(calls.len(), 4);
        assert_eq!(calls.last(), Some(&StepResult::Exhausted));
        assert_eq!(run.path(), &[Point::new(0, 0)]);
        assert_eq!(iteration_cap(10), 200);
    }

    /// A ranking that always prefers cells far from the goal.
    struct Contrary;

    impl Ranking for Contrary {
        fn heuristic(&self, from: Point, to: Point) -> i32 {
            100 - manhattan(from, to)
        }
        fn uses_accumulated_cost(&self) -> bool {
            false
        }
    }

    #[test]
    fn custom_ranking_still_terminates() {
        let mask = ObstacleMask::new(12);
        let mut run = AlgorithmRun::new(Contrary, &mask, Point::new(0, 0), Point::new(11, 11));
        let r = run.run_to_completion(|_, _| {});
        assert_eq!(r, StepResult::GoalReached);
        assert!(run.expansions() <= 144);
        assert!(run.path().len() >= 23);
    }
}
