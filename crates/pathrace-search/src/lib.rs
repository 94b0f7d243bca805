//! Step-wise frontier search on square obstacle grids.
//!
//! One search loop ([`AlgorithmRun`]) is parameterized by a [`Ranking`]
//! strategy. The three built-in [`Variant`]s differ only in how a cell's rank
//! key `f` is formed from its accumulated cost `g` and heuristic `h`:
//!
//! | Variant | Rank key |
//! |---|---|
//! | [`Variant::UniformCost`] | `f = g` |
//! | [`Variant::Greedy`] | `f = h` |
//! | [`Variant::AStar`] | `f = g + h` |
//!
//! Runs expand one cell per [`AlgorithmRun::step`] so callers can observe and
//! record every intermediate state.

mod distance;
mod frontier;
mod grid;
mod ranking;
mod run;

pub use distance::{manhattan, zero};
pub use grid::{MAX_GRID_SIZE, MIN_GRID_SIZE, ObstacleMask, SearchCell, SearchGrid, UNREACHABLE};
pub use ranking::{Ranking, Variant};
pub use run::{AlgorithmRun, StepResult, iteration_cap};
