use std::fmt;

use pathrace_core::Point;

use crate::distance::{manhattan, zero};

/// How a search orders its frontier.
///
/// A cell's rank key `f` is derived from its accumulated cost `g` and the
/// heuristic estimate `h`; the frontier always expands the smallest `f`.
pub trait Ranking {
    /// Heuristic estimate of the remaining cost from `from` to `to`.
    fn heuristic(&self, from: Point, to: Point) -> i32;

    /// Whether the accumulated cost `g` contributes to the rank key.
    fn uses_accumulated_cost(&self) -> bool;

    /// The rank key for a cell with cost `g` and estimate `h`.
    #[inline]
    fn rank(&self, g: i32, h: i32) -> i32 {
        if self.uses_accumulated_cost() {
            g.saturating_add(h)
        } else {
            h
        }
    }
}

/// The three compared search algorithms.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Variant {
    /// Uniform-cost search (Dijkstra): `f = g`.
    UniformCost,
    /// Greedy best-first search: `f = h`.
    Greedy,
    /// A*: `f = g + h`.
    AStar,
}

impl Variant {
    /// Every variant, in display order.
    pub const ALL: [Variant; 3] = [Self::UniformCost, Self::Greedy, Self::AStar];

    /// Position of the variant in [`Variant::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::UniformCost => 0,
            Self::Greedy => 1,
            Self::AStar => 2,
        }
    }

    /// Human-readable name.
    pub const fn label(self) -> &'static str {
        match self {
            Self::UniformCost => "Dijkstra",
            Self::Greedy => "Greedy",
            Self::AStar => "A*",
        }
    }
}

impl Ranking for Variant {
    #[inline]
    fn heuristic(&self, from: Point, to: Point) -> i32 {
        match self {
            Self::UniformCost => zero(from, to),
            Self::Greedy | Self::AStar => manhattan(from, to),
        }
    }

    #[inline]
    fn uses_accumulated_cost(&self) -> bool {
        !matches!(self, Self::Greedy)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
