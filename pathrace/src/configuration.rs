//! The editable search configuration: grid size, endpoints, obstacles.

use std::error::Error;
use std::fmt;

use pathrace_core::Point;
use pathrace_search::{MAX_GRID_SIZE, MIN_GRID_SIZE, ObstacleMask};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Why a configuration edit was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// The point lies outside the grid.
    OutOfBounds(Point),
    /// An endpoint cannot be placed on an obstacle.
    OnObstacle(Point),
    /// The start and end cells cannot become obstacles.
    OnEndpoint(Point),
    /// Start and end must differ.
    SameAsOther(Point),
    /// The requested side length is outside `MIN_GRID_SIZE..=MAX_GRID_SIZE`.
    SizeOutOfRange(i32),
    /// The edit would not change anything.
    Unchanged,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds(p) => write!(f, "{p} is outside the grid"),
            Self::OnObstacle(p) => write!(f, "{p} is an obstacle"),
            Self::OnEndpoint(p) => write!(f, "{p} is the start or end cell"),
            Self::SameAsOther(p) => write!(f, "{p} is already the other endpoint"),
            Self::SizeOutOfRange(n) => write!(
                f,
                "grid size {n} is outside {MIN_GRID_SIZE}..={MAX_GRID_SIZE}"
            ),
            Self::Unchanged => f.write_str("nothing to change"),
        }
    }
}

impl Error for Rejection {}

/// Grid size, start, end and obstacle layout, always mutually consistent:
/// both endpoints are in bounds, distinct, and never obstacles.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawConfiguration"))]
pub struct Configuration {
    mask: ObstacleMask,
    start: Point,
    end: Point,
}

impl Configuration {
    /// An obstacle-free `size × size` grid from the top-left to the
    /// bottom-right corner. `size` is clamped into the supported range.
    pub fn new(size: i32) -> Self {
        let size = size.clamp(MIN_GRID_SIZE, MAX_GRID_SIZE);
        Self {
            mask: ObstacleMask::new(size),
            start: Point::new(0, 0),
            end: Point::new(size - 1, size - 1),
        }
    }

    pub fn size(&self) -> i32 {
        self.mask.size()
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn mask(&self) -> &ObstacleMask {
        &self.mask
    }

    /// Resize to `n × n`. The mask is emptied and the endpoints move back to
    /// the corners.
    pub fn set_grid_size(&mut self, n: i32) -> Result<(), Rejection> {
        if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&n) {
            return Err(Rejection::SizeOutOfRange(n));
        }
        if n == self.size() {
            return Err(Rejection::Unchanged);
        }
        *self = Self::new(n);
        Ok(())
    }

    pub fn set_start(&mut self, p: Point) -> Result<(), Rejection> {
        self.check_endpoint(p, self.start, self.end)?;
        self.start = p;
        Ok(())
    }

    pub fn set_end(&mut self, p: Point) -> Result<(), Rejection> {
        self.check_endpoint(p, self.end, self.start)?;
        self.end = p;
        Ok(())
    }

    fn check_endpoint(&self, p: Point, current: Point, other: Point) -> Result<(), Rejection> {
        if !self.mask.contains(p) {
            Err(Rejection::OutOfBounds(p))
        } else if p == current {
            Err(Rejection::Unchanged)
        } else if p == other {
            Err(Rejection::SameAsOther(p))
        } else if self.mask.is_obstacle(p) {
            Err(Rejection::OnObstacle(p))
        } else {
            Ok(())
        }
    }

    /// Flip the obstacle bit of `p`, returning the new value.
    pub fn toggle_obstacle(&mut self, p: Point) -> Result<bool, Rejection> {
        if p == self.start || p == self.end {
            return Err(Rejection::OnEndpoint(p));
        }
        self.mask.toggle(p).ok_or(Rejection::OutOfBounds(p))
    }

    /// Remove every obstacle, returning how many were removed.
    pub fn clear_obstacles(&mut self) -> Result<usize, Rejection> {
        match self.mask.clear() {
            0 => Err(Rejection::Unchanged),
            n => Ok(n),
        }
    }

    /// Turn up to `count` free cells into obstacles, never the endpoints.
    /// The choice depends only on the current layout and `seed`. Returns how
    /// many obstacles were placed.
    pub fn scatter_obstacles(&mut self, count: usize, seed: u64) -> Result<usize, Rejection> {
        let mut free: Vec<Point> = self
            .mask
            .range()
            .iter()
            .filter(|&p| p != self.start && p != self.end && !self.mask.is_obstacle(p))
            .collect();
        let k = count.min(free.len());
        if k == 0 {
            return Err(Rejection::Unchanged);
        }
        let mut rng = StdRng::seed_from_u64(seed);
        for i in 0..k {
            let j = rng.random_range(i..free.len());
            free.swap(i, j);
        }
        for &p in &free[..k] {
            self.mask.set(p, true);
        }
        Ok(k)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new(20)
    }
}

/// Wire form of [`Configuration`], validated on the way in.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawConfiguration {
    mask: ObstacleMask,
    start: Point,
    end: Point,
}

#[cfg(feature = "serde")]
impl TryFrom<RawConfiguration> for Configuration {
    type Error = Rejection;

    fn try_from(raw: RawConfiguration) -> Result<Self, Rejection> {
        let size = raw.mask.size();
        if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&size) {
            return Err(Rejection::SizeOutOfRange(size));
        }
        for p in [raw.start, raw.end] {
            if !raw.mask.contains(p) {
                return Err(Rejection::OutOfBounds(p));
            }
            if raw.mask.is_obstacle(p) {
                return Err(Rejection::OnObstacle(p));
            }
        }
        if raw.start == raw.end {
            return Err(Rejection::SameAsOther(raw.end));
        }
        Ok(Self {
            mask: raw.mask,
            start: raw.start,
            end: raw.end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_size_and_places_corners() {
        let c = Configuration::new(3);
        assert_eq!(c.size(), MIN_GRID_SIZE);
        assert_eq!(c.start(), Point::new(0, 0));
        assert_eq!(c.end(), Point::new(4, 4));
        assert_eq!(Configuration::new(99).size(), MAX_GRID_SIZE);
        assert_eq!(Configuration::default().end(), Point::new(19, 19));
    }

    #[test]
    fn resize_resets_mask_and_endpoints() {
        let mut c = Configuration::new(10);
        c.set_start(Point::new(3, 3)).unwrap();
        c.toggle_obstacle(Point::new(5, 5)).unwrap();
        assert_eq!(c.set_grid_size(10), Err(Rejection::Unchanged));
        assert_eq!(c.set_grid_size(4), Err(Rejection::SizeOutOfRange(4)));
        assert_eq!(c.set_grid_size(51), Err(Rejection::SizeOutOfRange(51)));
        c.set_grid_size(7).unwrap();
        assert_eq!(c.mask().count(), 0);
        assert_eq!(c.start(), Point::new(0, 0));
        assert_eq!(c.end(), Point::new(6, 6));
    }

    #[test]
    fn endpoint_moves_are_validated() {
        let mut c = Configuration::new(6);
        c.toggle_obstacle(Point::new(2, 2)).unwrap();
        assert_eq!(
            c.set_start(Point::new(6, 0)),
            Err(Rejection::OutOfBounds(Point::new(6, 0)))
        );
        assert_eq!(
            c.set_start(Point::new(2, 2)),
            Err(Rejection::OnObstacle(Point::new(2, 2)))
        );
        assert_eq!(
            c.set_start(Point::new(5, 5)),
            Err(Rejection::SameAsOther(Point::new(5, 5)))
        );
        assert_eq!(c.set_end(Point::new(5, 5)), Err(Rejection::Unchanged));
        c.set_end(Point::new(1, 4)).unwrap();
        assert_eq!(c.end(), Point::new(1, 4));
    }

    #[test]
    fn endpoints_cannot_become_obstacles() {
        let mut c = Configuration::new(5);
        let before = c.clone();
        assert_eq!(
            c.toggle_obstacle(Point::new(0, 0)),
            Err(Rejection::OnEndpoint(Point::new(0, 0)))
        );
        assert_eq!(
            c.toggle_obstacle(Point::new(4, 4)),
            Err(Rejection::OnEndpoint(Point::new(4, 4)))
        );
        assert_eq!(
            c.toggle_obstacle(Point::new(-1, 2)),
            Err(Rejection::OutOfBounds(Point::new(-1, 2)))
        );
        assert_eq!(c, before);
        assert_eq!(c.toggle_obstacle(Point::new(1, 1)), Ok(true));
        assert_eq!(c.toggle_obstacle(Point::new(1, 1)), Ok(false));
    }

    #[test]
    fn clear_reports_removed_count() {
        let mut c = Configuration::new(5);
        assert_eq!(c.clear_obstacles(), Err(Rejection::Unchanged));
        c.toggle_obstacle(Point::new(1, 1)).unwrap();
        c.toggle_obstacle(Point::new(2, 1)).unwrap();
        assert_eq!(c.clear_obstacles(), Ok(2));
    }

    #[test]
    fn scatter_is_deterministic_and_spares_endpoints() {
        let mut a = Configuration::new(10);
        let mut b = Configuration::new(10);
        assert_eq!(a.scatter_obstacles(30, 7), Ok(30));
        assert_eq!(b.scatter_obstacles(30, 7), Ok(30));
        assert_eq!(a, b);
        assert_eq!(a.mask().count(), 30);
        assert!(!a.mask().is_obstacle(a.start()));
        assert!(!a.mask().is_obstacle(a.end()));

        let mut c = Configuration::new(10);
        c.scatter_obstacles(30, 8).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn scatter_saturates_at_free_cells() {
        let mut c = Configuration::new(5);
        assert_eq!(c.scatter_obstacles(100, 1), Ok(23));
        assert_eq!(c.scatter_obstacles(1, 1), Err(Rejection::Unchanged));
        assert_eq!(c.scatter_obstacles(0, 1), Err(Rejection::Unchanged));
    }

    #[test]
    fn rejection_messages() {
        assert_eq!(
            Rejection::SizeOutOfRange(3).to_string(),
            "grid size 3 is outside 5..=50"
        );
        assert_eq!(
            Rejection::OnEndpoint(Point::new(0, 0)).to_string(),
            "(0, 0) is the start or end cell"
        );
    }
}
