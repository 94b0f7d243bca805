//! The shared obstacle mask and the per-run annotated search grid.

use pathrace_core::{Point, Range};

/// Smallest supported grid side length.
pub const MIN_GRID_SIZE: i32 = 5;
/// Largest supported grid side length.
pub const MAX_GRID_SIZE: i32 = 50;

/// Sentinel for "not yet reached" in the `g`, `h` and `f` fields.
pub const UNREACHABLE: i32 = i32::MAX;

// ---------------------------------------------------------------------------
// ObstacleMask
// ---------------------------------------------------------------------------

/// The authoritative obstacle layout of a `size × size` grid.
///
/// Search grids are always rebuilt from a mask; obstacle edits happen here
/// and nowhere else.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawMask"))]
pub struct ObstacleMask {
    size: i32,
    bits: Vec<bool>,
}

impl ObstacleMask {
    /// An obstacle-free mask.
    pub fn new(size: i32) -> Self {
        let size = size.max(0);
        Self {
            size,
            bits: vec![false; (size * size) as usize],
        }
    }

    /// Side length.
    #[inline]
    pub fn size(&self) -> i32 {
        self.size
    }

    /// The covered rectangle.
    #[inline]
    pub fn range(&self) -> Range {
        Range::square(self.size)
    }

    /// Whether `p` lies inside the grid.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.range().contains(p)
    }

    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        self.contains(p).then(|| (p.y * self.size + p.x) as usize)
    }

    /// Whether `p` is an obstacle. Out-of-bounds points are not obstacles.
    #[inline]
    pub fn is_obstacle(&self, p: Point) -> bool {
        self.idx(p).is_some_and(|i| self.bits[i])
    }

    /// Set the obstacle bit of `p`. Returns `true` if the mask changed.
    pub fn set(&mut self, p: Point, obstacle: bool) -> bool {
        match self.idx(p) {
            Some(i) if self.bits[i] != obstacle => {
                self.bits[i] = obstacle;
                true
            }
            _ => false,
        }
    }

    /// Flip the obstacle bit of `p`, returning the new value, or `None` if
    /// `p` is out of bounds.
    pub fn toggle(&mut self, p: Point) -> Option<bool> {
        let i = self.idx(p)?;
        self.bits[i] = !self.bits[i];
        Some(self.bits[i])
    }

    /// Remove every obstacle, returning how many were removed.
    pub fn clear(&mut self) -> usize {
        let n = self.count();
        self.bits.fill(false);
        n
    }

    /// Number of obstacle cells.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Row-major iterator over obstacle positions.
    pub fn iter_obstacles(&self) -> impl Iterator<Item = Point> + '_ {
        self.range().iter().filter(|&p| self.is_obstacle(p))
    }
}

// ---------------------------------------------------------------------------
// SearchCell
// ---------------------------------------------------------------------------

/// One grid position with its search annotations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchCell {
    pub pos: Point,
    pub obstacle: bool,
    /// Cost from the start along the best known path.
    pub g: i32,
    /// Heuristic estimate to the goal.
    pub h: i32,
    /// Rank key.
    pub f: i32,
    /// In the frontier.
    pub open: bool,
    /// Already expanded.
    pub closed: bool,
    /// Predecessor on the best known path, resolved against the same grid.
    pub parent: Option<Point>,
}

impl SearchCell {
    /// A fresh, undiscovered cell.
    pub const fn new(pos: Point, obstacle: bool) -> Self {
        Self {
            pos,
            obstacle,
            g: UNREACHABLE,
            h: UNREACHABLE,
            f: UNREACHABLE,
            open: false,
            closed: false,
            parent: None,
        }
    }
}

// ---------------------------------------------------------------------------
// SearchGrid
// ---------------------------------------------------------------------------

/// A `size × size` grid of [`SearchCell`]s stored row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawGrid"))]
pub struct SearchGrid {
    size: i32,
    cells: Vec<SearchCell>,
}

impl SearchGrid {
    /// Build an unsearched grid whose obstacle flags are copied from `mask`.
    pub fn from_mask(mask: &ObstacleMask) -> Self {
        let cells = mask
            .range()
            .iter()
            .map(|p| SearchCell::new(p, mask.is_obstacle(p)))
            .collect();
        Self {
            size: mask.size(),
            cells,
        }
    }

    /// Side length.
    #[inline]
    pub fn size(&self) -> i32 {
        self.size
    }

    /// The covered rectangle.
    #[inline]
    pub fn range(&self) -> Range {
        Range::square(self.size)
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Convert a `Point` to a flat index. Returns `None` if out of range.
    #[inline]
    pub fn idx(&self, p: Point) -> Option<usize> {
        self.range()
            .contains(p)
            .then(|| (p.y * self.size + p.x) as usize)
    }

    /// Convert a flat index back to a `Point`.
    #[inline]
    pub fn point(&self, idx: usize) -> Point {
        let x = (idx % self.size as usize) as i32;
        let y = (idx / self.size as usize) as i32;
        Point::new(x, y)
    }

    /// The cell at `p`, or `None` if out of bounds.
    #[inline]
    pub fn at(&self, p: Point) -> Option<&SearchCell> {
        self.idx(p).map(|i| &self.cells[i])
    }

    #[inline]
    pub(crate) fn at_mut(&mut self, p: Point) -> Option<&mut SearchCell> {
        self.idx(p).map(move |i| &mut self.cells[i])
    }

    /// The cell at a flat index.
    #[inline]
    pub fn cell(&self, idx: usize) -> &SearchCell {
        &self.cells[idx]
    }

    #[inline]
    pub(crate) fn cell_mut(&mut self, idx: usize) -> &mut SearchCell {
        &mut self.cells[idx]
    }

    /// All cells, row-major.
    #[inline]
    pub fn cells(&self) -> &[SearchCell] {
        &self.cells
    }

    /// Overwrite the cell at `cell.pos`. Returns `false` if out of bounds.
    pub fn restore(&mut self, cell: SearchCell) -> bool {
        match self.idx(cell.pos) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    /// Number of expanded cells.
    pub fn closed_count(&self) -> usize {
        self.cells.iter().filter(|c| c.closed).count()
    }

    /// Number of cells currently in the frontier.
    pub fn open_count(&self) -> usize {
        self.cells.iter().filter(|c| c.open).count()
    }

    /// Walk the back-references from `p` to the root of its chain and return
    /// the chain root-first (`p` last).
    ///
    /// The walk is bounded by the cell count, so a malformed chain ends
    /// instead of looping. Out-of-bounds `p` yields an empty path.
    pub fn path_to(&self, p: Point) -> Vec<Point> {
        let mut path = Vec::new();
        let mut cur = Some(p);
        while let Some(pos) = cur {
            let Some(cell) = self.at(pos) else {
                break;
            };
            path.push(pos);
            if path.len() > self.cells.len() {
                break;
            }
            cur = cell.parent;
        }
        path.reverse();
        path
    }
}

// ---------------------------------------------------------------------------
// Validated deserialization
// ---------------------------------------------------------------------------

/// Wire form of [`ObstacleMask`]; checked before it becomes one.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawMask {
    size: i32,
    bits: Vec<bool>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawMask> for ObstacleMask {
    type Error = String;

    fn try_from(raw: RawMask) -> Result<Self, String> {
        let expected = (raw.size.max(0) as usize).pow(2);
        if raw.size < 0 || raw.bits.len() != expected {
            return Err(format!(
                "obstacle mask of size {} needs {} cells, got {}",
                raw.size,
                expected,
                raw.bits.len()
            ));
        }
        Ok(Self {
            size: raw.size,
            bits: raw.bits,
        })
    }
}

/// Wire form of [`SearchGrid`]; checked before it becomes one.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawGrid {
    size: i32,
    cells: Vec<SearchCell>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawGrid> for SearchGrid {
    type Error = String;

    fn try_from(raw: RawGrid) -> Result<Self, String> {
        let expected = (raw.size.max(0) as usize).pow(2);
        if raw.size < 0 || raw.cells.len() != expected {
            return Err(format!(
                "search grid of size {} needs {} cells, got {}",
                raw.size,
                expected,
                raw.cells.len()
            ));
        }
        let range = Range::square(raw.size);
        if let Some((cell, p)) = raw
            .cells
            .iter()
            .zip(range.iter())
            .find(|(cell, p)| cell.pos != *p)
        {
            return Err(format!("cell at {} is stored in the slot of {}", cell.pos, p));
        }
        if let Some(cell) = raw
            .cells
            .iter()
            .find(|c| c.parent.is_some_and(|q| !range.contains(q)))
        {
            return Err(format!("cell at {} has an out-of-bounds parent", cell.pos));
        }
        Ok(Self {
            size: raw.size,
            cells: raw.cells,
        })
    }
}
