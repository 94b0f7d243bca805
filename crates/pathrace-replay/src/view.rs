use pathrace_core::Point;
use pathrace_search::SearchCell;

/// The read-only state of one cell as shown to the presentation layer.
///
/// Unset costs carry [`pathrace_search::UNREACHABLE`] so every field stays
/// numeric.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CellView {
    pub x: i32,
    pub y: i32,
    pub is_obstacle: bool,
    pub g: i32,
    pub h: i32,
    pub f: i32,
    pub is_open: bool,
    pub is_closed: bool,
    pub is_on_path: bool,
}

impl CellView {
    pub fn new(cell: &SearchCell, on_path: bool) -> Self {
        Self {
            x: cell.pos.x,
            y: cell.pos.y,
            is_obstacle: cell.obstacle,
            g: cell.g,
            h: cell.h,
            f: cell.f,
            is_open: cell.open,
            is_closed: cell.closed,
            is_on_path: on_path,
        }
    }

    #[inline]
    pub fn pos(&self) -> Point {
        Point::new(self.x, self.y)
    }
}
