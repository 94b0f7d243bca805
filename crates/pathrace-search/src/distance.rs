use pathrace_core::Point;

/// Manhattan (L1) distance between two points.
#[inline]
pub fn manhattan(a: Point, b: Point) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// The constant-zero heuristic used by uniform-cost search.
#[inline]
pub fn zero(_a: Point, _b: Point) -> i32 {
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_is_symmetric() {
        let a = Point::new(1, 4);
        let b = Point::new(5, 2);
        assert_eq!(manhattan(a, b), 6);
        assert_eq!(manhattan(b, a), 6);
        assert_eq!(manhattan(a, a), 0);
        assert_eq!(zero(a, b), 0);
    }
}
