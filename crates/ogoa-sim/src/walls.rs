//! Static wall map.
//!
//! The simulated environment is nothing more than an unordered list of line
//! segments in millimetres.  The default [`WallMap::hallway`] is an L-shaped
//! corridor: a long straight hallway running toward world −Y, opening at the
//! far end into a wider cross corridor toward world +X.
//!
//! # Example
//!
//! ```rust
//! use ogoa_sim::walls::WallMap;
//!
//! let map = WallMap::hallway();
//! assert_eq!(map.segments().len(), 6);
//! ```

use ogoa_types::Point2;

/// One straight boundary edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallSegment {
    pub start: Point2,
    pub end: Point2,
}

impl WallSegment {
    pub const fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    /// Vector from `start` to `end`.
    pub fn direction(&self) -> Point2 {
        self.end.sub(self.start)
    }

    pub fn length(&self) -> f64 {
        let d = self.direction();
        d.x.hypot(d.y)
    }
}

const HALLWAY: [WallSegment; 6] = [
    WallSegment::new(Point2::new(-800.0, 0.0), Point2::new(800.0, 0.0)),
    WallSegment::new(Point2::new(800.0, 0.0), Point2::new(800.0, -8200.0)),
    WallSegment::new(Point2::new(800.0, -8200.0), Point2::new(9000.0, -8200.0)),
    WallSegment::new(Point2::new(9000.0, -8200.0), Point2::new(9000.0, -9800.0)),
    WallSegment::new(Point2::new(9000.0, -9800.0), Point2::new(-800.0, -9800.0)),
    WallSegment::new(Point2::new(-800.0, -9800.0), Point2::new(-800.0, 0.0)),
];

/// Immutable collection of wall segments.
#[derive(Debug, Clone, PartialEq)]
pub struct WallMap {
    segments: Vec<WallSegment>,
}

impl WallMap {
    pub fn new(segments: Vec<WallSegment>) -> Self {
        Self { segments }
    }

    /// The L-shaped corridor the patrol trajectory runs through.
    pub fn hallway() -> Self {
        Self::new(HALLWAY.to_vec())
    }

    pub fn segments(&self) -> &[WallSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl Default for WallMap {
    fn default() -> Self {
        Self::hallway()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hallway_is_closed_loop() {
        let map = WallMap::hallway();
        let segs = map.segments();
        for pair in segs.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(segs[segs.len() - 1].end, segs[0].start);
    }

    #[test]
    fn segment_length() {
        let seg = WallSegment::new(Point2::new(0.0, 0.0), Point2::new(300.0, 400.0));
        assert!((seg.length() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn custom_map_keeps_order() {
        let a = WallSegment::new(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0));
        let b = WallSegment::new(Point2::new(1.0, 0.0), Point2::new(1.0, 1.0));
        let map = WallMap::new(vec![a, b]);
        assert_eq!(map.segments(), &[a, b]);
        assert!(!map.is_empty());
        assert!(WallMap::new(Vec::new()).is_empty());
    }
}
