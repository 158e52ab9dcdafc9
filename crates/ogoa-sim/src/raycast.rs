//! Ray / wall intersection.
//!
//! Rays are `origin + t * direction` with `t > 0`; the direction does not
//! need to be normalised, but the returned `t` is only a distance in
//! millimetres when it is.

use ogoa_types::Point2;

use crate::walls::{WallMap, WallSegment};

/// Determinants smaller than this are treated as parallel / degenerate.
pub const PARALLEL_EPSILON: f64 = 1e-9;

/// Ray parameter `t` at which the ray crosses `segment`, if it does.
///
/// Solved with Cramer's rule on `origin + t·d = start + u·s`.  A hit needs
/// `t > 0` and `0 ≤ u ≤ 1`, so a ray starting exactly on a wall does not see
/// that wall.
pub fn intersect(origin: Point2, direction: Point2, segment: &WallSegment) -> Option<f64> {
    let s = segment.direction();
    let denom = direction.cross(s);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    let qp = segment.start.sub(origin);
    let t = qp.cross(s) / denom;
    let u = qp.cross(direction) / denom;

    (t > 0.0 && (0.0..=1.0).contains(&u)).then_some(t)
}

/// Smallest valid `t` across every wall in `map`.
pub fn nearest_hit(origin: Point2, direction: Point2, map: &WallMap) -> Option<f64> {
    map.segments()
        .iter()
        .filter_map(|seg| intersect(origin, direction, seg))
        .min_by(f64::total_cmp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(ax: f64, ay: f64, bx: f64, by: f64) -> WallSegment {
        WallSegment::new(Point2::new(ax, ay), Point2::new(bx, by))
    }

    #[test]
    fn straight_down_hits_at_100() {
        let wall = seg(-10.0, -100.0, 10.0, -100.0);
        let t = intersect(Point2::new(0.0, 0.0), Point2::new(0.0, -1.0), &wall).unwrap();
        assert!((t - 100.0).abs() < 1e-9);
    }

    #[test]
    fn wall_behind_ray_is_ignored() {
        let wall = seg(-10.0, 100.0, 10.0, 100.0);
        assert!(intersect(Point2::new(0.0, 0.0), Point2::new(0.0, -1.0), &wall).is_none());
    }

    #[test]
    fn parallel_ray_misses() {
        let wall = seg(-10.0, -100.0, 10.0, -100.0);
        assert!(intersect(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), &wall).is_none());
    }

    #[test]
    fn segment_endpoints_count_as_hits() {
        let wall = seg(0.0, -100.0, 10.0, -100.0);
        let t = intersect(Point2::new(0.0, 0.0), Point2::new(0.0, -1.0), &wall).unwrap();
        assert!((t - 100.0).abs() < 1e-9);
        // Just past the end of the segment.
        assert!(intersect(Point2::new(-0.001, 0.0), Point2::new(0.0, -1.0), &wall).is_none());
    }

    #[test]
    fn nearest_hit_picks_closest_wall() {
        let map = WallMap::new(vec![
            seg(-10.0, -300.0, 10.0, -300.0),
            seg(-10.0, -100.0, 10.0, -100.0),
            seg(-10.0, -200.0, 10.0, -200.0),
        ]);
        let t = nearest_hit(Point2::new(0.0, 0.0), Point2::new(0.0, -1.0), &map).unwrap();
        assert!((t - 100.0).abs() < 1e-9);
    }

    #[test]
    fn hallway_ranges_from_start_pose() {
        let map = WallMap::hallway();
        let origin = Point2::new(0.0, -1200.0);
        // Back wall at y = 0.
        let back = nearest_hit(origin, Point2::new(0.0, 1.0), &map).unwrap();
        assert!((back - 1200.0).abs() < 1e-9);
        // Side walls at x = ±800.
        let right = nearest_hit(origin, Point2::new(1.0, 0.0), &map).unwrap();
        let left = nearest_hit(origin, Point2::new(-1.0, 0.0), &map).unwrap();
        assert!((right - 800.0).abs() < 1e-9);
        assert!((left - 800.0).abs() < 1e-9);
    }

    #[test]
    fn empty_map_has_no_hit() {
        let map = WallMap::new(Vec::new());
        assert!(nearest_hit(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), &map).is_none());
    }
}
