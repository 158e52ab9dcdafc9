//! Per-angle range sampling.
//!
//! Each sample starts from the exact ray-cast distance, gets sensor noise,
//! the odd glitch and random dropouts, and is then low-pass filtered against
//! the previous value for the same angle.  The per-angle history lives in a
//! [`SmoothedRangeTable`] owned by the caller.
//!
//! # Example
//!
//! ```rust
//! use ogoa_sim::noise::NoiseGenerator;
//! use ogoa_sim::sampler::{RangeSampler, SamplerParams, SmoothedRangeTable};
//! use ogoa_sim::walls::WallMap;
//! use ogoa_types::RobotPose;
//!
//! let mut sampler = RangeSampler::new(
//!     WallMap::hallway(),
//!     SamplerParams::new(0.35, 0.0),
//!     NoiseGenerator::new(1),
//! );
//! let mut table = SmoothedRangeTable::new();
//! let pose = RobotPose::new(0.0, -1200.0, 0.0);
//! let d = sampler.sample_into(&mut table, 180, &pose);
//! assert!(d < 4095);
//! assert_eq!(table.get(180), d);
//! ```

use ogoa_types::{Point2, RobotPose};

use crate::noise::RandomSource;
use crate::raycast::nearest_hit;
use crate::walls::WallMap;

/// Reported when nothing is in range.
pub const NO_RETURN_MM: u16 = 4095;
/// Distances at or beyond this are treated as "nothing there".
pub const MAX_DRAWABLE_MM: u16 = 3800;
/// Closest distance the sensor can report.
pub const MIN_RANGE_MM: u16 = 120;

pub const RANGE_NOISE_SIGMA_MM: f64 = 9.0;
pub const GLITCH_PROBABILITY: f64 = 0.01;
pub const GLITCH_SIGMA_MM: f64 = 40.0;

pub const DEFAULT_SMOOTHING_ALPHA: f64 = 0.35;
pub const DEFAULT_DROPOUT_PROBABILITY: f64 = 0.01;
pub const MAX_DROPOUT_PROBABILITY: f64 = 0.3;

pub const DEGREES: usize = 360;

// ────────────────────────────────────────────────────────────────────────────
// Smoothed range table
// ────────────────────────────────────────────────────────────────────────────

/// Last emitted distance for every integer angle, for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmoothedRangeTable {
    ranges: [u16; DEGREES],
}

impl SmoothedRangeTable {
    /// Every angle starts at [`NO_RETURN_MM`].
    pub fn new() -> Self {
        Self {
            ranges: [NO_RETURN_MM; DEGREES],
        }
    }

    /// Angles wrap modulo 360.
    pub fn get(&self, angle_deg: u16) -> u16 {
        self.ranges[usize::from(angle_deg) % DEGREES]
    }

    pub fn set(&mut self, angle_deg: u16, mm: u16) {
        self.ranges[usize::from(angle_deg) % DEGREES] = mm;
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.ranges
    }

    pub fn reset(&mut self) {
        self.ranges = [NO_RETURN_MM; DEGREES];
    }
}

impl Default for SmoothedRangeTable {
    fn default() -> Self {
        Self::new()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Parameters
// ────────────────────────────────────────────────────────────────────────────

/// Smoothing and dropout settings, clamped on construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerParams {
    smoothing_alpha: f64,
    dropout_prob: f64,
}

impl SamplerParams {
    /// `smoothing_alpha` is clamped to `[0, 1]` and `dropout_prob` to
    /// `[0, 0.3]`.  NaN falls back to the defaults.
    pub fn new(smoothing_alpha: f64, dropout_prob: f64) -> Self {
        Self {
            smoothing_alpha: clamp_or(smoothing_alpha, 0.0, 1.0, DEFAULT_SMOOTHING_ALPHA),
            dropout_prob: clamp_or(
                dropout_prob,
                0.0,
                MAX_DROPOUT_PROBABILITY,
                DEFAULT_DROPOUT_PROBABILITY,
            ),
        }
    }

    pub fn smoothing_alpha(&self) -> f64 {
        self.smoothing_alpha
    }

    pub fn dropout_prob(&self) -> f64 {
        self.dropout_prob
    }
}

impl Default for SamplerParams {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING_ALPHA, DEFAULT_DROPOUT_PROBABILITY)
    }
}

fn clamp_or(v: f64, lo: f64, hi: f64, fallback: f64) -> f64 {
    if v.is_nan() { fallback } else { v.clamp(lo, hi) }
}

// ────────────────────────────────────────────────────────────────────────────
// Sampler
// ────────────────────────────────────────────────────────────────────────────

/// World-frame unit direction of the beam at sensor angle `angle_deg`.
///
/// Sensor angle 0 points along the robot's heading; the whole frame is
/// rotated by −90° so heading 0 faces world −Y.
pub fn ray_direction(angle_deg: f64, heading_deg: f64) -> Point2 {
    let world_deg = (angle_deg + heading_deg).rem_euclid(360.0);
    let rad = (world_deg - 90.0).to_radians();
    Point2::new(rad.cos(), rad.sin())
}

/// Produces smoothed, noisy range samples against a fixed wall map.
#[derive(Debug)]
pub struct RangeSampler<R> {
    walls: WallMap,
    params: SamplerParams,
    rng: R,
}

impl<R: RandomSource> RangeSampler<R> {
    pub fn new(walls: WallMap, params: SamplerParams, rng: R) -> Self {
        Self { walls, params, rng }
    }

    pub fn walls(&self) -> &WallMap {
        &self.walls
    }

    pub fn params(&self) -> SamplerParams {
        self.params
    }

    /// Noiseless ray-cast distance in whole millimetres, or
    /// [`NO_RETURN_MM`] when no wall is hit.
    pub fn true_range(&self, angle_deg: u16, pose: &RobotPose) -> i32 {
        let dir = ray_direction(f64::from(angle_deg), pose.heading_deg);
        match nearest_hit(pose.position(), dir, &self.walls) {
            Some(t) => t as i32,
            None => i32::from(NO_RETURN_MM),
        }
    }

    /// One new smoothed distance for `angle_deg`, given the previous value
    /// for that angle.  A `previous_mm` of 0 means "no history yet".
    pub fn sample(&mut self, angle_deg: u16, pose: &RobotPose, previous_mm: u16) -> u16 {
        let mut raw = self.true_range(angle_deg, pose);

        if raw < i32::from(MAX_DRAWABLE_MM) {
            raw = (f64::from(raw) + self.rng.gaussian(RANGE_NOISE_SIGMA_MM)) as i32;
            if self.rng.chance(GLITCH_PROBABILITY) {
                raw = (f64::from(raw) + self.rng.gaussian(GLITCH_SIGMA_MM)) as i32;
            }
        }
        // Dropouts hit any angle, in range or not.
        if self.rng.chance(self.params.dropout_prob) {
            raw = i32::from(NO_RETURN_MM);
        }
        let raw = clamp_range(f64::from(raw));

        let previous = if previous_mm == 0 {
            MAX_DRAWABLE_MM
        } else {
            previous_mm
        };
        let target = if raw >= MAX_DRAWABLE_MM {
            NO_RETURN_MM
        } else {
            raw
        };
        let alpha = self.params.smoothing_alpha;
        let blended = ((1.0 - alpha) * f64::from(previous) + alpha * f64::from(target)).round();
        clamp_range(blended)
    }

    /// [`sample`](Self::sample) reading and writing the table entry.
    pub fn sample_into(
        &mut self,
        table: &mut SmoothedRangeTable,
        angle_deg: u16,
        pose: &RobotPose,
    ) -> u16 {
        let angle = angle_deg % DEGREES as u16;
        let d = self.sample(angle, pose, table.get(angle));
        table.set(angle, d);
        d
    }
}

fn clamp_range(mm: f64) -> u16 {
    mm.clamp(f64::from(MIN_RANGE_MM), f64::from(NO_RETURN_MM)) as u16
}
