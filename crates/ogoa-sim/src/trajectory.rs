//! Patrol trajectory through the hallway.
//!
//! The robot follows a closed periodic path, split into three bands of the
//! normalised loop phase `p ∈ [0, 1)`:
//!
//! | band | `p` | motion |
//! |------|-----|--------|
//! | hallway | `[0, 0.55)` | straight down the hallway, heading 0° |
//! | corner | `[0.55, 0.75)` | drift into the cross corridor, heading 0° → 90° |
//! | cross corridor | `[0.75, 1)` | straight along +X, heading 90° |
//!
//! Within each band position and heading are linear in the band fraction.
//! At the end of the loop the pose jumps back to the start.
//!
//! # Example
//!
//! ```rust
//! use ogoa_sim::trajectory::pose_at;
//!
//! let pose = pose_at(11.0, 20.0);
//! assert!((pose.y_mm + 8600.0).abs() < 1e-6);
//! assert!(pose.heading_deg.abs() < 1e-9);
//! ```

use ogoa_types::RobotPose;

/// Loop period used when the configured one is zero or negative.
pub const DEFAULT_LOOP_SECONDS: f64 = 20.0;

const MIN_LOOP_SECONDS: f64 = 1e-6;

const HALLWAY_END: f64 = 0.55;
const CORNER_END: f64 = 0.75;

const HALLWAY_START_Y: f64 = -1200.0;
const HALLWAY_TRAVEL: f64 = 7400.0;
const CORNER_X_TRAVEL: f64 = 1800.0;
const CORNER_END_Y: f64 = -9000.0;
const CROSS_TRAVEL: f64 = 5200.0;

/// Pose of the robot `elapsed_seconds` into the run.
pub fn pose_at(elapsed_seconds: f64, loop_seconds: f64) -> RobotPose {
    let period = effective_loop(loop_seconds);
    let p = elapsed_seconds.rem_euclid(period) / period;

    if p < HALLWAY_END {
        let u = p / HALLWAY_END;
        RobotPose::new(0.0, HALLWAY_START_Y - HALLWAY_TRAVEL * u, 0.0)
    } else if p < CORNER_END {
        let u = (p - HALLWAY_END) / (CORNER_END - HALLWAY_END);
        let entry_y = HALLWAY_START_Y - HALLWAY_TRAVEL;
        RobotPose::new(
            CORNER_X_TRAVEL * u,
            entry_y + (CORNER_END_Y - entry_y) * u,
            90.0 * u,
        )
    } else {
        let u = (p - CORNER_END) / (1.0 - CORNER_END);
        RobotPose::new(CORNER_X_TRAVEL + CROSS_TRAVEL * u, CORNER_END_Y, 90.0)
    }
}

fn effective_loop(loop_seconds: f64) -> f64 {
    if loop_seconds <= MIN_LOOP_SECONDS || !loop_seconds.is_finite() {
        DEFAULT_LOOP_SECONDS
    } else {
        loop_seconds
    }
}

/// A [`pose_at`] bound to one loop period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trajectory {
    loop_seconds: f64,
}

impl Trajectory {
    pub fn new(loop_seconds: f64) -> Self {
        Self {
            loop_seconds: effective_loop(loop_seconds),
        }
    }

    pub fn loop_seconds(&self) -> f64 {
        self.loop_seconds
    }

    pub fn pose_at(&self, elapsed_seconds: f64) -> RobotPose {
        pose_at(elapsed_seconds, self.loop_seconds)
    }
}

impl Default for Trajectory {
    fn default() -> Self {
        Self::new(DEFAULT_LOOP_SECONDS)
    }
}
