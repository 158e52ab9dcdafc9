//! `ogoa-types` – Shared Vocabulary
//!
//! Value types passed between the codec, the simulated environment and the
//! runtime: plane geometry ([`Point2`]), the robot pose ([`RobotPose`]) and
//! the single error enum ([`OgoaError`]) every `ogoa-*` crate returns.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A point (or free vector) in the simulated world plane, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - rhs`.
    pub fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }

    /// 2-D cross product (z component of the 3-D cross product).
    pub fn cross(self, rhs: Self) -> f64 {
        self.x * rhs.y - self.y * rhs.x
    }
}

/// Simulated robot pose.
///
/// `heading_deg` is 0° when the robot faces "forward" down the first
/// hallway (world −Y) and grows as it turns toward world +X.
/// Poses are produced fresh on every tick and never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RobotPose {
    pub x_mm: f64,
    pub y_mm: f64,
    pub heading_deg: f64,
}

impl RobotPose {
    pub const fn new(x_mm: f64, y_mm: f64, heading_deg: f64) -> Self {
        Self {
            x_mm,
            y_mm,
            heading_deg,
        }
    }

    /// The pose position as a [`Point2`].
    pub fn position(&self) -> Point2 {
        Point2::new(self.x_mm, self.y_mm)
    }
}

/// Error type shared by the codec, the simulator, and the harness runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OgoaError {
    /// Encode-time: the payload does not fit in a single frame.
    #[error("Payload too large: {len} bytes exceeds the {max}-byte frame limit")]
    PayloadTooLarge { len: usize, max: usize },

    /// Decode-time: recomputed checksum differs from the trailing byte.
    #[error("Checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_cross_and_sub() {
        let a = Point2::new(3.0, 1.0);
        let b = Point2::new(1.0, 2.0);
        let d = a.sub(b);
        assert!((d.x - 2.0).abs() < 1e-12);
        assert!((d.y + 1.0).abs() < 1e-12);
        // 3*2 - 1*1 = 5
        assert!((a.cross(b) - 5.0).abs() < 1e-12);
        assert!((b.cross(a) + 5.0).abs() < 1e-12);
    }

    #[test]
    fn pose_position_matches_fields() {
        let pose = RobotPose::new(10.0, -20.0, 45.0);
        assert_eq!(pose.position(), Point2::new(10.0, -20.0));
    }

    #[test]
    fn pose_serialization_roundtrip() {
        let pose = RobotPose::new(1800.0, -9000.0, 90.0);
        let json = serde_json::to_string(&pose).unwrap();
        let back: RobotPose = serde_json::from_str(&json).unwrap();
        assert_eq!(pose, back);
    }

    #[test]
    fn error_display() {
        let err = OgoaError::PayloadTooLarge { len: 300, max: 251 };
        assert!(err.to_string().contains("300"));
        assert!(err.to_string().contains("251"));

        let err2 = OgoaError::ChecksumMismatch {
            expected: 0x24,
            actual: 0x55,
        };
        assert_eq!(
            err2.to_string(),
            "Checksum mismatch: expected 0x24, got 0x55"
        );
    }
}
