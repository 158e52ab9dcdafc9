//! `ogoa-sim` – The Environment
//!
//! A synthetic lidar: a robot patrolling a fixed wall map, producing noisy,
//! smoothed range samples per integer angle, batched into frame-sized
//! chunks.
//!
//! # Modules
//!
//! - [`walls`] – Static wall segments and the default hallway map.
//! - [`raycast`] – Ray / segment intersection and nearest hit.
//! - [`trajectory`] – Time → pose along the periodic patrol path.
//! - [`noise`] – Injectable random source and the seeded noise generator.
//! - [`sampler`] – Noise, dropout and per-angle temporal smoothing.
//! - [`sweep`] – Chunk sizing, phase interleaving and step oscillation.
//!
//! # Example
//!
//! ```rust
//! use ogoa_sim::{
//!     NoiseGenerator, RangeSampler, SamplerParams, StepOscillator, SweepScheduler, WallMap,
//!     pose_at,
//! };
//!
//! let sampler = RangeSampler::new(
//!     WallMap::hallway(),
//!     SamplerParams::default(),
//!     NoiseGenerator::new(7),
//! );
//! let mut sched = SweepScheduler::new(sampler, StepOscillator::new(2, 2));
//! let chunks = sched.sweep(&pose_at(0.0, 20.0));
//! assert_eq!(chunks.len(), 4);
//! ```

pub mod noise;
pub mod raycast;
pub mod sampler;
pub mod sweep;
pub mod trajectory;
pub mod walls;

pub use noise::{NoiseGenerator, RandomSource};
pub use raycast::{intersect, nearest_hit};
pub use sampler::{NO_RETURN_MM, RangeSampler, SamplerParams, SmoothedRangeTable};
pub use sweep::{
    MAX_POINTS_PER_CHUNK, StepOscillator, SweepChunk, SweepChunkSpec, SweepScheduler,
    points_per_chunk,
};
pub use trajectory::{Trajectory, pose_at};
pub use walls::{WallMap, WallSegment};
