//! Sweep scheduling.
//!
//! One sweep covers the circle as two half-circle chunks (`0..180` and
//! `180..360`), each of which becomes one `LidarSend` frame.  At an angular
//! step of 2 a second pass offset by one degree is added so every integer
//! angle is sampled exactly once per sweep.
//!
//! Between sweeps the angular step walks back and forth between a minimum
//! and a maximum ([`StepOscillator`]) so the receiver sees a variety of
//! payload shapes.
//!
//! # Example
//!
//! ```rust
//! use ogoa_sim::sweep::points_per_chunk;
//!
//! assert_eq!(points_per_chunk(180, 2, 0, 120), 90);
//! assert_eq!(points_per_chunk(180, 1, 0, 120), 120);
//! ```

use ogoa_types::RobotPose;
use tracing::trace;

use crate::noise::RandomSource;
use crate::sampler::{DEGREES, RangeSampler, SmoothedRangeTable};

/// Samples per frame, kept below the 124 a `LidarSend` payload could hold.
pub const MAX_POINTS_PER_CHUNK: usize = 120;
/// Angular width of one chunk.
pub const CHUNK_WIDTH_DEG: u16 = 180;
/// First angle of each chunk before the phase offset is added.
pub const CHUNK_BASES: [u16; 2] = [0, 180];
/// Smallest step the oscillator starts from.
pub const MIN_START_STEP: u16 = 2;
/// Smallest step the oscillator ever reaches.
pub const MIN_ANGULAR_STEP: u16 = 1;

/// Number of samples needed to span a chunk at the given step and phase,
/// bounded to `[1, max_points]`.  A step of 0 is treated as 1.
pub fn points_per_chunk(
    chunk_width_deg: u16,
    angular_step: u16,
    phase_offset: u16,
    max_points: usize,
) -> usize {
    let usable = usize::from(chunk_width_deg.saturating_sub(phase_offset).max(1));
    let step = usize::from(angular_step.max(MIN_ANGULAR_STEP));
    usable.div_ceil(step).clamp(1, max_points.max(1))
}

/// One contiguous batch of angles packed into a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepChunkSpec {
    pub start_angle: u16,
    pub angular_step: u16,
    pub phase_offset: u16,
    pub max_points: usize,
}

impl SweepChunkSpec {
    pub fn point_count(&self) -> usize {
        points_per_chunk(
            CHUNK_WIDTH_DEG,
            self.angular_step,
            self.phase_offset,
            self.max_points,
        )
    }

    /// Angles visited by this chunk, wrapped into `[0, 360)`.  Walks with
    /// the same effective step as [`point_count`](Self::point_count).
    pub fn angles(&self) -> impl Iterator<Item = u16> + '_ {
        let deg = DEGREES as u32;
        let step = u32::from(self.angular_step.max(MIN_ANGULAR_STEP));
        (0..self.point_count() as u32).map(move |i| {
            let a = u32::from(self.start_angle) + i * step;
            (a % deg) as u16
        })
    }
}

/// Sampled distances for one [`SweepChunkSpec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepChunk {
    pub spec: SweepChunkSpec,
    pub angles: Vec<u16>,
    pub distances: Vec<u16>,
}

/// Specs for one sweep at `angular_step`, in emission order.
pub fn sweep_plan(angular_step: u16, max_points: usize) -> Vec<SweepChunkSpec> {
    let phases: &[u16] = if angular_step == 2 { &[0, 1] } else { &[0] };
    phases
        .iter()
        .flat_map(|&phase_offset| {
            CHUNK_BASES.iter().map(move |&base| SweepChunkSpec {
                start_angle: base + phase_offset,
                angular_step,
                phase_offset,
                max_points,
            })
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Step oscillation
// ────────────────────────────────────────────────────────────────────────────

/// Triangular-wave angular step bounded by `[min_step, max_step]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOscillator {
    current: u16,
    direction: i8,
    min_step: u16,
    max_step: u16,
}

impl StepOscillator {
    /// Starts at `max(2, min(min_step, max_step))`, moving upward.  Both
    /// bounds are floored at [`MIN_ANGULAR_STEP`].
    pub fn new(min_step: u16, max_step: u16) -> Self {
        let min_step = min_step.max(MIN_ANGULAR_STEP);
        let max_step = max_step.max(MIN_ANGULAR_STEP);
        Self {
            current: min_step.min(max_step).max(MIN_START_STEP),
            direction: 1,
            min_step,
            max_step,
        }
    }

    pub fn current(&self) -> u16 {
        self.current
    }

    /// Move one step along the wave.  Fixed when `max_step <= min_step`.
    pub fn advance(&mut self) -> u16 {
        if self.max_step > self.min_step {
            let next = i32::from(self.current) + i32::from(self.direction);
            if next >= i32::from(self.max_step) {
                self.current = self.max_step;
                self.direction = -1;
            } else if next <= i32::from(self.min_step) {
                self.current = self.min_step;
                self.direction = 1;
            } else {
                self.current = next as u16;
            }
        }
        self.current
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scheduler
// ────────────────────────────────────────────────────────────────────────────

/// Runs sweeps, owning the sampler, its smoothing history and the step state.
#[derive(Debug)]
pub struct SweepScheduler<R> {
    sampler: RangeSampler<R>,
    table: SmoothedRangeTable,
    oscillator: StepOscillator,
    max_points: usize,
}

impl<R: RandomSource> SweepScheduler<R> {
    pub fn new(sampler: RangeSampler<R>, oscillator: StepOscillator) -> Self {
        Self {
            sampler,
            table: SmoothedRangeTable::new(),
            oscillator,
            max_points: MAX_POINTS_PER_CHUNK,
        }
    }

    pub fn current_step(&self) -> u16 {
        self.oscillator.current()
    }

    pub fn table(&self) -> &SmoothedRangeTable {
        &self.table
    }

    /// Sample every chunk of one sweep from `pose`, then advance the step.
    pub fn sweep(&mut self, pose: &RobotPose) -> Vec<SweepChunk> {
        let step = self.oscillator.current();
        let chunks: Vec<SweepChunk> = sweep_plan(step, self.max_points)
            .into_iter()
            .map(|spec| {
                let angles: Vec<u16> = spec.angles().collect();
                let distances = angles
                    .iter()
                    .map(|&a| self.sampler.sample_into(&mut self.table, a, pose))
                    .collect();
                SweepChunk {
                    spec,
                    angles,
                    distances,
                }
            })
            .collect();

        let next = self.oscillator.advance();
        trace!(step, next, chunks = chunks.len(), "sweep complete");
        chunks
    }
}
