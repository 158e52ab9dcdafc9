//! [`Harness`] – the cooperative link-exercise loop.
//!
//! One thread, one loop.  Each iteration ([`Harness::step`]):
//!
//! 1. **Status** – when the status timer is due, send a `STATUS_REQUEST`.
//! 2. **Sweep** – when the lidar timer is due, sample the simulated
//!    environment at the current trajectory pose and send one `LIDAR_SEND`
//!    frame per chunk.
//! 3. **Receive** – read up to one chunk of bytes, decode, and react: every
//!    non-ACK frame is acknowledged with its own sequence number, and every
//!    `STATUS_REQUEST` is answered with a `STATUS_RESPONSE`.
//! 4. **Expire** – forget our frames whose ACK did not arrive in time.
//!
//! [`Harness::run`] repeats this until the configured duration has elapsed.
//! Nothing inside an iteration can end the run: transport and encode failures
//! are logged, counted, and the loop moves on.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use ogoa_runtime::harness::{Harness, HarnessConfig};
//! use ogoa_runtime::schedule::ManualClock;
//! use ogoa_runtime::transport::MemoryTransport;
//! use ogoa_sim::NoiseGenerator;
//!
//! let config = HarnessConfig {
//!     duration: Duration::from_millis(500),
//!     ..HarnessConfig::default()
//! };
//! let mut harness = Harness::new(config, MemoryTransport::new(), NoiseGenerator::new(1));
//! let stats = harness.run(&ManualClock::new());
//! assert_eq!(stats.status_requests_sent, 1);
//! assert_eq!(stats.sweeps, 3);
//! ```

use std::time::Duration;

use ogoa_protocol::{
    AckTracker, DecodeEvent, DuplicateFilter, Frame, FrameDecoder, FrameType, LidarScanChunk,
    SequenceCounter, StatusReport, hex_dump,
};
use ogoa_sim::{
    RandomSource, RangeSampler, SamplerParams, StepOscillator, SweepChunk, SweepScheduler,
    Trajectory, WallMap,
};
use tracing::{debug, info, warn};

use crate::schedule::{Clock, Deadline, IntervalTimer};
use crate::summary::LinkStats;
use crate::transport::Transport;

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Pause between loop iterations.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5);
/// Most bytes pulled from the transport per iteration.
pub const READ_CHUNK_BYTES: usize = 256;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Loop timing and simulation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    /// Total run time.
    pub duration: Duration,
    pub status_interval: Duration,
    /// `None` disables sweeps.
    pub lidar_interval: Option<Duration>,
    /// Period of the patrol trajectory, in seconds.
    pub scenario_seconds: f64,
    pub min_step: u16,
    pub max_step: u16,
    pub sampler: SamplerParams,
    pub poll_interval: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(8),
            status_interval: Duration::from_secs(1),
            lidar_interval: Some(Duration::from_millis(200)),
            scenario_seconds: 20.0,
            min_step: 2,
            max_step: 2,
            sampler: SamplerParams::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Harness
// ─────────────────────────────────────────────────────────────────────────────

/// Drives the serial link: status polling, simulated lidar, ACK handling.
pub struct Harness<T, R> {
    config: HarnessConfig,
    transport: T,
    read_buf: Vec<u8>,
    decoder: FrameDecoder,
    sequence: SequenceCounter,
    acks: AckTracker,
    duplicates: DuplicateFilter,
    trajectory: Trajectory,
    sweeps: SweepScheduler<R>,
    status_timer: IntervalTimer,
    lidar_timer: Option<IntervalTimer>,
    stats: LinkStats,
}

impl<T: Transport, R: RandomSource> Harness<T, R> {
    pub fn new(config: HarnessConfig, transport: T, rng: R) -> Self {
        let sampler = RangeSampler::new(WallMap::hallway(), config.sampler, rng);
        let sweeps = SweepScheduler::new(
            sampler,
            StepOscillator::new(config.min_step, config.max_step),
        );
        Self {
            transport,
            read_buf: vec![0u8; READ_CHUNK_BYTES],
            decoder: FrameDecoder::new(),
            sequence: SequenceCounter::new(),
            acks: AckTracker::default(),
            duplicates: DuplicateFilter::new(),
            trajectory: Trajectory::new(config.scenario_seconds),
            sweeps,
            status_timer: IntervalTimer::new(config.status_interval),
            lidar_timer: config
                .lidar_interval
                .filter(|d| !d.is_zero())
                .map(IntervalTimer::new),
            stats: LinkStats::default(),
            config,
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Current counters, including decoder and ACK bookkeeping.
    pub fn stats(&self) -> LinkStats {
        let decoder = self.decoder.stats();
        LinkStats {
            checksum_errors: decoder.checksum_errors,
            discarded_bytes: decoder.discarded_bytes,
            acknowledged: self.acks.acknowledged(),
            unacknowledged: self.acks.expired(),
            ..self.stats
        }
    }

    /// Loop until `config.duration` has elapsed on `clock`.
    pub fn run<C: Clock>(&mut self, clock: &C) -> LinkStats {
        let start = clock.now();
        let deadline = Deadline::after(start, self.config.duration);
        info!(
            duration_secs = self.config.duration.as_secs_f64(),
            sweeps_enabled = self.lidar_timer.is_some(),
            "harness loop started"
        );

        loop {
            let now = clock.now();
            if deadline.is_reached(now) {
                break;
            }
            self.step(now.saturating_sub(start));
            clock.sleep(self.config.poll_interval);
        }

        // Anything still waiting for an ACK at the end never got one.
        let leftover = self.acks.expire(Duration::MAX);
        if !leftover.is_empty() {
            debug!(count = leftover.len(), "frames unacknowledged at shutdown");
        }
        self.stats()
    }

    /// One loop iteration at run time `now`.
    pub fn step(&mut self, now: Duration) {
        if self.status_timer.poll(now) {
            let seq = self.sequence.next_seq();
            self.send(seq, FrameType::StatusRequest, Vec::new(), now);
        }

        let sweep_due = self.lidar_timer.as_mut().is_some_and(|t| t.poll(now));
        if sweep_due {
            self.emit_sweep(now);
        }

        match self.transport.read(&mut self.read_buf) {
            Ok(0) => {}
            Ok(n) => {
                self.stats.bytes_received += n as u64;
                let events = self.decoder.feed(&self.read_buf[..n]);
                for event in events {
                    if let DecodeEvent::Frame(frame) = event {
                        self.handle_frame(&frame, now);
                    }
                }
            }
            Err(e) => {
                self.stats.transport_errors += 1;
                warn!(error = %e, "serial read failed");
            }
        }

        for expired in self.acks.expire(now) {
            debug!(
                seq = expired.sequence,
                frame_type = %expired.frame_type,
                "no ACK within timeout"
            );
        }
    }

    fn emit_sweep(&mut self, now: Duration) {
        let pose = self.trajectory.pose_at(now.as_secs_f64());
        let chunks = self.sweeps.sweep(&pose);
        for chunk in chunks {
            debug!(
                base = chunk.spec.start_angle - chunk.spec.phase_offset,
                step = chunk.spec.angular_step,
                phase = chunk.spec.phase_offset,
                points = chunk.distances.len(),
                x = pose.x_mm as i64,
                y = pose.y_mm as i64,
                heading = pose.heading_deg as i64,
                "lidar chunk"
            );
            let seq = self.sequence.next_seq();
            self.send(seq, FrameType::LidarSend, lidar_payload(chunk), now);
        }
        self.stats.sweeps += 1;
    }

    fn handle_frame(&mut self, frame: &Frame, now: Duration) {
        self.stats.frames_received += 1;
        log_frame("RX", frame);

        if self.duplicates.observe(frame) {
            self.stats.duplicates += 1;
            warn!(
                seq = frame.sequence(),
                frame_type = %frame.frame_type(),
                "duplicate frame (peer retransmitted)"
            );
        }

        let seq = frame.sequence();
        match frame.frame_type() {
            FrameType::Ack => {
                if self.acks.acknowledge(seq).is_none() {
                    self.stats.unsolicited_acks += 1;
                    debug!(seq, "ACK for a frame we are not waiting on");
                }
                return;
            }
            FrameType::StatusResponse => match StatusReport::decode(frame.payload()) {
                Ok(report) => info!(
                    mode = report.mode,
                    x = report.x,
                    y = report.y,
                    "device status"
                ),
                Err(e) => warn!(error = %e, "malformed status response"),
            },
            FrameType::LidarSend => match LidarScanChunk::decode(frame.payload()) {
                Ok(chunk) => debug!(
                    start = chunk.start_angle,
                    step = chunk.angular_step,
                    points = chunk.distances.len(),
                    "device lidar chunk"
                ),
                Err(e) => warn!(error = %e, "malformed lidar payload"),
            },
            FrameType::StatusRequest => {}
            FrameType::Unknown(code) => debug!(code, "frame of unknown type"),
        }

        self.send(seq, FrameType::Ack, Vec::new(), now);

        if frame.frame_type() == FrameType::StatusRequest {
            let reply = self.sequence.next_seq();
            self.send(
                reply,
                FrameType::StatusResponse,
                StatusReport::DEMO.encode().to_vec(),
                now,
            );
        }
    }

    /// Encode and write one frame.  Failures are logged and counted.
    fn send(&mut self, seq: u8, frame_type: FrameType, payload: Vec<u8>, now: Duration) {
        let frame = match Frame::new(seq, frame_type, payload) {
            Ok(frame) => frame,
            Err(e) => {
                self.stats.encode_errors += 1;
                warn!(error = %e, frame_type = %frame_type, "frame not sent");
                return;
            }
        };
        let bytes = frame.to_bytes();
        if let Err(e) = self.transport.write_all(&bytes) {
            self.stats.transport_errors += 1;
            warn!(error = %e, frame_type = %frame_type, seq, "serial write failed");
            return;
        }
        log_frame("TX", &frame);

        self.stats.frames_sent += 1;
        self.stats.bytes_sent += bytes.len() as u64;
        match frame_type {
            FrameType::StatusRequest => self.stats.status_requests_sent += 1,
            FrameType::StatusResponse => self.stats.status_responses_sent += 1,
            FrameType::Ack => self.stats.acks_sent += 1,
            FrameType::LidarSend => self.stats.lidar_frames_sent += 1,
            FrameType::Unknown(_) => {}
        }
        self.acks.track(seq, frame_type, now);
    }
}

fn lidar_payload(chunk: SweepChunk) -> Vec<u8> {
    LidarScanChunk {
        start_angle: (chunk.spec.start_angle & 0xFF) as u8,
        angular_step: (chunk.spec.angular_step & 0xFF) as u8,
        distances: chunk.distances,
    }
    .encode()
}

fn log_frame(direction: &'static str, frame: &Frame) {
    info!(
        dir = direction,
        frame_type = %frame.frame_type(),
        seq = frame.sequence(),
        len = frame.len(),
        "frame"
    );
    debug!(dir = direction, raw = %hex_dump(&frame.to_bytes()));
}
