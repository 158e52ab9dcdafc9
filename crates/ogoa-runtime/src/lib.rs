//! `ogoa-runtime` – The Loop
//!
//! Glues the wire codec and the simulated environment to a real byte
//! transport and runs them on a single cooperative loop.
//!
//! # Modules
//!
//! - [`harness`] – [`Harness`][harness::Harness]: status polling, simulated
//!   lidar sweeps and ACK handling, stepped by a monotonic clock until a
//!   deadline.
//! - [`transport`] – the [`Transport`][transport::Transport] seam with a
//!   serial implementation and an in-memory double.
//! - [`schedule`] – clocks, next-fire-time interval timers and the run
//!   deadline.
//! - [`summary`] – link counters and the end-of-run report.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: console or
//!   JSON logs, plus OTLP span export when `OTEL_EXPORTER_OTLP_ENDPOINT` is
//!   set.

pub mod harness;
pub mod schedule;
pub mod summary;
pub mod telemetry;
pub mod transport;

pub use harness::{Harness, HarnessConfig};
pub use schedule::{Clock, IntervalTimer, ManualClock, MonotonicClock};
pub use summary::{LinkStats, RunSummary};
pub use telemetry::{TracerProviderGuard, init_tracing};
pub use transport::{MemoryTransport, SerialSettings, SerialTransport, Transport};
