//! `ogoa-protocol` – The Wire
//!
//! Byte-level framing for the OGOA serial link.  Knows how to build, validate
//! and resynchronise frames, but nothing about what a lidar is or where the
//! robot stands.
//!
//! # Modules
//!
//! - [`frame`] – Frame layout, frame types, checksum and encoding.
//! - [`decoder`] – Resynchronising stream decoder for a noisy byte stream.
//! - [`payload`] – Typed `StatusResponse` and `LidarSend` payloads.
//! - [`handshake`] – Ack bookkeeping and retransmission detection.
//!
//! # Example
//!
//! ```rust
//! use ogoa_protocol::{FrameDecoder, FrameType, DecodeEvent, encode_frame};
//!
//! let bytes = encode_frame(7, FrameType::StatusRequest, &[]).unwrap();
//! let mut decoder = FrameDecoder::new();
//! let events = decoder.feed(&bytes);
//! assert!(matches!(&events[0], DecodeEvent::Frame(f) if f.sequence() == 7));
//! ```

pub mod decoder;
pub mod frame;
pub mod handshake;
pub mod payload;

pub use decoder::{DecodeEvent, DecoderStats, FrameDecoder, decode_frames};
pub use frame::{
    ACK_TIMEOUT, FRAME_MAX_BYTES, Frame, FrameType, MAX_PAYLOAD, SequenceCounter, START_BYTE,
    checksum, encode_frame, hex_dump,
};
pub use handshake::{AckTracker, DuplicateFilter, PendingAck};
pub use payload::{LidarScanChunk, MAX_SAMPLES_PER_FRAME, StatusReport};
