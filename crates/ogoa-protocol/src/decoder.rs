//! Stream decoder with resynchronisation.
//!
//! Bytes arrive from the serial link in arbitrary fragments.  The decoder
//! keeps them in a buffer and repeatedly tries to carve complete frames off
//! its front:
//!
//! 1. Fewer than [`MIN_FRAME_BYTES`] buffered → wait for more.
//! 2. No [`START_BYTE`] anywhere → drop the whole buffer and wait.
//! 3. Drop any prefix before the start marker.
//! 4. Not enough bytes for `5 + LEN` → wait.
//! 5. Checksum mismatch → report it and drop **exactly one** byte, then
//!    rescan.  A start byte inside a corrupted frame's payload may be the
//!    real start of the next frame, so nothing more than the leading byte
//!    is thrown away.
//! 6. Checksum match → emit the frame, consume its bytes, and continue.
//!
//! Every call terminates in the "need more data" state, so the decoder can
//! be fed partial input as often as the caller likes.
//!
//! # Example
//!
//! ```rust
//! use ogoa_protocol::decoder::{DecodeEvent, FrameDecoder};
//! use ogoa_protocol::frame::{encode_frame, FrameType};
//!
//! let bytes = encode_frame(5, FrameType::StatusRequest, &[]).unwrap();
//! let mut decoder = FrameDecoder::new();
//!
//! assert!(decoder.feed(&bytes[..3]).is_empty());
//! let events = decoder.feed(&bytes[3..]);
//! assert!(matches!(&events[..], [DecodeEvent::Frame(f)] if f.sequence() == 5));
//! ```

use ogoa_types::OgoaError;
use tracing::{debug, warn};

use crate::frame::{Frame, MIN_FRAME_BYTES, START_BYTE, checksum, hex_dump};

/// One outcome of a decode pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeEvent {
    /// A frame whose checksum verified.
    Frame(Frame),
    /// A candidate frame failed its checksum; one byte was discarded.
    ChecksumMismatch {
        expected: u8,
        actual: u8,
        /// The candidate frame bytes as they were buffered.
        raw: Vec<u8>,
    },
}

impl DecodeEvent {
    /// The failure this event reports, if any.
    pub fn error(&self) -> Option<OgoaError> {
        match self {
            DecodeEvent::Frame(_) => None,
            DecodeEvent::ChecksumMismatch { expected, actual, .. } => Some(OgoaError::ChecksumMismatch {
                expected: *expected,
                actual: *actual,
            }),
        }
    }
}

/// Decode every frame currently available in `buf`.
///
/// Consumed bytes (frames, resync garbage) are removed from the front of
/// `buf`; a trailing partial frame is left in place for the next call.
pub fn decode_frames(buf: &mut Vec<u8>) -> Vec<DecodeEvent> {
    let mut events = Vec::new();
    decode_into(buf, &mut events, &mut DecoderStats::default());
    events
}

/// Counters kept by a [`FrameDecoder`] across calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    pub frames: u64,
    pub checksum_errors: u64,
    /// Bytes dropped while hunting for a start marker or after a bad checksum.
    pub discarded_bytes: u64,
}

/// Owns the receive buffer between reads.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
    stats: DecoderStats,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes to the receive buffer without decoding.
    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Decode whatever is currently buffered.
    pub fn decode(&mut self) -> Vec<DecodeEvent> {
        let mut events = Vec::new();
        decode_into(&mut self.buf, &mut events, &mut self.stats);
        events
    }

    /// [`push`][Self::push] then [`decode`][Self::decode].
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<DecodeEvent> {
        self.push(bytes);
        self.decode()
    }

    /// Number of bytes waiting for the rest of a frame.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Drop buffered bytes (e.g. after reopening the port).  Stats are kept.
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

fn decode_into(buf: &mut Vec<u8>, events: &mut Vec<DecodeEvent>, stats: &mut DecoderStats) {
    loop {
        if buf.len() < MIN_FRAME_BYTES {
            break;
        }

        let Some(start_idx) = buf.iter().position(|&b| b == START_BYTE) else {
            debug!(discarded = buf.len(), "no start marker; dropping buffer");
            stats.discarded_bytes += buf.len() as u64;
            buf.clear();
            break;
        };
        if start_idx > 0 {
            stats.discarded_bytes += start_idx as u64;
            buf.drain(..start_idx);
        }
        if buf.len() < MIN_FRAME_BYTES {
            break;
        }

        let total_len = MIN_FRAME_BYTES + buf[3] as usize;
        if buf.len() < total_len {
            break;
        }

        let candidate = &buf[..total_len];
        let expected = checksum(&candidate[..total_len - 1]);
        let actual = candidate[total_len - 1];
        if expected != actual {
            let event = DecodeEvent::ChecksumMismatch {
                expected,
                actual,
                raw: candidate.to_vec(),
            };
            if let Some(err) = event.error() {
                warn!(error = %err, raw = %hex_dump(candidate), "resynchronising");
            }
            events.push(event);
            stats.checksum_errors += 1;
            stats.discarded_bytes += 1;
            buf.remove(0);
            continue;
        }

        events.push(DecodeEvent::Frame(Frame::from_validated(candidate)));
        stats.frames += 1;
        buf.drain(..total_len);
    }
}
