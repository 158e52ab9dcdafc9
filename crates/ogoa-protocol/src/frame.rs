//! Frame layout, frame types, and the encoder.
//!
//! ```text
//!  0       1       2       3       4 ... N      N+1
//! +-------+-------+-------+-------+------------+-------+
//! | Start |  Seq  | Type  |  Len  |  Payload   | Chksum|
//! +-------+-------+-------+-------+------------+-------+
//! ```
//!
//! The checksum is the XOR of every preceding byte, start marker included.
//! A frame never exceeds [`FRAME_MAX_BYTES`], which leaves
//! [`MAX_PAYLOAD`] bytes for the payload.
//!
//! # Example
//!
//! ```rust
//! use ogoa_protocol::frame::{encode_frame, FrameType};
//!
//! let bytes = encode_frame(7, FrameType::Ack, &[]).unwrap();
//! assert_eq!(bytes, vec![0x27, 0x07, 0x67, 0x00, 0x27 ^ 0x07 ^ 0x67]);
//! ```

use std::fmt;
use std::time::Duration;

use ogoa_types::OgoaError;

// ────────────────────────────────────────────────────────────────────────────
// Wire constants
// ────────────────────────────────────────────────────────────────────────────

/// Fixed start-of-frame marker.
pub const START_BYTE: u8 = 0x27;
/// Start, sequence, type, and length bytes.
pub const HEADER_BYTES: usize = 4;
pub const CHECKSUM_BYTES: usize = 1;
/// Upper bound on the total wire length of one frame.
pub const FRAME_MAX_BYTES: usize = 256;
/// Largest payload that fits in one frame (251 bytes).
pub const MAX_PAYLOAD: usize = FRAME_MAX_BYTES - HEADER_BYTES - CHECKSUM_BYTES;
/// Smallest complete frame: header plus checksum, empty payload.
pub const MIN_FRAME_BYTES: usize = HEADER_BYTES + CHECKSUM_BYTES;
/// How long a peer waits for an Ack before considering a frame lost.
pub const ACK_TIMEOUT: Duration = Duration::from_millis(100);

// ────────────────────────────────────────────────────────────────────────────
// FrameType
// ────────────────────────────────────────────────────────────────────────────

/// The frame `TYPE` byte.
///
/// Unrecognised codes decode to [`FrameType::Unknown`] carrying the raw
/// value so newer peers can add types without breaking older ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameType {
    /// `0x4B`, empty payload.
    StatusRequest,
    /// `0xB4`, `[mode, x, y]` payload.
    StatusResponse,
    /// `0x67`, empty payload; echoes the acknowledged sequence number.
    Ack,
    /// `0xAA`, `[start_angle, angular_step, distances...]` payload.
    LidarSend,
    Unknown(u8),
}

impl FrameType {
    /// The raw `TYPE` byte for this variant.
    pub const fn code(self) -> u8 {
        match self {
            FrameType::StatusRequest => 0x4B,
            FrameType::StatusResponse => 0xB4,
            FrameType::Ack => 0x67,
            FrameType::LidarSend => 0xAA,
            FrameType::Unknown(code) => code,
        }
    }

    /// Map a raw `TYPE` byte onto a variant.  Never fails.
    pub const fn from_code(code: u8) -> Self {
        match code {
            0x4B => FrameType::StatusRequest,
            0xB4 => FrameType::StatusResponse,
            0x67 => FrameType::Ack,
            0xAA => FrameType::LidarSend,
            other => FrameType::Unknown(other),
        }
    }
}

impl From<u8> for FrameType {
    fn from(code: u8) -> Self {
        Self::from_code(code)
    }
}

impl From<FrameType> for u8 {
    fn from(frame_type: FrameType) -> Self {
        frame_type.code()
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameType::StatusRequest => write!(f, "STATUS_REQUEST"),
            FrameType::StatusResponse => write!(f, "STATUS_RESPONSE"),
            FrameType::Ack => write!(f, "ACK"),
            FrameType::LidarSend => write!(f, "LIDAR_SEND"),
            FrameType::Unknown(code) => write!(f, "UNKNOWN_0x{code:02X}"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Frame
// ────────────────────────────────────────────────────────────────────────────

/// One validated protocol message.
///
/// The payload length is checked at construction, so a `Frame` always
/// encodes successfully and `len == payload.len()` holds by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    sequence: u8,
    frame_type: FrameType,
    payload: Vec<u8>,
    checksum: u8,
}

impl Frame {
    /// Build a frame, computing its checksum.
    ///
    /// # Errors
    ///
    /// Returns [`OgoaError::PayloadTooLarge`] when `payload` exceeds
    /// [`MAX_PAYLOAD`] bytes.
    pub fn new(
        sequence: u8,
        frame_type: FrameType,
        payload: impl Into<Vec<u8>>,
    ) -> Result<Self, OgoaError> {
        let payload = payload.into();
        if payload.len() > MAX_PAYLOAD {
            return Err(OgoaError::PayloadTooLarge {
                len: payload.len(),
                max: MAX_PAYLOAD,
            });
        }
        let mut frame = Self {
            sequence,
            frame_type,
            payload,
            checksum: 0,
        };
        frame.checksum = frame
            .payload
            .iter()
            .fold(checksum(&frame.header()), |acc, b| acc ^ b);
        Ok(frame)
    }

    /// Rebuild a frame from a buffer slice already validated by the decoder.
    pub(crate) fn from_validated(raw: &[u8]) -> Self {
        let len = raw[3] as usize;
        Self {
            sequence: raw[1],
            frame_type: FrameType::from_code(raw[2]),
            payload: raw[HEADER_BYTES..HEADER_BYTES + len].to_vec(),
            checksum: raw[HEADER_BYTES + len],
        }
    }

    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    pub fn frame_type(&self) -> FrameType {
        self.frame_type
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Value of the `LEN` byte.
    pub fn len(&self) -> u8 {
        self.payload.len() as u8
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    /// Total number of bytes on the wire (`5 + len`).
    pub fn wire_len(&self) -> usize {
        MIN_FRAME_BYTES + self.payload.len()
    }

    /// Serialise to wire bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.wire_len());
        out.extend_from_slice(&self.header());
        out.extend_from_slice(&self.payload);
        out.push(self.checksum);
        out
    }

    fn header(&self) -> [u8; HEADER_BYTES] {
        [
            START_BYTE,
            self.sequence,
            self.frame_type.code(),
            self.payload.len() as u8,
        ]
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Free functions
// ────────────────────────────────────────────────────────────────────────────

/// XOR fold of `bytes`.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc ^ b)
}

/// Encode `(sequence, type, payload)` straight to wire bytes.
///
/// # Errors
///
/// Returns [`OgoaError::PayloadTooLarge`] when `payload` exceeds
/// [`MAX_PAYLOAD`] bytes; nothing should be transmitted in that case.
pub fn encode_frame(
    sequence: u8,
    frame_type: FrameType,
    payload: &[u8],
) -> Result<Vec<u8>, OgoaError> {
    Frame::new(sequence, frame_type, payload).map(|f| f.to_bytes())
}

/// Upper-case, space-separated hex dump used in log lines.
pub fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

// ────────────────────────────────────────────────────────────────────────────
// SequenceCounter
// ────────────────────────────────────────────────────────────────────────────

/// Wrapping 8-bit counter handing out outbound sequence numbers.
#[derive(Debug, Clone, Default)]
pub struct SequenceCounter {
    next: u8,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the next sequence number and advance (255 wraps to 0).
    pub fn next_seq(&mut self) -> u8 {
        let seq = self.next;
        self.next = self.next.wrapping_add(1);
        seq
    }

    /// Peek at the value the next call to [`next_seq`][Self::next_seq] returns.
    pub fn peek(&self) -> u8 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_payload_is_251() {
        assert_eq!(MAX_PAYLOAD, 251);
        assert_eq!(MIN_FRAME_BYTES, 5);
    }

    #[test]
    fn encode_empty_status_request() {
        let bytes = encode_frame(0, FrameType::StatusRequest, &[]).unwrap();
        assert_eq!(bytes, vec![0x27, 0x00, 0x4B, 0x00, 0x27 ^ 0x4B]);
    }

    #[test]
    fn encode_appends_payload_and_xor_checksum() {
        let bytes = encode_frame(3, FrameType::StatusResponse, &[1, 42, 84]).unwrap();
        assert_eq!(&bytes[..7], &[0x27, 3, 0xB4, 3, 1, 42, 84]);
        let expected = 0x27 ^ 3 ^ 0xB4 ^ 3 ^ 1 ^ 42 ^ 84;
        assert_eq!(bytes[7], expected);
        assert_eq!(bytes.len(), 8);
    }

    #[test]
    fn encode_accepts_max_payload() {
        let payload = vec![0xAB; MAX_PAYLOAD];
        let bytes = encode_frame(1, FrameType::LidarSend, &payload).unwrap();
        assert_eq!(bytes.len(), FRAME_MAX_BYTES);
        assert_eq!(bytes[3], 251);
    }

    #[test]
    fn encode_rejects_oversized_payload() {
        let payload = vec![0u8; MAX_PAYLOAD + 1];
        let err = encode_frame(1, FrameType::LidarSend, &payload).unwrap_err();
        assert_eq!(err, OgoaError::PayloadTooLarge { len: 252, max: 251 });
    }

    #[test]
    fn checksum_of_frame_bytes_matches_trailer() {
        let frame = Frame::new(200, FrameType::Unknown(0x10), vec![9u8, 8, 7, 6]).unwrap();
        let bytes = frame.to_bytes();
        let (body, trailer) = bytes.split_at(bytes.len() - 1);
        assert_eq!(checksum(body), trailer[0]);
        assert_eq!(frame.checksum(), trailer[0]);
        assert_eq!(frame.wire_len(), 9);
        assert_eq!(frame.len(), 4);
    }

    #[test]
    fn frame_type_codes_round_trip_for_all_bytes() {
        for code in 0u8..=255 {
            assert_eq!(FrameType::from_code(code).code(), code);
        }
        assert_eq!(FrameType::from(0xAA), FrameType::LidarSend);
        assert_eq!(FrameType::from(0x01), FrameType::Unknown(0x01));
        assert_eq!(u8::from(FrameType::Ack), 0x67);
    }

    #[test]
    fn frame_type_display_names() {
        assert_eq!(FrameType::StatusRequest.to_string(), "STATUS_REQUEST");
        assert_eq!(FrameType::StatusResponse.to_string(), "STATUS_RESPONSE");
        assert_eq!(FrameType::Ack.to_string(), "ACK");
        assert_eq!(FrameType::LidarSend.to_string(), "LIDAR_SEND");
        assert_eq!(FrameType::Unknown(0x0F).to_string(), "UNKNOWN_0x0F");
    }

    #[test]
    fn hex_dump_formats_upper_case() {
        assert_eq!(hex_dump(&[0x27, 0x0a, 0xff]), "27 0A FF");
        assert_eq!(hex_dump(&[]), "");
    }

    #[test]
    fn sequence_counter_wraps() {
        let mut seq = SequenceCounter::new();
        for expected in 0u16..=255 {
            assert_eq!(seq.next_seq() as u16, expected);
        }
        assert_eq!(seq.peek(), 0);
        assert_eq!(seq.next_seq(), 0);
    }
}
