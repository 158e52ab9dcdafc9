//! Typed views of the frame payloads the harness produces and consumes.

use ogoa_types::OgoaError;

use crate::frame::MAX_PAYLOAD;

/// Bytes of `[start_angle, angular_step]` ahead of the distances.
pub const LIDAR_HEADER_BYTES: usize = 2;
/// Little-endian `u16` per distance sample.
pub const BYTES_PER_SAMPLE: usize = 2;
/// Most samples one `LidarSend` payload could carry: `(251 - 2) / 2`.
pub const MAX_SAMPLES_PER_FRAME: usize = (MAX_PAYLOAD - LIDAR_HEADER_BYTES) / BYTES_PER_SAMPLE;

/// `StatusResponse` payload: `[mode, x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport {
    pub mode: u8,
    pub x: u8,
    pub y: u8,
}

impl StatusReport {
    /// Fixed report the harness answers every status request with.
    pub const DEMO: Self = Self {
        mode: 1,
        x: 42,
        y: 84,
    };

    pub fn encode(&self) -> [u8; 3] {
        [self.mode, self.x, self.y]
    }

    /// # Errors
    ///
    /// Returns [`OgoaError::InvalidPayload`] unless `payload` is exactly
    /// three bytes long.
    pub fn decode(payload: &[u8]) -> Result<Self, OgoaError> {
        match payload {
            [mode, x, y] => Ok(Self {
                mode: *mode,
                x: *x,
                y: *y,
            }),
            _ => Err(OgoaError::InvalidPayload(format!(
                "status report needs 3 bytes, got {}",
                payload.len()
            ))),
        }
    }
}

/// `LidarSend` payload: one contiguous batch of range samples.
///
/// Sample `i` belongs to angle `(start_angle + i * angular_step) mod 360`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LidarScanChunk {
    /// Low byte of the first angle in the batch.
    pub start_angle: u8,
    pub angular_step: u8,
    /// Distances in millimetres.
    pub distances: Vec<u16>,
}

impl LidarScanChunk {
    pub fn encode(&self) -> Vec<u8> {
        let mut out =
            Vec::with_capacity(LIDAR_HEADER_BYTES + self.distances.len() * BYTES_PER_SAMPLE);
        out.push(self.start_angle);
        out.push(self.angular_step);
        for d in &self.distances {
            out.extend_from_slice(&d.to_le_bytes());
        }
        out
    }

    /// # Errors
    ///
    /// Returns [`OgoaError::InvalidPayload`] when the 2-byte header is missing
    /// or the sample section has an odd number of bytes.
    pub fn decode(payload: &[u8]) -> Result<Self, OgoaError> {
        if payload.len() < LIDAR_HEADER_BYTES {
            return Err(OgoaError::InvalidPayload(format!(
                "lidar payload needs a {LIDAR_HEADER_BYTES}-byte header, got {} bytes",
                payload.len()
            )));
        }
        let body = &payload[LIDAR_HEADER_BYTES..];
        if body.len() % BYTES_PER_SAMPLE != 0 {
            return Err(OgoaError::InvalidPayload(format!(
                "lidar sample section has odd length {}",
                body.len()
            )));
        }
        Ok(Self {
            start_angle: payload[0],
            angular_step: payload[1],
            distances: body
                .chunks_exact(BYTES_PER_SAMPLE)
                .map(|c| u16::from_le_bytes([c[0], c[1]]))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_report_demo_bytes() {
        assert_eq!(StatusReport::DEMO.encode(), [1, 42, 84]);
        assert_eq!(StatusReport::decode(&[1, 42, 84]).unwrap(), StatusReport::DEMO);
    }

    #[test]
    fn status_report_rejects_wrong_length() {
        assert!(matches!(
            StatusReport::decode(&[1, 2]),
            Err(OgoaError::InvalidPayload(_))
        ));
    }

    #[test]
    fn lidar_chunk_layout_is_header_then_little_endian() {
        let chunk = LidarScanChunk {
            start_angle: 181,
            angular_step: 2,
            distances: vec![4095, 120, 0x0102],
        };
        assert_eq!(
            chunk.encode(),
            vec![181, 2, 0xFF, 0x0F, 120, 0x00, 0x02, 0x01]
        );
        assert_eq!(LidarScanChunk::decode(&chunk.encode()).unwrap(), chunk);
    }

    #[test]
    fn lidar_chunk_rejects_malformed_payloads() {
        assert!(LidarScanChunk::decode(&[0]).is_err());
        assert!(LidarScanChunk::decode(&[0, 2, 0x10]).is_err());
        let empty = LidarScanChunk::decode(&[10, 3]).unwrap();
        assert!(empty.distances.is_empty());
    }

    #[test]
    fn max_samples_fit_in_one_frame() {
        assert_eq!(MAX_SAMPLES_PER_FRAME, 124);
        assert!(LIDAR_HEADER_BYTES + MAX_SAMPLES_PER_FRAME * BYTES_PER_SAMPLE <= MAX_PAYLOAD);
    }
}
