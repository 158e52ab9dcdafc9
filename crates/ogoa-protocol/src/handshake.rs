//! Acknowledgement bookkeeping for one end of the link.
//!
//! The peer acknowledges every non-Ack frame by echoing its sequence number
//! in an Ack frame, and retransmits a frame when our Ack goes missing.
//! [`AckTracker`] records which of our frames are still waiting for their
//! Ack; [`DuplicateFilter`] spots the peer's retransmissions.
//!
//! All timestamps are monotonic offsets from the start of the run.

use std::time::Duration;

use crate::frame::{ACK_TIMEOUT, Frame, FrameType};

/// An outbound frame that has not been acknowledged yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAck {
    pub sequence: u8,
    pub frame_type: FrameType,
    pub sent_at: Duration,
}

/// Tracks outbound frames awaiting an Ack.
#[derive(Debug)]
pub struct AckTracker {
    timeout: Duration,
    pending: Vec<PendingAck>,
    acknowledged: u64,
    expired: u64,
}

impl Default for AckTracker {
    fn default() -> Self {
        Self::new(ACK_TIMEOUT)
    }
}

impl AckTracker {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            pending: Vec::new(),
            acknowledged: 0,
            expired: 0,
        }
    }

    /// Record that a frame was just sent.  Acks are never tracked.
    ///
    /// Re-tracking a sequence number that is still pending (after the 8-bit
    /// counter wrapped) replaces the older entry.
    pub fn track(&mut self, sequence: u8, frame_type: FrameType, now: Duration) {
        if frame_type == FrameType::Ack {
            return;
        }
        self.pending.retain(|p| p.sequence != sequence);
        self.pending.push(PendingAck {
            sequence,
            frame_type,
            sent_at: now,
        });
    }

    /// Clear the pending entry matching an inbound Ack.
    ///
    /// Returns the matched entry, or `None` for an Ack nobody was waiting
    /// for (late, duplicated, or for a frame that already expired).
    pub fn acknowledge(&mut self, sequence: u8) -> Option<PendingAck> {
        let idx = self.pending.iter().position(|p| p.sequence == sequence)?;
        self.acknowledged += 1;
        Some(self.pending.remove(idx))
    }

    /// Remove and return every entry older than the ack timeout.
    pub fn expire(&mut self, now: Duration) -> Vec<PendingAck> {
        let timeout = self.timeout;
        let (expired, kept): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|p| now.saturating_sub(p.sent_at) >= timeout);
        self.pending = kept;
        self.expired += expired.len() as u64;
        expired
    }

    pub fn pending(&self) -> &[PendingAck] {
        &self.pending
    }

    pub fn acknowledged(&self) -> u64 {
        self.acknowledged
    }

    pub fn expired(&self) -> u64 {
        self.expired
    }
}

/// Detects back-to-back retransmissions of the same non-Ack frame.
#[derive(Debug, Default)]
pub struct DuplicateFilter {
    last: Option<Fingerprint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    sequence: u8,
    frame_type: FrameType,
    len: u8,
    xor: u8,
}

impl Fingerprint {
    fn of(frame: &Frame) -> Self {
        let xor = frame
            .payload()
            .iter()
            .fold(frame.sequence() ^ frame.frame_type().code() ^ frame.len(), |acc, b| {
                acc ^ b
            });
        Self {
            sequence: frame.sequence(),
            frame_type: frame.frame_type(),
            len: frame.len(),
            xor,
        }
    }
}

impl DuplicateFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when `frame` repeats the previous non-Ack frame.
    /// Ack frames are ignored and never reported as duplicates.
    pub fn observe(&mut self, frame: &Frame) -> bool {
        if frame.frame_type() == FrameType::Ack {
            return false;
        }
        let fp = Fingerprint::of(frame);
        let duplicate = self.last == Some(fp);
        self.last = Some(fp);
        duplicate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn ack_clears_pending_entry() {
        let mut tracker = AckTracker::default();
        tracker.track(4, FrameType::StatusRequest, ms(0));
        tracker.track(5, FrameType::LidarSend, ms(1));

        let hit = tracker.acknowledge(4).expect("seq 4 pending");
        assert_eq!(hit.frame_type, FrameType::StatusRequest);
        assert_eq!(tracker.pending().len(), 1);
        assert_eq!(tracker.acknowledged(), 1);
        assert!(tracker.acknowledge(4).is_none());
    }

    #[test]
    fn acks_are_not_tracked() {
        let mut tracker = AckTracker::default();
        tracker.track(1, FrameType::Ack, ms(0));
        assert!(tracker.pending().is_empty());
    }

    #[test]
    fn entries_expire_after_timeout() {
        let mut tracker = AckTracker::new(ms(100));
        tracker.track(1, FrameType::StatusRequest, ms(0));
        tracker.track(2, FrameType::StatusResponse, ms(50));

        assert!(tracker.expire(ms(99)).is_empty());
        let expired = tracker.expire(ms(100));
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].sequence, 1);
        assert_eq!(tracker.pending().len(), 1);
        assert_eq!(tracker.expired(), 1);

        assert_eq!(tracker.expire(ms(200)).len(), 1);
        assert!(tracker.pending().is_empty());
        assert_eq!(tracker.expired(), 2);
    }

    #[test]
    fn retracking_same_sequence_replaces_entry() {
        let mut tracker = AckTracker::default();
        tracker.track(9, FrameType::StatusRequest, ms(0));
        tracker.track(9, FrameType::LidarSend, ms(10));
        assert_eq!(tracker.pending().len(), 1);
        assert_eq!(tracker.pending()[0].frame_type, FrameType::LidarSend);
    }

    #[test]
    fn duplicate_filter_flags_identical_repeat() {
        let mut filter = DuplicateFilter::new();
        let frame = Frame::new(3, FrameType::StatusResponse, vec![1u8, 2, 3]).unwrap();
        assert!(!filter.observe(&frame));
        assert!(filter.observe(&frame));
    }

    #[test]
    fn duplicate_filter_distinguishes_payload_and_sequence() {
        let mut filter = DuplicateFilter::new();
        let a = Frame::new(3, FrameType::StatusResponse, vec![1u8, 2, 3]).unwrap();
        let b = Frame::new(3, FrameType::StatusResponse, vec![1u8, 2, 4]).unwrap();
        let c = Frame::new(4, FrameType::StatusResponse, vec![1u8, 2, 4]).unwrap();
        assert!(!filter.observe(&a));
        assert!(!filter.observe(&b));
        assert!(!filter.observe(&c));
    }

    #[test]
    fn duplicate_filter_ignores_acks() {
        let mut filter = DuplicateFilter::new();
        let req = Frame::new(1, FrameType::StatusRequest, Vec::<u8>::new()).unwrap();
        let ack = Frame::new(7, FrameType::Ack, Vec::<u8>::new()).unwrap();
        assert!(!filter.observe(&req));
        assert!(!filter.observe(&ack));
        assert!(!filter.observe(&ack));
        // An interleaved Ack does not reset the remembered frame.
        assert!(filter.observe(&req));
    }
}
