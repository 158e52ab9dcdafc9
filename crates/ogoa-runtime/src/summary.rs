//! Run counters and the end-of-run report.

use chrono::{DateTime, Utc};
use ogoa_types::OgoaError;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Link-level counters accumulated over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStats {
    pub frames_sent: u64,
    pub status_requests_sent: u64,
    pub status_responses_sent: u64,
    pub acks_sent: u64,
    pub lidar_frames_sent: u64,
    pub bytes_sent: u64,

    pub frames_received: u64,
    pub bytes_received: u64,
    pub checksum_errors: u64,
    pub discarded_bytes: u64,
    pub duplicates: u64,

    /// Our frames the device acknowledged in time.
    pub acknowledged: u64,
    /// Our frames whose ACK never arrived within the timeout.
    pub unacknowledged: u64,
    /// ACKs for sequence numbers we were not waiting on.
    pub unsolicited_acks: u64,

    pub sweeps: u64,
    pub encode_errors: u64,
    pub transport_errors: u64,
}

/// Everything worth keeping about one finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub port: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_secs: f64,
    pub stats: LinkStats,
}

impl RunSummary {
    pub fn new(
        run_id: Uuid,
        port: impl Into<String>,
        started_at: DateTime<Utc>,
        elapsed_secs: f64,
        stats: LinkStats,
    ) -> Self {
        Self {
            run_id,
            port: port.into(),
            started_at,
            elapsed_secs,
            stats,
        }
    }

    /// Fraction of tracked frames that were acknowledged, if any were.
    pub fn ack_ratio(&self) -> Option<f64> {
        let total = self.stats.acknowledged + self.stats.unacknowledged;
        (total > 0).then(|| self.stats.acknowledged as f64 / total as f64)
    }

    pub fn to_json(&self) -> Result<String, OgoaError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| OgoaError::InvalidPayload(format!("summary serialisation: {e}")))
    }

    pub fn log(&self) {
        let s = &self.stats;
        info!(
            run_id = %self.run_id,
            port = %self.port,
            elapsed_secs = self.elapsed_secs,
            sent = s.frames_sent,
            received = s.frames_received,
            sweeps = s.sweeps,
            checksum_errors = s.checksum_errors,
            duplicates = s.duplicates,
            acknowledged = s.acknowledged,
            unacknowledged = s.unacknowledged,
            transport_errors = s.transport_errors,
            "run finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(stats: LinkStats) -> RunSummary {
        RunSummary::new(Uuid::new_v4(), "/dev/ttyACM0", Utc::now(), 8.0, stats)
    }

    #[test]
    fn ack_ratio_none_without_tracked_frames() {
        assert!(summary(LinkStats::default()).ack_ratio().is_none());
    }

    #[test]
    fn ack_ratio_counts_acked_over_tracked() {
        let stats = LinkStats {
            acknowledged: 3,
            unacknowledged: 1,
            ..LinkStats::default()
        };
        let r = summary(stats).ack_ratio().unwrap();
        assert!((r - 0.75).abs() < 1e-12);
    }

    #[test]
    fn json_roundtrip() {
        let stats = LinkStats {
            frames_sent: 12,
            sweeps: 2,
            ..LinkStats::default()
        };
        let s = summary(stats);
        let json = s.to_json().unwrap();
        assert!(json.contains("\"frames_sent\": 12"));
        let back: RunSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
