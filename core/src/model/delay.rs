use serde::{Deserialize, Serialize};

use super::track::{TrackData, Violation};
use crate::math::kinematics::KinematicsHelper;

/// Telemetry record annotated by the relay hop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayCalcTrackData {
    #[serde(flatten)]
    pub track: TrackData,
    /// Reported hop-1 latency, `first_hop_sent_time - original_update_time`.
    pub first_hop_delay_time: i64,
    /// Time at which the relay re-emitted the record.
    pub second_hop_sent_time: i64,
}

impl DelayCalcTrackData {
    pub fn new(track: TrackData, first_hop_delay_time: i64, second_hop_sent_time: i64) -> Self {
        Self {
            track,
            first_hop_delay_time,
            second_hop_sent_time,
        }
    }

    pub fn track_id(&self) -> i32 {
        self.track.track_id
    }

    pub fn validate(&self) -> Result<(), Violation> {
        self.track.validate()
    }

    pub fn is_valid(&self) -> bool {
        self.track.is_valid()
    }

    /// Microseconds elapsed between the last track update and `now`.
    pub fn data_age(&self, now: i64) -> i64 {
        now.saturating_sub(self.track.update_time)
    }

    pub fn is_fresh(&self, now: i64, threshold_us: i64) -> bool {
        self.data_age(now) <= threshold_us
    }

    /// True when the velocity magnitude is strictly above `threshold_mps`.
    pub fn is_high_velocity(&self, threshold_mps: f64) -> bool {
        KinematicsHelper::magnitude(&self.track.velocity) > threshold_mps
    }
}
