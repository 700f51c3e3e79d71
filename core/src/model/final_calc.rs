use serde::{Deserialize, Serialize};

use super::delay::DelayCalcTrackData;

/// Grade of an end-to-end latency, upper bounds exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceStatus {
    /// Under 100 ms.
    Excellent,
    /// 100 ms to 500 ms.
    Good,
    /// 500 ms to 1 s.
    Acceptable,
    /// 1 s to 5 s.
    Poor,
    /// 5 s and above.
    Critical,
}

impl PerformanceStatus {
    pub const GOOD_FROM_US: i64 = 100_000;
    pub const ACCEPTABLE_FROM_US: i64 = 500_000;
    pub const POOR_FROM_US: i64 = 1_000_000;
    pub const CRITICAL_FROM_US: i64 = 5_000_000;

    pub fn classify(total_delay_us: i64) -> Self {
        if total_delay_us < Self::GOOD_FROM_US {
            PerformanceStatus::Excellent
        } else if total_delay_us < Self::ACCEPTABLE_FROM_US {
            PerformanceStatus::Good
        } else if total_delay_us < Self::POOR_FROM_US {
            PerformanceStatus::Acceptable
        } else if total_delay_us < Self::CRITICAL_FROM_US {
            PerformanceStatus::Poor
        } else {
            PerformanceStatus::Critical
        }
    }

    /// Poor and critical records are worth an operator's attention.
    pub fn is_degraded(self) -> bool {
        matches!(self, PerformanceStatus::Poor | PerformanceStatus::Critical)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PerformanceStatus::Excellent => "excellent",
            PerformanceStatus::Good => "good",
            PerformanceStatus::Acceptable => "acceptable",
            PerformanceStatus::Poor => "poor",
            PerformanceStatus::Critical => "critical",
        }
    }
}

/// Record produced by the final hop, carrying every timestamp of the trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalCalcTrackData {
    #[serde(flatten)]
    pub delay: DelayCalcTrackData,
    pub third_hop_sent_time: i64,
    /// End-to-end latency, `third_hop_sent_time - original_update_time`.
    pub total_delay_time: i64,
}

impl FinalCalcTrackData {
    /// Stamps `third_hop_sent_time` onto a copy of `delay` and derives the total.
    pub fn from_delay(delay: DelayCalcTrackData, third_hop_sent_time: i64) -> Self {
        let total_delay_time =
            third_hop_sent_time.saturating_sub(delay.track.original_update_time);
        Self {
            delay,
            third_hop_sent_time,
            total_delay_time,
        }
    }

    pub fn track_id(&self) -> i32 {
        self.delay.track.track_id
    }

    pub fn performance_status(&self) -> PerformanceStatus {
        PerformanceStatus::classify(self.total_delay_time)
    }

    pub fn is_high_velocity(&self, threshold_mps: f64) -> bool {
        self.delay.is_high_velocity(threshold_mps)
    }

    /// Relay to final hop (B to C) latency.
    pub fn second_hop_delay(&self) -> i64 {
        self.delay
            .second_hop_sent_time
            .saturating_sub(self.delay.track.first_hop_sent_time)
    }

    pub fn third_hop_delay(&self) -> i64 {
        self.third_hop_sent_time
            .saturating_sub(self.delay.second_hop_sent_time)
    }

    /// True when every hop timestamp is no earlier than the one before it.
    pub fn is_monotonic(&self) -> bool {
        let track = &self.delay.track;
        self.third_hop_sent_time >= self.delay.second_hop_sent_time
            && self.delay.second_hop_sent_time >= track.first_hop_sent_time
            && track.first_hop_sent_time >= track.original_update_time
    }
}
