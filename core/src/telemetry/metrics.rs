use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::model::{FinalCalcTrackData, PerformanceStatus};

/// Running min/max/mean over one delay measurement, in microseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DelaySummary {
    pub count: u64,
    pub min: i64,
    pub max: i64,
    pub mean: f64,
}

/// Number of final records graded into each performance band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub excellent: u64,
    pub good: u64,
    pub acceptable: u64,
    pub poor: u64,
    pub critical: u64,
}

impl StatusCounts {
    fn bump(&mut self, status: PerformanceStatus) {
        let slot = match status {
            PerformanceStatus::Excellent => &mut self.excellent,
            PerformanceStatus::Good => &mut self.good,
            PerformanceStatus::Acceptable => &mut self.acceptable,
            PerformanceStatus::Poor => &mut self.poor,
            PerformanceStatus::Critical => &mut self.critical,
        };
        *slot += 1;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencySnapshot {
    pub processed: u64,
    pub rejected: u64,
    pub first_hop: DelaySummary,
    pub second_hop: DelaySummary,
    pub total: DelaySummary,
    pub status: StatusCounts,
    pub last_track_id: Option<i32>,
}

#[derive(Default)]
struct Accumulator {
    count: u64,
    sum: i128,
    min: i64,
    max: i64,
}

impl Accumulator {
    fn push(&mut self, value: i64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += i128::from(value);
    }

    fn summary(&self) -> DelaySummary {
        let mean = if self.count == 0 {
            0.0
        } else {
            self.sum as f64 / self.count as f64
        };
        DelaySummary {
            count: self.count,
            min: self.min,
            max: self.max,
            mean,
        }
    }
}

#[derive(Default)]
struct Metrics {
    processed: u64,
    rejected: u64,
    first_hop: Accumulator,
    second_hop: Accumulator,
    total: Accumulator,
    status: StatusCounts,
    last_track_id: Option<i32>,
}

/// Thread-safe latency statistics for records seen by a terminal consumer.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_final(&self, record: &FinalCalcTrackData) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.processed += 1;
            metrics.first_hop.push(record.delay.first_hop_delay_time);
            metrics.second_hop.push(record.second_hop_delay());
            metrics.total.push(record.total_delay_time);
            metrics.status.bump(record.performance_status());
            metrics.last_track_id = Some(record.track_id());
        }
    }

    pub fn record_rejected(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.rejected += 1;
        }
    }

    pub fn snapshot(&self) -> LatencySnapshot {
        if let Ok(metrics) = self.inner.lock() {
            LatencySnapshot {
                processed: metrics.processed,
                rejected: metrics.rejected,
                first_hop: metrics.first_hop.summary(),
                second_hop: metrics.second_hop.summary(),
                total: metrics.total.summary(),
                status: metrics.status,
                last_track_id: metrics.last_track_id,
            }
        } else {
            LatencySnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DelayCalcTrackData, EcefVector, TrackData};

    fn final_record(track_id: i32, total: i64) -> FinalCalcTrackData {
        let mut track = TrackData::new(track_id, EcefVector::default(), EcefVector::default())
            .with_times(1_000, 1_000);
        track.first_hop_sent_time = 1_400;
        let delay = DelayCalcTrackData::new(track, 400, 1_500);
        FinalCalcTrackData::from_delay(delay, 1_000 + total)
    }

    #[test]
    fn empty_recorder_reports_zeroes() {
        let snapshot = MetricsRecorder::new().snapshot();
        assert_eq!(snapshot, LatencySnapshot::default());
    }

    #[test]
    fn summaries_track_min_max_mean() {
        let recorder = MetricsRecorder::new();
        recorder.record_final(&final_record(1, 600));
        recorder.record_final(&final_record(2, 1_000));
        recorder.record_rejected();

        let snapshot = recorder.snapshot();
        assert_eq!(snapshot.processed, 2);
        assert_eq!(snapshot.rejected, 1);
        assert_eq!(snapshot.total.min, 600);
        assert_eq!(snapshot.total.max, 1_000);
        assert_eq!(snapshot.total.mean, 800.0);
        assert_eq!(snapshot.second_hop.mean, 100.0);
        assert_eq!(snapshot.last_track_id, Some(2));
        assert_eq!(snapshot.status.excellent, 2);
    }

    #[test]
    fn records_are_counted_per_status_band() {
        let recorder = MetricsRecorder::new();
        for total in [50_000, 100_000, 700_000, 1_000_000, 4_000_000, 6_000_000] {
            recorder.record_final(&final_record(1, total));
        }
        assert_eq!(
            recorder.snapshot().status,
            StatusCounts {
                excellent: 1,
                good: 1,
                acceptable: 1,
                poor: 2,
                critical: 1,
            }
        );
    }
}
