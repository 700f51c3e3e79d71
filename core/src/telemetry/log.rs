use log::{debug, info, warn};

use crate::model::{DelayCalcTrackData, FinalCalcTrackData};
use crate::prelude::TrackError;

/// Per-hop log formatting, tagged with the stage that owns it.
pub struct LogManager {
    stage: &'static str,
}

impl LogManager {
    pub fn new(stage: &'static str) -> Self {
        Self { stage }
    }

    pub fn record(&self, message: &str) {
        info!("[{}] {}", self.stage, message);
    }

    pub fn record_extrapolated(&self, track_id: i32, samples: usize) {
        debug!(
            "[{}] track {} extrapolated into {} samples",
            self.stage, track_id, samples
        );
    }

    pub fn record_relayed(&self, record: &DelayCalcTrackData) {
        info!(
            "[{}] track {} first hop {}us, re-emitted at {}",
            self.stage,
            record.track_id(),
            record.first_hop_delay_time,
            record.second_hop_sent_time
        );
    }

    pub fn record_final(&self, record: &FinalCalcTrackData) {
        info!(
            "[{}] track {} first hop {}us, B->C {}us, total {}us",
            self.stage,
            record.track_id(),
            record.delay.first_hop_delay_time,
            record.second_hop_delay(),
            record.total_delay_time
        );
        let status = record.performance_status();
        if status.is_degraded() {
            warn!(
                "[{}] track {} latency {} ({}us end to end)",
                self.stage,
                record.track_id(),
                status.as_str(),
                record.total_delay_time
            );
        }
        if !record.is_monotonic() {
            warn!(
                "[{}] track {} hop timestamps out of order, check clock sync",
                self.stage,
                record.track_id()
            );
        }
    }

    pub fn record_stale(&self, record: &DelayCalcTrackData, age_us: i64, limit_us: i64) {
        warn!(
            "[{}] track {} is stale: {}us since update, limit {}us",
            self.stage,
            record.track_id(),
            age_us,
            limit_us
        );
    }

    pub fn record_high_velocity(&self, record: &DelayCalcTrackData, threshold_mps: f64) {
        info!(
            "[{}] track {} above {} m/s",
            self.stage,
            record.track_id(),
            threshold_mps
        );
    }

    pub fn record_rejection(&self, error: &TrackError) {
        warn!("[{}] {}", self.stage, error);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new("node")
    }
}
