use serde::{Deserialize, Serialize};

use crate::math::kinematics::KinematicsHelper;
use crate::model::TrackData;
use crate::ports::{TrackDataIncomingPort, TrackDataSender};
use crate::prelude::{Clock, SystemClock, TrackError, TrackResult};
use crate::telemetry::log::LogManager;

/// Output cadence of the source hop. Defaults to 25 samples at 200 Hz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtrapolationConfig {
    pub samples: usize,
    pub interval_us: i64,
}

impl Default for ExtrapolationConfig {
    fn default() -> Self {
        Self {
            samples: 25,
            interval_us: 5_000,
        }
    }
}

/// Constant-velocity samples of `track` spaced `interval_us` apart.
///
/// `update_time` advances from `original_update_time`; `first_hop_sent_time`
/// is left for the sender to stamp.
pub fn extrapolate(track: &TrackData, config: &ExtrapolationConfig) -> Vec<TrackData> {
    (0..config.samples)
        .map(|index| {
            let offset_us = (index as i64).saturating_mul(config.interval_us);
            let seconds = offset_us as f64 / 1_000_000.0;
            TrackData {
                track_id: track.track_id,
                position: KinematicsHelper::propagate(&track.position, &track.velocity, seconds),
                velocity: track.velocity,
                update_time: track.original_update_time.saturating_add(offset_us),
                original_update_time: track.original_update_time,
                first_hop_sent_time: 0,
            }
        })
        .collect()
}

/// First hop: fans a track update out into timed samples and emits each one.
pub struct TrackExtrapolator<S, C = SystemClock> {
    sender: S,
    clock: C,
    config: ExtrapolationConfig,
    logger: LogManager,
}

impl<S: TrackDataSender> TrackExtrapolator<S> {
    pub fn new(sender: S, config: ExtrapolationConfig) -> Self {
        Self::with_clock(sender, config, SystemClock)
    }
}

impl<S: TrackDataSender, C: Clock> TrackExtrapolator<S, C> {
    pub fn with_clock(sender: S, config: ExtrapolationConfig, clock: C) -> Self {
        Self {
            sender,
            clock,
            config,
            logger: LogManager::new("source"),
        }
    }

    pub fn sender(&self) -> &S {
        &self.sender
    }

    pub fn into_sender(self) -> S {
        self.sender
    }
}

impl<S: TrackDataSender, C: Clock> TrackDataIncomingPort for TrackExtrapolator<S, C> {
    fn process_and_forward(&mut self, data: &TrackData) -> TrackResult<()> {
        data.validate().map_err(|violation| TrackError::InvalidRecord {
            track_id: data.track_id,
            violation,
        })?;

        let samples = extrapolate(data, &self.config);
        self.logger.record_extrapolated(data.track_id, samples.len());
        for mut sample in samples {
            sample.first_hop_sent_time = self.clock.now_micros();
            self.sender.send_track(&sample)?;
        }
        Ok(())
    }
}
