use crate::model::{DelayCalcTrackData, TrackData};
use crate::ports::{DelayDataReceiver, TrackDataIncomingPort};
use crate::prelude::{Clock, SystemClock, TrackError, TrackResult};
use crate::telemetry::log::LogManager;

/// Builds the relay's delay record from an inbound telemetry record.
///
/// `second_hop_sent_time` is raised to `first_hop_sent_time` when the clock
/// stepped backwards between the two reads.
pub fn stamp_first_hop(
    track: &TrackData,
    first_hop_sent_time: i64,
    second_hop_sent_time: i64,
) -> DelayCalcTrackData {
    let mut track = track.clone();
    track.first_hop_sent_time = first_hop_sent_time;
    let first_hop_delay_time = first_hop_sent_time.saturating_sub(track.original_update_time);
    DelayCalcTrackData::new(
        track,
        first_hop_delay_time,
        second_hop_sent_time.max(first_hop_sent_time),
    )
}

/// Second hop: measures hop-1 latency, re-stamps and forwards.
pub struct RelayService<R, C = SystemClock> {
    receiver: R,
    clock: C,
    logger: LogManager,
}

impl<R: DelayDataReceiver> RelayService<R> {
    pub fn new(receiver: R) -> Self {
        Self::with_clock(receiver, SystemClock)
    }
}

impl<R: DelayDataReceiver, C: Clock> RelayService<R, C> {
    pub fn with_clock(receiver: R, clock: C) -> Self {
        Self {
            receiver,
            clock,
            logger: LogManager::new("relay"),
        }
    }

    pub fn receiver(&self) -> &R {
        &self.receiver
    }

    pub fn into_receiver(self) -> R {
        self.receiver
    }
}

impl<R: DelayDataReceiver, C: Clock> TrackDataIncomingPort for RelayService<R, C> {
    fn process_and_forward(&mut self, data: &TrackData) -> TrackResult<()> {
        data.validate().map_err(|violation| TrackError::InvalidRecord {
            track_id: data.track_id,
            violation,
        })?;

        let first_hop_sent_time = self.clock.now_micros();
        let second_hop_sent_time = self.clock.now_micros();
        let record = stamp_first_hop(data, first_hop_sent_time, second_hop_sent_time);

        self.logger.record_relayed(&record);
        self.receiver.on_data_received(&record)
    }
}
