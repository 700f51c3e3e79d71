use serde::{Deserialize, Serialize};

use crate::model::{DelayCalcTrackData, FinalCalcTrackData};
use crate::ports::{DelayDataReceiver, FinalDataSender};
use crate::prelude::{Clock, SystemClock, TrackError, TrackResult};
use crate::telemetry::log::LogManager;

/// Thresholds the final hop flags records against. Neither one drops a record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinalCalcConfig {
    /// Largest accepted gap between `update_time` and arrival, in microseconds.
    pub max_data_age_us: i64,
    pub high_velocity_mps: f64,
}

impl Default for FinalCalcConfig {
    fn default() -> Self {
        Self {
            max_data_age_us: 5_000_000,
            high_velocity_mps: 100.0,
        }
    }
}

/// Copies `input` unchanged and adds the third-hop stamp and end-to-end total.
pub fn calculate_final_delay(
    input: &DelayCalcTrackData,
    third_hop_sent_time: i64,
) -> FinalCalcTrackData {
    FinalCalcTrackData::from_delay(input.clone(), third_hop_sent_time)
}

/// Third hop: stamps arrival, totals the trip and dispatches through its sender.
pub struct FinalCalculatorService<S, C = SystemClock> {
    sender: S,
    clock: C,
    config: FinalCalcConfig,
    logger: LogManager,
    stale: u64,
    high_velocity: u64,
}

impl<S: FinalDataSender> FinalCalculatorService<S> {
    pub fn new(sender: S) -> Self {
        Self::with_clock(sender, SystemClock)
    }
}

impl<S: FinalDataSender, C: Clock> FinalCalculatorService<S, C> {
    /// The third-hop stamp is never earlier than the inbound
    /// `second_hop_sent_time`, so a clock that steps backwards between hops
    /// yields a zero third-hop delay rather than a negative one.
    pub fn with_clock(sender: S, clock: C) -> Self {
        Self {
            sender,
            clock,
            config: FinalCalcConfig::default(),
            logger: LogManager::new("final"),
            stale: 0,
            high_velocity: 0,
        }
    }

    pub fn with_config(mut self, config: FinalCalcConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &FinalCalcConfig {
        &self.config
    }

    /// Records that arrived older than `max_data_age_us`.
    pub fn stale_records(&self) -> u64 {
        self.stale
    }

    pub fn high_velocity_records(&self) -> u64 {
        self.high_velocity
    }

    pub fn sender(&self) -> &S {
        &self.sender
    }

    pub fn into_sender(self) -> S {
        self.sender
    }

    fn flag(&mut self, data: &DelayCalcTrackData, now: i64) {
        let limit = self.config.max_data_age_us;
        if !data.is_fresh(now, limit) {
            self.stale += 1;
            self.logger.record_stale(data, data.data_age(now), limit);
        }
        if data.is_high_velocity(self.config.high_velocity_mps) {
            self.high_velocity += 1;
            self.logger.record_high_velocity(data, self.config.high_velocity_mps);
        }
    }
}

impl<S: FinalDataSender, C: Clock> DelayDataReceiver for FinalCalculatorService<S, C> {
    fn on_data_received(&mut self, data: &DelayCalcTrackData) -> TrackResult<()> {
        data.validate().map_err(|violation| TrackError::InvalidRecord {
            track_id: data.track_id(),
            violation,
        })?;

        let now = self.clock.now_micros();
        self.flag(data, now);
        let record = calculate_final_delay(data, now.max(data.second_hop_sent_time));

        self.logger.record_final(&record);
        self.sender.send_data(&record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EcefVector, TrackData};
    use crate::ports::test_support::Recording;
    use crate::prelude::test_support::StepClock;

    const T: i64 = 1_700_000_000_000_000;

    fn delay_record() -> DelayCalcTrackData {
        let mut track = TrackData::new(
            1234,
            EcefVector::new(1000.0, 2000.0, 3000.0),
            EcefVector::new(100.0, 200.0, 300.0),
        )
        .with_times(T - 10_000, T - 8_000);
        track.first_hop_sent_time = T - 5_000;
        DelayCalcTrackData::new(track, 3_000, T - 2_000)
    }

    #[test]
    fn transform_copies_inherited_fields() {
        let input = delay_record();
        let output = calculate_final_delay(&input, T);

        assert_eq!(output.delay, input);
        assert_eq!(output.delay.track.position.x.to_bits(), 1000.0f64.to_bits());
        assert_eq!(output.third_hop_sent_time, T);
        assert_eq!(output.total_delay_time, 10_000);
    }

    #[test]
    fn transform_is_deterministic() {
        let input = delay_record();
        assert_eq!(
            calculate_final_delay(&input, T + 5),
            calculate_final_delay(&input, T + 5)
        );
    }

    #[test]
    fn end_to_end_example_satisfies_ordering() {
        let mut service = FinalCalculatorService::with_clock(
            Recording::<FinalCalcTrackData>::default(),
            StepClock::starting_at(T, 1),
        );
        service.on_data_received(&delay_record()).unwrap();

        let sent = service.into_sender().records;
        assert_eq!(sent.len(), 1);
        let output = &sent[0];
        assert_eq!(output.track_id(), 1234);
        assert!(output.total_delay_time > 0);
        assert!(output.delay.second_hop_sent_time > output.delay.track.first_hop_sent_time);
        assert!(output.third_hop_sent_time > output.delay.second_hop_sent_time);
        assert_eq!(
            output.total_delay_time,
            output.third_hop_sent_time - output.delay.track.original_update_time
        );
    }

    #[test]
    fn each_call_dispatches_once() {
        let mut service = FinalCalculatorService::with_clock(
            Recording::<FinalCalcTrackData>::default(),
            StepClock::starting_at(T, 10),
        );
        for _ in 0..3 {
            service.on_data_received(&delay_record()).unwrap();
        }
        assert_eq!(service.sender().records.len(), 3);
    }

    #[test]
    fn invalid_record_is_not_dispatched() {
        let mut service = FinalCalculatorService::with_clock(
            Recording::<FinalCalcTrackData>::default(),
            StepClock::starting_at(T, 1),
        );
        let mut input = delay_record();
        input.track.velocity.y = f64::INFINITY;

        assert!(service.on_data_received(&input).is_err());
        assert!(service.sender().records.is_empty());
    }

    #[test]
    fn stale_record_is_flagged_and_still_dispatched() {
        // update_time is T - 8_000, so arrival at T + 2_000 is 10ms old.
        let mut service = FinalCalculatorService::with_clock(
            Recording::<FinalCalcTrackData>::default(),
            StepClock::starting_at(T + 2_000, 1),
        )
        .with_config(FinalCalcConfig {
            max_data_age_us: 9_999,
            ..Default::default()
        });
        service.on_data_received(&delay_record()).unwrap();

        assert_eq!(service.stale_records(), 1);
        assert_eq!(service.sender().records.len(), 1);
        assert_eq!(service.sender().records[0].third_hop_sent_time, T + 2_000);
    }

    #[test]
    fn fresh_record_is_not_flagged() {
        let mut service = FinalCalculatorService::with_clock(
            Recording::<FinalCalcTrackData>::default(),
            StepClock::starting_at(T + 2_000, 1),
        )
        .with_config(FinalCalcConfig {
            max_data_age_us: 10_000,
            high_velocity_mps: 1_000.0,
        });
        service.on_data_received(&delay_record()).unwrap();

        assert_eq!(service.stale_records(), 0);
        assert_eq!(service.high_velocity_records(), 0);
        assert_eq!(service.sender().records.len(), 1);
    }

    #[test]
    fn fast_track_is_counted_with_default_threshold() {
        let mut service = FinalCalculatorService::with_clock(
            Recording::<FinalCalcTrackData>::default(),
            StepClock::starting_at(T, 1),
        );
        service.on_data_received(&delay_record()).unwrap();
        assert_eq!(service.high_velocity_records(), 1);
    }

    #[test]
    fn backwards_clock_cannot_precede_second_hop() {
        // Clock reads 1ms before the relay's stamp.
        let mut service = FinalCalculatorService::with_clock(
            Recording::<FinalCalcTrackData>::default(),
            StepClock::starting_at(T - 3_000, 1),
        );
        service.on_data_received(&delay_record()).unwrap();

        let output = &service.sender().records[0];
        assert_eq!(output.third_hop_sent_time, T - 2_000);
        assert_eq!(output.third_hop_delay(), 0);
        assert_eq!(output.total_delay_time, 8_000);
        assert!(output.is_monotonic());
    }

    #[test]
    fn sender_failure_reaches_caller() {
        let mut service = FinalCalculatorService::with_clock(
            Recording::<FinalCalcTrackData>::failing(),
            StepClock::starting_at(T, 1),
        );
        let err = service.on_data_received(&delay_record()).unwrap_err();
        assert!(matches!(err, TrackError::Downstream(_)));
    }
}
