use crate::model::{DelayCalcTrackData, FinalCalcTrackData, TrackData};
use crate::prelude::TrackResult;

/// Emits source-hop telemetry towards the relay.
pub trait TrackDataSender {
    fn send_track(&mut self, data: &TrackData) -> TrackResult<()>;
}

/// Accepts a record that has already crossed the first hop.
pub trait DelayDataReceiver {
    fn on_data_received(&mut self, data: &DelayCalcTrackData) -> TrackResult<()>;
}

/// Dispatches a fully annotated record to its terminal consumer.
pub trait FinalDataSender {
    fn send_data(&mut self, data: &FinalCalcTrackData) -> TrackResult<()>;
}

impl<P: TrackDataSender + ?Sized> TrackDataSender for Box<P> {
    fn send_track(&mut self, data: &TrackData) -> TrackResult<()> {
        (**self).send_track(data)
    }
}

impl<P: DelayDataReceiver + ?Sized> DelayDataReceiver for Box<P> {
    fn on_data_received(&mut self, data: &DelayCalcTrackData) -> TrackResult<()> {
        (**self).on_data_received(data)
    }
}

impl<P: FinalDataSender + ?Sized> FinalDataSender for Box<P> {
    fn send_data(&mut self, data: &FinalCalcTrackData) -> TrackResult<()> {
        (**self).send_data(data)
    }
}
