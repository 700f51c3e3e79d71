use crate::model::TrackData;
use crate::prelude::TrackResult;

/// Entry point of a hop: accept one telemetry record and push it onward.
///
/// Returns `TrackError::InvalidRecord` without forwarding anything when the
/// record fails validation. May block until the downstream send completes.
pub trait TrackDataIncomingPort {
    fn process_and_forward(&mut self, data: &TrackData) -> TrackResult<()>;
}

impl<P: TrackDataIncomingPort + ?Sized> TrackDataIncomingPort for Box<P> {
    fn process_and_forward(&mut self, data: &TrackData) -> TrackResult<()> {
        (**self).process_and_forward(data)
    }
}
