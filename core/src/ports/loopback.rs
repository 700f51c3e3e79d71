use crate::model::TrackData;
use crate::prelude::TrackResult;

use super::{TrackDataIncomingPort, TrackDataSender};

/// Feeds a sending hop straight into the next hop's incoming port, with no
/// transport in between.
pub struct Loopback<P> {
    next: P,
}

impl<P: TrackDataIncomingPort> Loopback<P> {
    pub fn new(next: P) -> Self {
        Self { next }
    }

    pub fn inner(&self) -> &P {
        &self.next
    }

    pub fn into_inner(self) -> P {
        self.next
    }
}

impl<P: TrackDataIncomingPort> TrackDataSender for Loopback<P> {
    fn send_track(&mut self, data: &TrackData) -> TrackResult<()> {
        self.next.process_and_forward(data)
    }
}
