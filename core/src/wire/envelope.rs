use serde::{Deserialize, Serialize};

use crate::model::{DelayCalcTrackData, FinalCalcTrackData, TrackData};
use crate::prelude::{TrackError, TrackResult};

/// Largest UDP payload an IPv4 datagram can carry.
pub const MAX_DATAGRAM_LEN: usize = 65_507;

/// A record at one of its three stages, tagged by kind on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum TrackFrame {
    Track(TrackData),
    DelayCalc(DelayCalcTrackData),
    FinalCalc(FinalCalcTrackData),
}

impl TrackFrame {
    pub fn track_id(&self) -> i32 {
        match self {
            TrackFrame::Track(record) => record.track_id,
            TrackFrame::DelayCalc(record) => record.track_id(),
            TrackFrame::FinalCalc(record) => record.track_id(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TrackFrame::Track(_) => "track",
            TrackFrame::DelayCalc(_) => "delay_calc",
            TrackFrame::FinalCalc(_) => "final_calc",
        }
    }
}

/// One datagram: the logical channel it was published on, the publisher's
/// send time in microseconds, and the record itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub channel: String,
    pub sent_at: i64,
    pub frame: TrackFrame,
}

impl Envelope {
    pub fn new(channel: impl Into<String>, sent_at: i64, frame: TrackFrame) -> Self {
        Self {
            channel: channel.into(),
            sent_at,
            frame,
        }
    }

    pub fn encode(&self) -> TrackResult<Vec<u8>> {
        let bytes = serde_json::to_vec(self)?;
        if bytes.len() > MAX_DATAGRAM_LEN {
            return Err(TrackError::MalformedFrame(format!(
                "encoded envelope is {} bytes, limit {}",
                bytes.len(),
                MAX_DATAGRAM_LEN
            )));
        }
        Ok(bytes)
    }

    pub fn decode(bytes: &[u8]) -> TrackResult<Self> {
        serde_json::from_slice(bytes).map_err(|err| TrackError::MalformedFrame(err.to_string()))
    }

    /// Decodes `bytes` and keeps the frame only if it was published on `channel`.
    pub fn decode_for(channel: &str, bytes: &[u8]) -> TrackResult<Option<Self>> {
        let envelope = Self::decode(bytes)?;
        Ok((envelope.channel == channel).then_some(envelope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EcefVector;

    fn track() -> TrackData {
        let mut track = TrackData::new(
            77,
            EcefVector::new(4_510_023.5, 1_234_567.25, -4_290_000.0),
            EcefVector::new(12.5, -3.0, 0.125),
        )
        .with_times(1_000, 1_250);
        track.first_hop_sent_time = 1_300;
        track
    }

    #[test]
    fn final_frame_survives_the_wire() {
        let delay = DelayCalcTrackData::new(track(), 300, 1_400);
        let frame = TrackFrame::FinalCalc(FinalCalcTrackData::from_delay(delay, 1_500));
        let envelope = Envelope::new("final", 1_501, frame);

        let decoded = Envelope::decode(&envelope.encode().unwrap()).unwrap();
        assert_eq!(decoded, envelope);
        assert_eq!(decoded.frame.track_id(), 77);
        assert_eq!(decoded.frame.kind(), "final_calc");
    }

    #[test]
    fn wire_form_names_every_field() {
        let envelope = Envelope::new("source", 5, TrackFrame::Track(track()));
        let value: serde_json::Value =
            serde_json::from_slice(&envelope.encode().unwrap()).unwrap();
        assert_eq!(value["frame"]["kind"], "track");
        assert_eq!(value["frame"]["record"]["original_update_time"], 1_000);
        assert_eq!(value["frame"]["record"]["velocity"]["z"], 0.125);
    }

    #[test]
    fn other_channels_are_filtered_out() {
        let bytes = Envelope::new("source", 5, TrackFrame::Track(track()))
            .encode()
            .unwrap();
        assert!(Envelope::decode_for("delay", &bytes).unwrap().is_none());
        assert!(Envelope::decode_for("source", &bytes).unwrap().is_some());
    }

    #[test]
    fn garbage_is_a_malformed_frame() {
        let err = Envelope::decode(b"track|123").unwrap_err();
        assert!(matches!(err, TrackError::MalformedFrame(_)));
    }

    #[test]
    fn non_finite_values_do_not_decode() {
        let mut broken = track();
        broken.position.x = f64::NAN;
        let bytes = Envelope::new("source", 5, TrackFrame::Track(broken))
            .encode()
            .unwrap();
        assert!(Envelope::decode(&bytes).is_err());
    }
}
