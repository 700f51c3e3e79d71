use crate::prelude::{TrackError, TrackResult};

const SEPARATOR: char = '|';

/// A `payload|timestamp` message split at its last separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyFrame<'a> {
    pub payload: &'a str,
    pub sent_ns: i64,
}

impl LegacyFrame<'_> {
    pub fn latency_ns(&self, receive_ns: i64) -> i64 {
        receive_ns.saturating_sub(self.sent_ns)
    }
}

pub fn encode_legacy(payload: &str, sent_ns: i64) -> String {
    format!("{}{}{}", payload, SEPARATOR, sent_ns)
}

pub fn decode_legacy(message: &str) -> TrackResult<LegacyFrame<'_>> {
    let (payload, suffix) = message
        .rsplit_once(SEPARATOR)
        .ok_or_else(|| TrackError::MalformedFrame("missing timestamp separator".into()))?;
    let sent_ns = suffix
        .trim()
        .parse::<i64>()
        .map_err(|err| TrackError::MalformedFrame(format!("timestamp {:?}: {}", suffix, err)))?;
    Ok(LegacyFrame { payload, sent_ns })
}
