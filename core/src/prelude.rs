use std::time::{SystemTime, UNIX_EPOCH};

use crate::model::Violation;

/// Common error type for every port call and codec operation.
#[derive(thiserror::Error, Debug)]
pub enum TrackError {
    #[error("track {track_id} rejected: {violation}")]
    InvalidRecord { track_id: i32, violation: Violation },
    #[error("malformed frame: {0}")]
    MalformedFrame(String),
    #[error("codec failure: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("transport i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("downstream unavailable: {0}")]
    Downstream(String),
}

impl TrackError {
    /// True for per-record conditions a node logs and moves past.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TrackError::InvalidRecord { .. } | TrackError::MalformedFrame(_) | TrackError::Codec(_)
        )
    }
}

pub type TrackResult<T> = Result<T, TrackError>;

/// Source of hop timestamps, in microseconds since the UNIX epoch.
///
/// Every node of one deployment must read the same clock domain; hop delays
/// computed across unsynchronised hosts include their skew.
pub trait Clock {
    fn now_micros(&self) -> i64;
}

/// Wall clock backed by `SystemTime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_micros(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| i64::try_from(elapsed.as_micros()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_micros(&self) -> i64 {
        (**self).now_micros()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_reads_after_2020() {
        // 2020-01-01T00:00:00Z in microseconds.
        assert!(SystemClock.now_micros() > 1_577_836_800_000_000);
    }

    #[test]
    fn rejection_is_recoverable_but_downstream_is_not() {
        let rejected = TrackError::InvalidRecord {
            track_id: 0,
            violation: Violation::NonPositiveTrackId(0),
        };
        assert!(rejected.is_recoverable());
        assert!(!TrackError::Downstream("gone".into()).is_recoverable());
    }
}
