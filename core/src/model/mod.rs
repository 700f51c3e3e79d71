//! Track telemetry records as they accumulate hop timestamps.
//!
//! Each hop produces a new record that embeds the one it received, so inherited
//! fields are carried bit-for-bit and only the newest hop's fields are computed.

pub mod delay;
pub mod final_calc;
pub mod track;

pub use delay::DelayCalcTrackData;
pub use final_calc::{FinalCalcTrackData, PerformanceStatus};
pub use track::{EcefVector, TrackData, Violation};
