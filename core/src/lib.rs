//! Domain core for the three-hop track telemetry relay.
//!
//! A source hop extrapolates and emits track records, a relay hop measures the
//! first-hop latency and re-emits, and a final hop totals the end-to-end delay.
//! Hops talk to transports only through the traits in [`ports`].

pub mod math;
pub mod model;
pub mod ports;
pub mod prelude;
pub mod processing;
pub mod telemetry;
pub mod wire;

pub use model::{DelayCalcTrackData, FinalCalcTrackData, TrackData};
pub use prelude::{Clock, SystemClock, TrackError, TrackResult};
