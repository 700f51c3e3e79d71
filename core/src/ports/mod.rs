//! Capability traits separating hop logic from transport.
//!
//! Every port has exactly one operation, delivers one record per call, and
//! reports failure through `TrackResult`. Services own the port they forward to.

pub mod incoming;
pub mod loopback;
pub mod outgoing;

pub use incoming::TrackDataIncomingPort;
pub use loopback::Loopback;
pub use outgoing::{DelayDataReceiver, FinalDataSender, TrackDataSender};
