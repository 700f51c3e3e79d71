//! Datagram encodings shared by every transport adapter.
//!
//! `envelope` is the structured JSON form used between hops. `legacy` keeps the
//! `payload|timestamp` text form for latency probes that still speak it.

pub mod envelope;
pub mod legacy;

pub use envelope::{Envelope, TrackFrame, MAX_DATAGRAM_LEN};
pub use legacy::{decode_legacy, encode_legacy, LegacyFrame};
