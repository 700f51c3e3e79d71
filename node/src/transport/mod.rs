pub mod multicast;
pub mod sinks;

pub use multicast::{MulticastPublisher, MulticastSubscriber};
pub use sinks::MetricsSink;
