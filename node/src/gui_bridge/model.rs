use serde::{Deserialize, Serialize};
use trackcore::telemetry::LatencySnapshot;

/// Body of `GET /latency`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LatencyReport {
    pub channel: String,
    pub snapshot: LatencySnapshot,
}
