use std::sync::Arc;
use trackcore::model::FinalCalcTrackData;
use trackcore::ports::FinalDataSender;
use trackcore::prelude::TrackResult;
use trackcore::telemetry::MetricsRecorder;

/// Terminal consumer that folds finalized records into shared latency metrics.
#[derive(Clone)]
pub struct MetricsSink {
    recorder: Arc<MetricsRecorder>,
}

impl MetricsSink {
    pub fn new(recorder: Arc<MetricsRecorder>) -> Self {
        Self { recorder }
    }

    pub fn recorder(&self) -> &Arc<MetricsRecorder> {
        &self.recorder
    }
}

impl FinalDataSender for MetricsSink {
    fn send_data(&mut self, data: &FinalCalcTrackData) -> TrackResult<()> {
        self.recorder.record_final(data);
        Ok(())
    }
}
