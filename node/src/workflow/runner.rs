use crate::generator::profile::TrackGenerator;
use crate::gui_bridge::bridge::LatencyBridge;
use crate::transport::{MetricsSink, MulticastPublisher, MulticastSubscriber};
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use trackcore::ports::{DelayDataReceiver, FinalDataSender, Loopback, TrackDataIncomingPort};
use trackcore::prelude::{Clock, SystemClock, TrackError, TrackResult};
use trackcore::processing::{FinalCalculatorService, RelayService, TrackExtrapolator};
use trackcore::telemetry::{LogManager, MetricsRecorder};
use trackcore::wire::TrackFrame;

/// Which hop this process runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Role {
    /// Generate tracks, extrapolate and publish on the source channel
    Source,
    /// Stamp first-hop latency and republish on the delay channel
    Relay,
    /// Total the trip and publish on the final channel
    Final,
    /// Observe the final channel and aggregate latency
    Listen,
    /// Run source, relay and final in-process without a network
    Pipeline,
}

/// Per-run counters, one entry per inbound record or datagram.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub forwarded: u64,
    pub rejected: u64,
    pub malformed: u64,
    pub failed: u64,
}

impl RunSummary {
    fn settle(&mut self, outcome: TrackResult<()>, logger: &LogManager) {
        match outcome {
            Ok(()) => self.forwarded += 1,
            Err(err @ TrackError::InvalidRecord { .. }) => {
                self.rejected += 1;
                logger.record_rejection(&err);
            }
            Err(err) if err.is_recoverable() => {
                self.malformed += 1;
                logger.record_rejection(&err);
            }
            Err(err) => {
                self.failed += 1;
                log::error!("forwarding failed: {}", err);
            }
        }
    }
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
    running: Arc<AtomicBool>,
    recorder: Arc<MetricsRecorder>,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(true)),
            recorder: Arc::new(MetricsRecorder::new()),
        }
    }

    /// Flag the run loops poll; clearing it stops them after the current record.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    pub fn recorder(&self) -> Arc<MetricsRecorder> {
        self.recorder.clone()
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn execute(&self, role: Role) -> anyhow::Result<RunSummary> {
        log::info!("starting {:?} node", role);
        match role {
            Role::Source => self.run_source(),
            Role::Relay => self.run_relay(),
            Role::Final => self.run_final(),
            Role::Listen => self.run_listener(),
            Role::Pipeline => Ok(self.run_pipeline()),
        }
    }

    fn run_source(&self) -> anyhow::Result<RunSummary> {
        let publisher =
            MulticastPublisher::open(&self.config.channels.source, &self.config.transport)
                .context("opening source publisher")?;
        let mut source = TrackExtrapolator::new(publisher, self.config.extrapolation);
        Ok(self.publish_bursts(&mut source))
    }

    fn run_relay(&self) -> anyhow::Result<RunSummary> {
        let mut subscriber =
            MulticastSubscriber::open(&self.config.channels.source, &self.config.transport)
                .context("subscribing to source channel")?;
        let publisher =
            MulticastPublisher::open(&self.config.channels.delay, &self.config.transport)
                .context("opening delay publisher")?;
        let mut relay = RelayService::new(publisher);
        let logger = LogManager::new("relay");

        Ok(self.drain(&mut subscriber, &logger, |frame| match frame {
            TrackFrame::Track(track) => Some(relay.process_and_forward(&track)),
            other => {
                log::debug!("[relay] ignoring {} frame", other.kind());
                None
            }
        }))
    }

    fn run_final(&self) -> anyhow::Result<RunSummary> {
        let mut subscriber =
            MulticastSubscriber::open(&self.config.channels.delay, &self.config.transport)
                .context("subscribing to delay channel")?;
        let publisher =
            MulticastPublisher::open(&self.config.channels.final_calc, &self.config.transport)
                .context("opening final publisher")?;
        let mut final_calc =
            FinalCalculatorService::new(publisher).with_config(self.config.final_calc);
        let logger = LogManager::new("final");

        Ok(self.drain(&mut subscriber, &logger, |frame| match frame {
            TrackFrame::DelayCalc(record) => Some(final_calc.on_data_received(&record)),
            other => {
                log::debug!("[final] ignoring {} frame", other.kind());
                None
            }
        }))
    }

    fn run_listener(&self) -> anyhow::Result<RunSummary> {
        let channel = &self.config.channels.final_calc;
        let mut subscriber = MulticastSubscriber::open(channel, &self.config.transport)
            .context("subscribing to final channel")?;
        if self.config.listen.serve {
            LatencyBridge::new(self.recorder.clone(), &channel.name).serve(self.config.listen.bind);
        }
        let mut sink = MetricsSink::new(self.recorder.clone());
        let logger = LogManager::new("listen");

        Ok(self.drain(&mut subscriber, &logger, |frame| match frame {
            TrackFrame::FinalCalc(record) => Some(match record.delay.validate() {
                Ok(()) => {
                    logger.record_final(&record);
                    sink.send_data(&record)
                }
                Err(violation) => {
                    sink.recorder().record_rejected();
                    Err(TrackError::InvalidRecord {
                        track_id: record.track_id(),
                        violation,
                    })
                }
            }),
            other => {
                log::debug!("[listen] ignoring {} frame", other.kind());
                None
            }
        }))
    }

    fn run_pipeline(&self) -> RunSummary {
        let sink = MetricsSink::new(self.recorder.clone());
        let final_calc = FinalCalculatorService::new(sink).with_config(self.config.final_calc);
        let relay = RelayService::new(final_calc);
        let mut source = TrackExtrapolator::new(Loopback::new(relay), self.config.extrapolation);
        self.publish_bursts(&mut source)
    }

    fn publish_bursts<P: TrackDataIncomingPort>(&self, port: &mut P) -> RunSummary {
        let mut generator = TrackGenerator::new(self.config.source.clone());
        let bursts = generator.config().bursts;
        let interval = Duration::from_millis(generator.config().interval_ms);
        let logger = LogManager::new("source");
        let mut summary = RunSummary::default();

        let mut completed = 0usize;
        while self.is_running() {
            for track in generator.next_burst(SystemClock.now_micros()) {
                summary.settle(port.process_and_forward(&track), &logger);
            }
            completed += 1;
            if bursts != 0 && completed >= bursts {
                break;
            }
            thread::sleep(interval);
        }
        logger.record(&format!("published {} bursts", completed));
        summary
    }

    fn drain<F>(
        &self,
        subscriber: &mut MulticastSubscriber,
        logger: &LogManager,
        mut handle: F,
    ) -> RunSummary
    where
        F: FnMut(TrackFrame) -> Option<TrackResult<()>>,
    {
        let mut summary = RunSummary::default();
        while self.is_running() {
            match subscriber.recv() {
                Ok(Some(envelope)) => {
                    if let Some(outcome) = handle(envelope.frame) {
                        summary.settle(outcome, logger);
                    }
                }
                Ok(None) => {}
                Err(err) => summary.settle(Err(err), logger),
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::config::WorkflowConfig;

    #[test]
    fn pipeline_delivers_every_sample_to_metrics() {
        let mut cfg = WorkflowConfig::from_args(3, 2, 7);
        cfg.source.interval_ms = 1;
        cfg.extrapolation.samples = 5;
        let runner = Runner::new(cfg);

        let summary = runner.execute(Role::Pipeline).unwrap();
        assert_eq!(summary.forwarded, 6);
        assert_eq!(summary.rejected, 0);

        let snapshot = runner.recorder().snapshot();
        assert_eq!(snapshot.processed, 30);
        assert!(snapshot.total.min >= 0);
        assert!(snapshot.second_hop.min >= 0);
    }

    #[test]
    fn stopped_runner_publishes_nothing() {
        let runner = Runner::new(WorkflowConfig::from_args(2, 0, 1));
        runner.stop_handle().store(false, Ordering::SeqCst);
        let summary = runner.execute(Role::Pipeline).unwrap();
        assert_eq!(summary, RunSummary::default());
    }

    #[test]
    fn summary_sorts_outcomes() {
        let logger = LogManager::default();
        let mut summary = RunSummary::default();
        summary.settle(Ok(()), &logger);
        summary.settle(
            Err(TrackError::MalformedFrame("missing separator".into())),
            &logger,
        );
        summary.settle(Err(TrackError::Downstream("closed".into())), &logger);
        assert_eq!(
            summary,
            RunSummary {
                forwarded: 1,
                rejected: 0,
                malformed: 1,
                failed: 1,
            }
        );
    }
}
