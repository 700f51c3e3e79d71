use crate::gui_bridge::model::LatencyReport;
use std::{net::SocketAddr, sync::Arc, thread};
use tokio::runtime::Builder;
use trackcore::telemetry::MetricsRecorder;
use warp::Filter;

/// Bridge that exposes the listener's latency metrics over HTTP.
#[derive(Clone)]
pub struct LatencyBridge {
    recorder: Arc<MetricsRecorder>,
    channel: String,
}

impl LatencyBridge {
    pub fn new(recorder: Arc<MetricsRecorder>, channel: &str) -> Self {
        Self {
            recorder,
            channel: channel.to_string(),
        }
    }

    pub fn report(&self) -> LatencyReport {
        LatencyReport {
            channel: self.channel.clone(),
            snapshot: self.recorder.snapshot(),
        }
    }

    pub fn routes(
        &self,
    ) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
        let bridge = self.clone();
        warp::path("latency")
            .and(warp::path::end())
            .and(warp::get())
            .map(move || warp::reply::json(&bridge.report()))
    }

    /// Serves `GET /latency` on its own thread and runtime.
    pub fn serve(&self, bind: SocketAddr) -> thread::JoinHandle<()> {
        let route = self.routes();
        thread::spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    log::error!("[bridge] failed to build runtime: {}", err);
                    return;
                }
            };
            log::info!("[bridge] serving latency report on http://{}/latency", bind);
            runtime.block_on(async move {
                warp::serve(route).run(bind).await;
            });
        })
    }
}
