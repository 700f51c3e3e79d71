use anyhow::Context;
use clap::Parser;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::{Role, Runner};

mod generator;
mod gui_bridge;
mod transport;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Track telemetry relay node")]
struct Args {
    /// Hop to run
    #[arg(long, value_enum, default_value_t = Role::Pipeline)]
    role: Role,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, default_value_t = 8)]
    tracks: usize,
    /// Update rounds to publish; 0 runs until Ctrl+C
    #[arg(long, default_value_t = 1)]
    bursts: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Local interface used for multicast membership
    #[arg(long)]
    interface: Option<Ipv4Addr>,
    /// Serve the latency report over HTTP (listen role)
    #[arg(long, default_value_t = false)]
    serve: bool,
    /// Append a run summary line to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.tracks, args.bursts, args.seed)
    };
    if let Some(interface) = args.interface {
        workflow_config.transport.interface = interface;
    }
    workflow_config.listen.serve |= args.serve;

    let role = args.role;
    let runner = Runner::new(workflow_config);
    let running = runner.stop_handle();
    let recorder = runner.recorder();

    let runtime = TokioBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("creating runtime for signal handling")?;
    let summary: anyhow::Result<_> = runtime.block_on(async move {
        let mut worker = tokio::task::spawn_blocking(move || runner.execute(role));
        tokio::select! {
            joined = &mut worker => joined.context("node worker panicked").and_then(|run| run),
            interrupted = signal::ctrl_c() => {
                if let Err(err) = interrupted {
                    log::warn!("awaiting Ctrl+C failed: {}", err);
                }
                log::info!("shutdown requested, draining {:?} node", role);
                running.store(false, Ordering::SeqCst);
                worker.await.context("node worker panicked").and_then(|run| run)
            }
        }
    });
    let summary = summary?;

    let snapshot = recorder.snapshot();
    println!(
        "{:?} node -> forwarded {}, rejected {}, malformed {}, failed {}",
        role, summary.forwarded, summary.rejected, summary.malformed, summary.failed
    );
    if snapshot.processed > 0 {
        println!(
            "latency (us) -> first hop mean {:.1}, B->C mean {:.1}, total mean {:.1} (min {}, max {})",
            snapshot.first_hop.mean,
            snapshot.second_hop.mean,
            snapshot.total.mean,
            snapshot.total.min,
            snapshot.total.max
        );
        let status = snapshot.status;
        println!(
            "status -> excellent {}, good {}, acceptable {}, poor {}, critical {}",
            status.excellent, status.good, status.acceptable, status.poor, status.critical
        );
    }

    if let Some(report_path) = args.report {
        let report = format!(
            "role={:?} forwarded={} rejected={} malformed={} failed={} latency={}\n",
            role,
            summary.forwarded,
            summary.rejected,
            summary.malformed,
            summary.failed,
            serde_json::to_string(&snapshot)?
        );
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&report_path)
            .with_context(|| format!("opening report {}", report_path.display()))?;
        file.write_all(report.as_bytes())?;
    }

    Ok(())
}
