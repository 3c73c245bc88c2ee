use anyhow::Context;
use broker::RadarHub;
use clap::Parser;
use log::info;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::{publish_generated, Runner};

mod broker;
mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Radar topic broker and servo sweep simulator")]
struct Args {
    /// Run the sweep engine headless over generated telemetry and print a summary
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Host the radar topic (HTTP ingest plus WebSocket subscriptions)
    #[arg(long, default_value_t = false)]
    serve: bool,
    /// While serving, also publish samples from the simulated servo
    #[arg(long, default_value_t = false)]
    generate: bool,
    #[arg(long)]
    port: Option<u16>,
    /// Seconds of simulated time for --offline
    #[arg(long)]
    seconds: Option<f64>,
    /// Seed for the servo noise generator
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::default()
    };
    if let Some(port) = args.port {
        workflow_config.port = port;
    }
    if let Some(seconds) = args.seconds {
        workflow_config.offline_seconds = seconds;
    }
    if let Some(seed) = args.seed {
        workflow_config.servo.seed = seed;
    }

    if args.offline {
        let summary = Runner::new(workflow_config.clone()).execute()?;

        println!(
            "Offline run -> frames {}, samples {}, revealed {}, stale {}, expired {}, peak blips {}",
            summary.frames,
            summary.samples,
            summary.counters.revealed,
            summary.counters.stale_discarded,
            summary.counters.expired,
            summary.peak_blips
        );

        let report = format!(
            "{}\n",
            serde_json::to_string(&summary).context("encoding offline summary")?
        );
        let report_path = PathBuf::from("tools/data/offline_sweep.log");
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&report_path)
            .with_context(|| format!("opening {}", report_path.display()))?;
        file.write_all(report.as_bytes())?;
    }

    if args.serve {
        let addr = workflow_config.socket_addr()?;
        let hub = Arc::new(RadarHub::new());
        let runtime = TokioBuilder::new_multi_thread()
            .enable_all()
            .build()
            .context("creating runtime for the radar broker")?;

        runtime.block_on(async {
            let (bound, server) = warp::serve(broker::routes(hub.clone()))
                .try_bind_with_graceful_shutdown(addr, async {
                    if let Err(err) = signal::ctrl_c().await {
                        log::error!("awaiting Ctrl+C failed: {}", err);
                    }
                })
                .with_context(|| format!("binding radar broker on {}", addr))?;
            info!("radar topic on ws://{}/ws-radar (Ctrl+C to stop)", bound);

            let generator = args
                .generate
                .then(|| tokio::spawn(publish_generated(hub.clone(), workflow_config.servo.clone())));

            server.await;
            if let Some(task) = generator {
                task.abort();
            }
            info!("radar broker stopped");
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
