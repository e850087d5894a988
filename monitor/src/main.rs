use anyhow::Context;
use bridge::SpectrumBridge;
use clap::Parser;
use config::MonitorConfig;
use scancore::aggregate::DEFAULT_WINDOW;
use scancore::{IngestLoop, LineSource, SpectrumSink};
use source::{ReplaySource, SyntheticSource};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;

mod bridge;
mod config;
mod source;

#[derive(Parser)]
#[command(author, version, about = "Driver and live bridge for the spectrum scanner core")]
struct Args {
    /// Replay a captured scanner session from a text file
    #[arg(long)]
    replay: Option<PathBuf>,
    /// Number of synthetic lines when no capture file is given
    #[arg(long, default_value_t = 2000)]
    lines: usize,
    /// Seed for the synthetic session
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Load monitor settings from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = DEFAULT_WINDOW)]
    window: usize,
    /// Fail the session after this many consecutive skipped lines (0 = retry forever)
    #[arg(long, default_value_t = 0)]
    skip_cap: usize,
    /// Keep the HTTP bridge alive for observers (Ctrl+C to stop)
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = if let Some(path) = args.config {
        MonitorConfig::load(path)?
    } else {
        MonitorConfig::from_args(args.window, args.skip_cap)
    };

    let source: Box<dyn LineSource> = if let Some(path) = args.replay.as_ref() {
        Box::new(ReplaySource::open(path)?)
    } else {
        Box::new(SyntheticSource::new(args.lines, args.seed))
    };

    let bridge = Arc::new(SpectrumBridge::new());
    let sink: Arc<dyn SpectrumSink> = bridge.clone();
    let mut ingest = IngestLoop::new(source, sink, config.window);
    if config.skip_cap > 0 {
        ingest = ingest.with_skip_cap(config.skip_cap);
    }
    let handle = ingest.handle();

    if args.serve {
        bridge.serve(handle.clone());
        bridge.publish_status("HTTP bridge on 127.0.0.1:9100 (Ctrl+C to stop)...");
    }

    let worker = thread::spawn(move || ingest.run());

    if args.serve {
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
        handle.request_stop();
    }

    let outcome = worker
        .join()
        .map_err(|_| anyhow::anyhow!("ingest worker panicked"))?;
    match outcome {
        Ok(()) => log::info!("ingest stopped cleanly"),
        // End of a capture or synthetic sweep lands here too.
        Err(err) => log::info!("ingest session ended: {}", err),
    }

    let metrics = handle.metrics_snapshot();
    let model = bridge.snapshot();
    println!(
        "Session -> lines {}, skipped {}, readings {}, channels {}",
        metrics.lines_read,
        metrics.lines_skipped,
        metrics.readings_recorded,
        model.channels.len()
    );
    if let Some((channel, report)) = model.strongest() {
        println!(
            "Strongest channel {} MHz -> avg {:.1}%, max {:.1}%",
            channel, report.average_percent, report.max_percent
        );
    }

    Ok(())
}
