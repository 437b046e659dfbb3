use clap::Parser;
use signalnet_rs::config::{DEFAULT_PORT, SenderConfig};
use signalnet_rs::sender::{ReliableSender, SenderStats};
use signalnet_rs::{Error, Result};
use signalnet_rs::telemetry::{
    ScriptedSource, SensorNode, SyntheticSource, TelemetrySource, direction_for,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::error;

#[derive(Debug, Parser)]
#[command(
    name = "sensor-node",
    about = "Roadside sensor node: polls vehicle counts and sends them over a reliable UDP window"
)]
struct Args {
    /// Junction ID (1-4)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=4))]
    junction: u32,

    /// Host where the signal controller listens
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// UDP port of the signal controller
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Seconds between polls
    #[arg(long, default_value_t = 2.0)]
    interval: f64,

    /// Packets per window
    #[arg(long)]
    window: Option<usize>,

    /// Fixed wait for acks after each sweep (ms)
    #[arg(long)]
    ack_timeout_ms: Option<u64>,

    /// Transmissions per sequence before giving up
    #[arg(long)]
    max_retries: Option<u32>,

    /// Simulated send-side loss probability
    #[arg(long)]
    send_loss: Option<f64>,

    /// RNG seed for loss simulation and the synthetic source
    #[arg(long)]
    seed: Option<u64>,

    /// Replay telemetry from a JSON array of {"running", "counts"} reports
    #[arg(long)]
    counts_file: Option<PathBuf>,
}

fn start_node(args: &Args, cfg: SenderConfig) -> Result<SensorNode<Box<dyn TelemetrySource>>> {
    let source: Box<dyn TelemetrySource> = match &args.counts_file {
        Some(path) => Box::new(ScriptedSource::from_json_file(path)?),
        None => Box::new(SyntheticSource::new(args.seed)),
    };
    let interval = Duration::try_from_secs_f64(args.interval)
        .map_err(|e| Error::Config(format!("invalid --interval {}: {e}", args.interval)))?;
    let sender = ReliableSender::connect((args.host.as_str(), args.port), cfg)?;
    SensorNode::new(args.junction, source, sender, interval)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();

    let mut cfg = SenderConfig {
        seed: args.seed,
        ..SenderConfig::default()
    };
    if let Some(w) = args.window {
        cfg.window_size = w;
    }
    if let Some(ms) = args.ack_timeout_ms {
        cfg.ack_timeout_ms = ms;
    }
    if let Some(r) = args.max_retries {
        cfg.max_retries = r;
    }
    if let Some(p) = args.send_loss {
        cfg.send_loss = p;
    }

    let outcome = match start_node(&args, cfg) {
        Ok(mut node) => node.run(),
        Err(e) => {
            error!(error = %e, "❌ 传感器节点启动失败");
            println!(
                "junction={} direction={} exit=StartupFailed polls=0",
                args.junction,
                direction_for(args.junction).unwrap_or("right")
            );
            println!("{}", SenderStats::default());
            std::process::exit(0);
        }
    };
    println!(
        "junction={} direction={} exit={:?} polls={}",
        args.junction,
        direction_for(args.junction).unwrap_or("right"),
        outcome.reason,
        outcome.polls
    );
    println!("{}", outcome.stats);
    std::process::exit(0);
}
