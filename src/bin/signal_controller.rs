use clap::Parser;
use signalnet_rs::channel;
use signalnet_rs::config::ControlPlaneConfig;
use signalnet_rs::controller::{
    Controller, ControllerView, SignalObserver, Tick, TickDriver, TickReport,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(
    name = "signal-controller",
    about = "Adaptive signal controller fed by sensor nodes over a lossy UDP channel"
)]
struct Args {
    /// Path to a control-plane config JSON ({"channel": {...}, "controller": {...}})
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen host
    #[arg(long)]
    host: Option<String>,

    /// Listen port (falls back to port + 1 once if busy)
    #[arg(long)]
    port: Option<u16>,

    /// Probability that an ack is dropped
    #[arg(long)]
    ack_loss: Option<f64>,

    #[arg(long)]
    ack_delay_min_ms: Option<u64>,

    #[arg(long)]
    ack_delay_max_ms: Option<u64>,

    /// Ticks to run; 0 runs until the process is killed
    #[arg(long, default_value_t = 0)]
    ticks: u64,

    /// Wall-clock length of one tick (ms); 0 runs unpaced
    #[arg(long, default_value_t = 1000)]
    tick_ms: u64,

    /// RNG seed for ack loss and delay
    #[arg(long)]
    seed: Option<u64>,
}

/// 代替渲染层：把每个 tick 的信号牌文字写进日志
struct LogObserver;

impl SignalObserver for LogObserver {
    fn on_tick(&mut self, report: &TickReport, view: &ControllerView) {
        let texts: Vec<&str> = view.junctions.iter().map(|j| j.text.as_str()).collect();
        debug!(tick = report.tick.0, active = view.active, ?texts, "tick");
        if let Some(j) = report.activated.and_then(|i| view.junctions.get(i)) {
            info!(
                tick = report.tick.0,
                junction = j.junction_id,
                green = j.green,
                "放行"
            );
        }
    }
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

    let mut cfg = match &args.config {
        Some(path) => ControlPlaneConfig::from_json_file(path).expect("load config"),
        None => ControlPlaneConfig::default(),
    };
    if let Some(host) = args.host {
        cfg.channel.host = host;
    }
    if let Some(port) = args.port {
        cfg.channel.port = port;
    }
    if let Some(p) = args.ack_loss {
        cfg.channel.ack_loss = p;
    }
    if let Some(ms) = args.ack_delay_min_ms {
        cfg.channel.ack_delay_min_ms = ms;
    }
    if let Some(ms) = args.ack_delay_max_ms {
        cfg.channel.ack_delay_max_ms = ms;
    }
    if args.seed.is_some() {
        cfg.channel.seed = args.seed;
    }
    cfg.validate().expect("invalid config");

    let mut controller = Controller::new(cfg.controller.clone()).expect("create controller");
    let sensors = controller.sensor_handle();
    let handle = channel::listen(&cfg.channel, move |d| sensors.ingest(d)).expect("start channel");
    println!("listening on {}", handle.local_addr());

    let period = (args.tick_ms > 0).then(|| Duration::from_millis(args.tick_ms));
    let mut driver = TickDriver::new(period);
    let mut observer = LogObserver;
    if args.ticks == 0 {
        driver.run(&mut controller, &mut observer);
    } else {
        driver.run_until(Tick(args.ticks), &mut controller, &mut observer);
    }

    let view = controller.view();
    println!("ticks={} active={}", view.tick.0, view.active + 1);
    for j in &view.junctions {
        println!(
            "junction={} total_green={} activations={} configured_green={}",
            j.junction_id, j.total_green_time, j.activations, j.configured_green
        );
    }
    println!("{}", handle.stats());
    std::process::exit(0);
}
