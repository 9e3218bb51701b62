use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use clap_derive::Parser;
use plotlink::config::{LinkConfig, DEFAULT_LISTEN_PORT};
use plotlink::plot_link::PlotLink;
use tokio::select;
use tokio::sync::mpsc;
use tracing::{info, Level};

#[derive(Parser)]
struct Args {
    #[clap(short, long, default_value_t = DEFAULT_LISTEN_PORT)]
    port: u16,

    /// samples per second
    #[clap(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..=1000))]
    rate: u32,

    #[clap(short, long, default_value_t = false)]
    verbose: bool,

    #[clap(long, default_value_t = false)]
    very_verbose: bool,
}

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match (args.verbose, args.very_verbose) {
        (_, true) => Level::TRACE,
        (true, _) => Level::DEBUG,
        (false, false) => Level::INFO,
    };

    // stdout carries the local line channel
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    let link = Arc::new(PlotLink::new(LinkConfig::for_port(args.port)).await?);

    let (input_send, input_recv) = mpsc::unbounded_channel();
    link.on_input_received(move |line: &str| {
        let _ = input_send.send(line.to_string());
    }).await;

    select! {
        result = link.run_with_stdin() => { result }
        _ = emit_sine(link.clone(), args.rate, input_recv) => { Ok(()) }
    }
}

async fn emit_sine(link: Arc<PlotLink>, rate: u32, mut input: mpsc::UnboundedReceiver<String>) {
    let dt_ms = sample_interval_ms(rate);
    let mut ticks = tokio::time::interval(Duration::from_millis(dt_ms as u64));
    let mut phase = 0.0f64;

    info!(dt_ms, "emitting sine wave");
    loop {
        select! {
            _ = ticks.tick() => {
                phase += std::f64::consts::TAU * dt_ms as f64 / 1000.0;
                link.emitter().emit_scalar_now("sine", &phase.sin(), None).await;
                if (phase / std::f64::consts::TAU).fract() < 0.05 {
                    link.emitter().emit_batch("cos", dt_ms, &[phase.cos(), (phase + 0.1).cos()], Some("V")).await;
                }
            }
            line = input.recv() => {
                match line {
                    Some(line) => link.emitter().emit_log(&format!("received: {}", line), None).await,
                    None => break,
                }
            }
        }
    }
}

/// never zero, `interval` rejects a zero period
fn sample_interval_ms(rate: u32) -> u32 {
    (1000 / rate.max(1)).max(1)
}
