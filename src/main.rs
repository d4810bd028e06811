//! mqtt-benchmark - benchmark tool for MQTT brokers
//!
//! Measures connection establishment, publish throughput, and message
//! delivery against a broker using many concurrent simulated clients.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use mqtt_benchmark::bench::{Benchmark, BenchmarkSpec, SpecOverride};
use mqtt_benchmark::client::MqttSessionFactory;
use mqtt_benchmark::config::{BaseConfig, Cli, Command, LogFormat};
use mqtt_benchmark::shutdown;

/// How long interrupted workers get to release their connections.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

fn setup_logging(verbose: bool, quiet: bool, format: LogFormat) {
    let level = if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false);

    match format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish()),
    }
    .expect("failed to set tracing subscriber");
}

/// Map CLI flags to ordered spec overrides: global connection flags
/// first, then the subcommand's workload flags.
fn spec_overrides(cli: &Cli) -> Vec<SpecOverride> {
    let mut overrides = vec![
        SpecOverride::ClientId(cli.client_id.clone()),
        SpecOverride::CleanSession(cli.clean),
        SpecOverride::KeepAlive(cli.keepalive),
        SpecOverride::Username(cli.username.clone()),
        SpecOverride::Password(cli.password.clone()),
        SpecOverride::Host(cli.host.clone()),
        SpecOverride::Port(cli.port),
    ];

    match &cli.command {
        Command::Conn(args) => {
            overrides.push(SpecOverride::Clients(args.clients));
            overrides.push(SpecOverride::Delay(args.delay));
        }
        Command::Pub(args) => {
            overrides.push(SpecOverride::Clients(args.clients));
            overrides.push(SpecOverride::Delay(args.delay));
            overrides.push(SpecOverride::MessageCount(args.count));
            overrides.push(SpecOverride::Qos(args.qos));
            overrides.push(SpecOverride::Topic(args.topic.clone()));
            overrides.push(SpecOverride::Message(args.message.clone()));
            overrides.push(SpecOverride::Retained(args.retain));
        }
        Command::Sub(args) => {
            overrides.push(SpecOverride::Clients(args.clients));
            overrides.push(SpecOverride::Delay(args.delay));
            overrides.push(SpecOverride::MessageCount(args.count));
            overrides.push(SpecOverride::Qos(args.qos));
            overrides.push(SpecOverride::Topic(args.topic.clone()));
        }
    }

    overrides
}

#[tokio::main]
async fn run() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet, cli.log_format);

    let base = BaseConfig::default();
    let spec = BenchmarkSpec::build(&base, spec_overrides(&cli))
        .map_err(|e| anyhow::anyhow!("failed to create benchmark: {e}"))?;

    let (controller, signal) = shutdown::channel();
    let bench = Benchmark::with_shutdown(spec, MqttSessionFactory, signal);

    let run = async {
        match &cli.command {
            Command::Conn(_) => bench.run_connections().await,
            Command::Pub(_) => bench.run_publish().await,
            Command::Sub(_) => bench.run_subscribe().await,
        }
    };
    tokio::pin!(run);

    tokio::select! {
        _ = &mut run => {
            info!(state = "completed", "benchmark completed");
        }
        result = tokio::signal::ctrl_c() => {
            result?;
            info!(state = "interrupted", "received shutdown signal, draining workers");
            controller.signal();
            if tokio::time::timeout(SHUTDOWN_GRACE, &mut run).await.is_err() {
                warn!(
                    grace_secs = SHUTDOWN_GRACE.as_secs(),
                    "workers did not drain within the grace period"
                );
            }
        }
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}
