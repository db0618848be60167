//! Firehose HTTP delivery to Fluent Forward gateway.
//!
//! Accepts Kinesis Data Firehose HTTP-endpoint deliveries, decodes each
//! record by event type and relays the result to a Fluent Forward receiver.
//!
//! # Architecture Overview
//!
//! ```text
//!     Firehose ──POST /──▶ http ──▶ firehose ──▶ forward ──TCP──▶ Fluent Forward
//!                           │      classify       client          receiver
//!                           │      decode
//!                           │      transform
//!                           ▼
//!                      JSON ack (200/400/401/500)
//!
//!     Cross-cutting: config, observability (logs + /metrics),
//!                    health (/health/live, /health/ready), lifecycle
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use firehose_gateway::config::{loader, GatewayConfig};
use firehose_gateway::lifecycle::{signals, Gateway};
use firehose_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "firehose-gateway", version)]
#[command(about = "Relay Firehose HTTP deliveries to a Fluent Forward receiver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway
    Serve(ServeArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address for Firehose deliveries (host:port, or :port for all interfaces)
    #[arg(short, long)]
    listen: Option<String>,

    /// Fluent Forward receiver as host:port
    #[arg(short, long)]
    forward: Option<String>,

    /// Common attribute holding the event type
    #[arg(short, long)]
    event_type_header_name: Option<String>,

    /// Log level or filter directive
    #[arg(long)]
    log_level: Option<String>,

    /// Shared secret expected in the access-key header
    #[arg(long, env = "ACCESS_KEY", hide_env_values = true)]
    access_key: Option<String>,
}

impl ServeArgs {
    fn apply(self, config: &mut GatewayConfig) {
        if let Some(listen) = self.listen {
            config.listener.bind_address = listen;
        }
        if let Some(forward) = self.forward {
            config.forward.address = forward;
        }
        if let Some(name) = self.event_type_header_name {
            config.firehose.event_type_header_name = name;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        if let Some(key) = self.access_key {
            config.firehose.access_key = key;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Commands::Serve(args) = Cli::parse().command;

    let mut config = match &args.config {
        Some(path) => loader::read_config(path)?,
        None => GatewayConfig::default(),
    };
    args.apply(&mut config);
    let config = loader::validate(config)?;

    logging::init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        forward_address = %config.forward.address,
        event_type_attribute = %config.firehose.event_type_header_name,
        "firehose-gateway starting"
    );

    let gateway = match Gateway::start(config).await {
        Ok(gateway) => gateway,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            return Err(e.into());
        }
    };
    tracing::info!(address = %gateway.local_addr()?, "listening for deliveries");

    gateway.serve(signals::stop_signal()).await?;
    Ok(())
}
