// jarvis-relay/crates/jarvis-relay/src/main.rs

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use jarvis_relay::{config::Config, run_server, telemetry};

/// HTTP chat relay in front of an OpenAI-compatible completion endpoint
#[cfg(feature = "cli")]
#[derive(Debug, Parser)]
#[command(name = "jarvis-relay", version, about)]
struct Cli {
    /// Bind host, overrides API_HOST
    #[arg(long)]
    host: Option<String>,

    /// Bind port, overrides API_PORT
    #[arg(long)]
    port: Option<u16>,
}

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing();

    let mut cfg = Config::from_env()?;
    if let Some(host) = cli.host {
        cfg.api_host = host;
    }
    if let Some(port) = cli.port {
        cfg.api_port = port;
    }

    run_server(cfg).await
}

#[cfg(not(feature = "cli"))]
fn main() {
    println!("CLI feature not enabled. Enable with --features cli");
}
