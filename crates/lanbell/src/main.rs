//! lanbell: advertise a local HTTP endpoint on the LAN via mDNS/DNS-SD.
//!
//! Other devices on the same subnet discover the beacon without manual IP
//! entry, open its landing page, and send messages that surface on this
//! host.

mod logging;
mod runner;

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::{info, warn};

use lanbell_net::{AddressSource, StaticAddressSource, WifiAddressSource};
use lanbell_server::LogNotifier;
use runner::{BackendKind, Runner, RunnerConfig};

/// How often a callback-based discovery backend is polled while running.
const DISCOVERY_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[command(name = "lanbell")]
#[command(author, version, about = "Advertise a local HTTP endpoint via mDNS/DNS-SD", long_about = None)]
struct Cli {
    /// Port to serve on (0 picks a free port)
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Advertised instance name
    #[arg(long, default_value = "lanbell")]
    name: String,

    /// Free-text description carried in the TXT record
    #[arg(long, default_value = "lanbell HTTP endpoint")]
    description: String,

    /// Discovery backend
    #[arg(long, value_enum, default_value = "embedded")]
    discovery: DiscoveryArg,

    /// Bind and advertise this address instead of scanning for the active
    /// wireless interface
    #[arg(long)]
    address: Option<Ipv4Addr>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DiscoveryArg {
    /// In-process mDNS responder
    Embedded,
    /// OS discovery service (Avahi/Bonjour)
    Delegated,
}

impl From<DiscoveryArg> for BackendKind {
    fn from(arg: DiscoveryArg) -> Self {
        match arg {
            DiscoveryArg::Embedded => BackendKind::Embedded,
            DiscoveryArg::Delegated => BackendKind::Delegated,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let addresses: Arc<dyn AddressSource> = match cli.address {
        Some(address) => Arc::new(StaticAddressSource::new(address)),
        None => Arc::new(WifiAddressSource::new()),
    };

    let config = RunnerConfig {
        name: cli.name,
        port: cli.port,
        description: cli.description,
        backend: cli.discovery.into(),
    };
    let mut runner = Runner::new(config, addresses, Arc::new(LogNotifier::new()));

    let addr = runner.start().await?;
    info!("Beacon reachable at http://{addr}/ (press Ctrl-C to stop)");

    let mut poll = tokio::time::interval(DISCOVERY_POLL_INTERVAL);
    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!(error = %e, "Could not listen for Ctrl-C");
                }
                break;
            }
            _ = poll.tick() => runner.poll_discovery(),
        }
    }

    runner.stop().await;
    Ok(())
}
