//! rigdial - jog/shuttle controller to flrig bridge
//!
//! Binds every connected supported controller, maps its input onto the
//! radio and serves status queries until interrupted.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use rigdial::band::BandTable;
use rigdial::bridge::{StatusBridge, STATUS_POLL_INTERVAL};
use rigdial::config::RigdialConfig;
use rigdial::device::{spawn_reader, DeviceExit};
use rigdial::mapper::ControlMapper;
use rigdial::radio::{FlrigClient, RadioLink};
use rigdial::rigctl::StatusServer;
use rigdial_transport::{HidDiscovery, ReportSource};

#[derive(Parser)]
#[command(name = "rigdial")]
#[command(about = "Jog/shuttle controller bridge for flrig")]
struct Cli {
    /// Config file path (default: ~/.config/rigdial/rigdial.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// flrig XML-RPC URL (overrides the config file)
    #[arg(long)]
    radio_url: Option<String>,

    /// Status server listen address (overrides the config file)
    #[arg(long)]
    status_bind: Option<String>,

    /// Disable the status bridge and query server
    #[arg(long)]
    no_status: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Load config
    let config_path = cli.config.clone().unwrap_or_else(RigdialConfig::default_path);
    info!("Loading config from {:?}", config_path);
    let mut config = RigdialConfig::load(&config_path)?;
    if let Some(url) = cli.radio_url {
        config.radio.url = url;
    }
    if let Some(bind) = cli.status_bind {
        config.status.bind = bind;
    }
    if cli.no_status {
        config.status.enabled = false;
    }

    // The blocking HTTP client must be built outside any async context
    let radio: Arc<dyn RadioLink> = Arc::new(
        FlrigClient::new(config.radio.url.clone(), config.radio.timeout())
            .context("creating flrig client")?,
    );
    info!("Using flrig at {}", config.radio.url);

    let (exit_tx, exit_rx) = mpsc::unbounded_channel();
    let bound = bind_devices(&config, &radio, &exit_tx)?;
    drop(exit_tx);
    if bound == 0 {
        error!("No supported controller found");
        bail!("No controller found");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building async runtime")?;
    runtime.block_on(run(config, radio, bound, exit_rx))
}

/// Open every connected supported device and start its reader thread.
///
/// Returns the number of devices bound. A device that fails to open is
/// skipped.
fn bind_devices(
    config: &RigdialConfig,
    radio: &Arc<dyn RadioLink>,
    exits: &mpsc::UnboundedSender<DeviceExit>,
) -> Result<usize> {
    let discovery = HidDiscovery::new(config.devices.clone());
    let devices = discovery.list_devices()?;

    let mut bound = 0;
    for device in &devices {
        let source = match discovery.open(device) {
            Ok(source) => source,
            Err(e) => {
                warn!("Failed to open {}: {}", device.info.label(), e);
                continue;
            }
        };
        info!("Connected to {}", source.label());

        let mapper = ControlMapper::new(
            Arc::clone(radio),
            BandTable::default(),
            config.steps.policy(),
        );
        spawn_reader(Box::new(source), mapper, exits.clone())
            .with_context(|| format!("spawning reader for {}", device.info.label()))?;
        bound += 1;
    }

    Ok(bound)
}

async fn run(
    config: RigdialConfig,
    radio: Arc<dyn RadioLink>,
    mut alive: usize,
    mut exits: mpsc::UnboundedReceiver<DeviceExit>,
) -> Result<()> {
    if config.status.enabled {
        let bridge = Arc::new(StatusBridge::new(radio));
        let server = StatusServer::bind(config.status.bind.as_str(), bridge.subscribe())
            .await
            .with_context(|| format!("binding status server on {}", config.status.bind))?;

        tokio::spawn(Arc::clone(&bridge).run(STATUS_POLL_INTERVAL));
        tokio::spawn(async move {
            if let Err(e) = server.serve().await {
                error!("Status server failed: {}", e);
            }
        });
    } else {
        info!("Status bridge disabled");
    }

    loop {
        tokio::select! {
            exit = exits.recv(), if alive > 0 => {
                match exit {
                    Some(exit) => {
                        alive -= 1;
                        warn!("{} exited ({}), {} device(s) left", exit.device, exit.error, alive);
                    }
                    None => alive = 0,
                }
                if alive == 0 && !config.status.enabled {
                    bail!("All controllers exited");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                return Ok(());
            }
        }
    }
}
