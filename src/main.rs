use clap::Parser;
use kocd_dbus::config::load_config;
use kocd_dbus::device::{Device, DEVICE_NAME};
use kocd_dbus::service::{release, serve, shared};
use log::{info, warn};
use std::error::Error;

#[derive(Parser, Debug)]
#[command(name = "kocdd", about = "Serve the kocd buffer device over D-Bus")]
struct Cli {
    /// Config file (default: ~/.config/kocd/config.toml)
    #[arg(long)]
    config: Option<String>,

    /// Buffer capacity in bytes, overriding the config file
    #[arg(long)]
    capacity: Option<usize>,

    /// Serve on the system bus
    #[arg(long)]
    system: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref(), cli.capacity, cli.system)?;

    let device = shared(Device::new(cfg.capacity));
    let connection = serve(&cfg, device.clone()).await?;

    info!("D-Bus service '{}' is running.", cfg.name);

    tokio::signal::ctrl_c().await?;
    info!("Shutting down {}", DEVICE_NAME);

    drop(connection);
    if !release(device) {
        warn!("{} not torn down on shutdown", DEVICE_NAME);
    }

    Ok(())
}
