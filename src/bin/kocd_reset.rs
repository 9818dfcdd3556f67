use clap::Parser;
use kocd_dbus::client::{check_status, parse_control_code, BusArgs};
use std::error::Error;

#[derive(Parser, Debug)]
#[command(name = "kocd-reset", about = "Send a reset command to the kocd device")]
struct Cli {
    /// all (0xF0), wr (0xF1), rd (0xF2) or a raw command code
    #[arg(default_value = "all", value_parser = parse_control_code)]
    command: u32,

    #[command(flatten)]
    bus: BusArgs,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let conn = cli.bus.connect().await?;
    let device = cli.bus.device(&conn).await?;
    device.open().await?;
    let status = device.control(cli.command).await?;
    device.close().await?;
    check_status(status)?;

    println!("command 0x{:X} done", cli.command);
    Ok(())
}
