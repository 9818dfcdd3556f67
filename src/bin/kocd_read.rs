use clap::Parser;
use kocd_dbus::client::{check_status, read_stdin_tokens, BusArgs};
use std::error::Error;

#[derive(Parser, Debug)]
#[command(name = "kocd-read", about = "Read bytes from the kocd device")]
struct Cli {
    /// How many bytes to read (read from stdin when omitted)
    count: Option<u64>,

    #[command(flatten)]
    bus: BusArgs,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let count = match cli.count {
        Some(count) => count,
        None => match read_stdin_tokens(1)?.first() {
            Some(token) => token.parse()?,
            None => 0,
        },
    };

    let conn = cli.bus.connect().await?;
    let device = cli.bus.device(&conn).await?;
    device.open().await?;
    let (status, bytes) = device.read(count).await?;
    device.close().await?;
    check_status(status)?;

    println!(
        "read {} characters: {}",
        bytes.len(),
        String::from_utf8_lossy(&bytes)
    );
    Ok(())
}
