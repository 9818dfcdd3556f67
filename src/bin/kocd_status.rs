use clap::Parser;
use kocd_dbus::client::{check_status, BusArgs};
use std::error::Error;
use std::io::{self, Write};

#[derive(Parser, Debug)]
#[command(name = "kocd-status", about = "Print the kocd diagnostic report")]
struct Cli {
    /// Bytes requested per read
    #[arg(long, default_value_t = 64)]
    chunk: u64,

    #[command(flatten)]
    bus: BusArgs,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let conn = cli.bus.connect().await?;
    let status = cli.bus.status(&conn).await?;
    status.open().await?;

    loop {
        let (code, chunk) = status.read(cli.chunk).await?;
        check_status(code)?;
        if chunk.is_empty() {
            break;
        }
        io::stdout().write_all(&chunk)?;
    }
    io::stdout().flush()?;

    status.close().await?;
    Ok(())
}
