use clap::Parser;
use kocd_dbus::client::{check_status, read_stdin_tokens, BusArgs};
use std::error::Error;

#[derive(Parser, Debug)]
#[command(name = "kocd-seek", about = "Move the read cursor of the kocd device")]
struct Cli {
    /// Offset (read with WHENCE from stdin when omitted)
    #[arg(allow_negative_numbers = true)]
    offset: Option<i64>,

    /// 0 = from start, 1 = from current, 2 = from end of capacity
    #[arg(allow_negative_numbers = true, requires = "offset")]
    whence: Option<i32>,

    #[command(flatten)]
    bus: BusArgs,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let (offset, whence) = match cli.offset {
        Some(offset) => (offset, cli.whence.unwrap_or(0)),
        None => {
            let tokens = read_stdin_tokens(2)?;
            let offset = tokens.first().map(|t| t.parse::<i64>()).transpose()?.unwrap_or(0);
            let whence = tokens.get(1).map(|t| t.parse::<i32>()).transpose()?.unwrap_or(0);
            (offset, whence)
        }
    };

    let conn = cli.bus.connect().await?;
    let device = cli.bus.device(&conn).await?;
    device.open().await?;
    let (status, pos) = device.seek(offset, whence).await?;
    device.close().await?;

    println!("ret {}", if status == 0 { pos } else { i64::from(status) });
    check_status(status)?;
    Ok(())
}
