use clap::Parser;
use kocd_dbus::client::{check_status, read_stdin_tokens, BusArgs};
use std::error::Error;

#[derive(Parser, Debug)]
#[command(name = "kocd-write", about = "Write one string to the kocd device")]
struct Cli {
    /// Text to write (first word of stdin when omitted)
    text: Option<String>,

    #[command(flatten)]
    bus: BusArgs,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let text = match cli.text {
        Some(text) => text,
        None => read_stdin_tokens(1)?.into_iter().next().unwrap_or_default(),
    };

    let conn = cli.bus.connect().await?;
    let device = cli.bus.device(&conn).await?;
    device.open().await?;
    let (status, written) = device.write(text.as_bytes()).await?;
    device.close().await?;
    check_status(status)?;

    println!("wrote {} characters", written);
    Ok(())
}
