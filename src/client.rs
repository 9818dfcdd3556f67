use crate::buffer::Command;
use crate::config::DEFAULT_SERVICE_NAME;
use crate::error::Error;
use clap::Args;
use std::io::{self, Read};
use zbus::{proxy, Connection};

#[proxy(
    interface = "io.kocd.Device",
    default_service = "io.kocd",
    default_path = "/io/kocd/Device"
)]
pub trait KocdDevice {
    async fn open(&self) -> zbus::Result<()>;
    async fn close(&self) -> zbus::Result<()>;
    async fn write(&self, data: &[u8]) -> zbus::Result<(i32, u64)>;
    async fn read(&self, max_len: u64) -> zbus::Result<(i32, Vec<u8>)>;
    async fn seek(&self, offset: i64, whence: i32) -> zbus::Result<(i32, i64)>;
    async fn control(&self, code: u32) -> zbus::Result<i32>;
}

#[proxy(
    interface = "io.kocd.Status",
    default_service = "io.kocd",
    default_path = "/io/kocd/Status"
)]
pub trait KocdStatus {
    async fn open(&self) -> zbus::Result<()>;
    async fn close(&self) -> zbus::Result<()>;
    async fn read(&self, max_len: u64) -> zbus::Result<(i32, Vec<u8>)>;
}

/// Bus selection flags shared by every client.
#[derive(Args, Debug)]
pub struct BusArgs {
    /// Use the system bus instead of the session bus
    #[arg(long)]
    pub system: bool,

    /// Service name to talk to
    #[arg(long, default_value = DEFAULT_SERVICE_NAME)]
    pub dest: String,
}

impl BusArgs {
    pub async fn connect(&self) -> zbus::Result<Connection> {
        if self.system {
            Connection::system().await
        } else {
            Connection::session().await
        }
    }

    pub async fn device<'a>(&'a self, conn: &Connection) -> zbus::Result<KocdDeviceProxy<'a>> {
        KocdDeviceProxy::builder(conn)
            .destination(self.dest.as_str())?
            .build()
            .await
    }

    pub async fn status<'a>(&'a self, conn: &Connection) -> zbus::Result<KocdStatusProxy<'a>> {
        KocdStatusProxy::builder(conn)
            .destination(self.dest.as_str())?
            .build()
            .await
    }
}

/// Turn a non-zero status from the service into an error.
pub fn check_status(status: i32) -> Result<(), Box<dyn std::error::Error>> {
    if status == 0 {
        return Ok(());
    }
    match Error::from_status_code(status) {
        Some(e) => Err(format!("{} (status {})", e, status).into()),
        None => Err(format!("service returned status {}", status).into()),
    }
}

/// Parse a reset target: `all`, `wr`, `rd`, or a raw code in decimal or
/// `0x` hex. Raw codes are passed through unchecked.
pub fn parse_control_code(s: &str) -> Result<u32, String> {
    match s.to_ascii_lowercase().as_str() {
        "all" => Ok(Command::ResetAll.code()),
        "wr" | "write" => Ok(Command::ResetWritePos.code()),
        "rd" | "read" => Ok(Command::ResetReadPos.code()),
        other => {
            let parsed = match other.strip_prefix("0x") {
                Some(hex) => u32::from_str_radix(hex, 16),
                None => other.parse::<u32>(),
            };
            parsed.map_err(|_| format!("invalid control command: {}", s))
        }
    }
}

/// Whitespace-separated tokens of `input`, at most `n` of them.
pub fn tokens(input: &str, n: usize) -> Vec<String> {
    input.split_whitespace().take(n).map(str::to_string).collect()
}

/// Read stdin to the end and return its first `n` tokens.
pub fn read_stdin_tokens(n: usize) -> io::Result<Vec<String>> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    Ok(tokens(&input, n))
}
