use crate::config::{BusKind, ServiceConfig};
use crate::device::Device;
use log::{error, warn};
use std::sync::Arc;
use tokio::sync::Mutex;
use zbus::{connection, interface, Connection};

pub const DEVICE_PATH: &str = "/io/kocd/Device";
pub const STATUS_PATH: &str = "/io/kocd/Status";

/// The device as shared by both endpoints. The lock makes each call run to
/// completion; it does not order calls coming from different clients.
pub type SharedDevice = Arc<Mutex<Device>>;

pub fn shared(device: Device) -> SharedDevice {
    Arc::new(Mutex::new(device))
}

/// Drop the caller's handle on the device. Returns true when that was the
/// last handle and the device has been torn down.
pub fn release(device: SharedDevice) -> bool {
    match Arc::try_unwrap(device) {
        Ok(mutex) => {
            drop(mutex.into_inner());
            true
        }
        Err(still_shared) => {
            warn!(
                "Device still held by {} other handle(s)",
                Arc::strong_count(&still_shared) - 1
            );
            false
        }
    }
}

/// Main endpoint: file-like access to the buffer.
pub struct DeviceEndpoint(SharedDevice);

impl DeviceEndpoint {
    pub fn new(device: SharedDevice) -> Self {
        Self(device)
    }
}

#[interface(name = "io.kocd.Device")]
impl DeviceEndpoint {
    async fn open(&self) {
        self.0.lock().await.open();
    }

    async fn close(&self) {
        self.0.lock().await.release();
    }

    /// Write returns (status, bytes_written). Status is always 0.
    async fn write(&mut self, data: Vec<u8>) -> (i32, u64) {
        let written = self.0.lock().await.write(&data);
        (0, written as u64)
    }

    /// Read returns (status, bytes) with at most `max_len` bytes.
    async fn read(&mut self, max_len: u64) -> (i32, Vec<u8>) {
        let max_len = usize::try_from(max_len).unwrap_or(usize::MAX);
        (0, self.0.lock().await.read(max_len))
    }

    /// Seek returns (status, new_read_pos). `whence` is 0 (start),
    /// 1 (current) or 2 (end of capacity).
    async fn seek(&mut self, offset: i64, whence: i32) -> (i32, i64) {
        match self.0.lock().await.seek(offset, whence) {
            Ok(pos) => (0, pos as i64),
            Err(e) => {
                error!("Error seeking to {} (whence {}): {}", offset, whence, e);
                (e.to_status_code(), 0)
            }
        }
    }

    /// Control runs one of the reset commands 0xF0, 0xF1, 0xF2.
    async fn control(&mut self, code: u32) -> i32 {
        match self.0.lock().await.control(code) {
            Ok(()) => 0,
            Err(e) => {
                error!("Error running control command 0x{:X}: {}", code, e);
                e.to_status_code()
            }
        }
    }
}

/// Read-only diagnostic endpoint.
pub struct StatusEndpoint(SharedDevice);

impl StatusEndpoint {
    pub fn new(device: SharedDevice) -> Self {
        Self(device)
    }
}

#[interface(name = "io.kocd.Status")]
impl StatusEndpoint {
    /// Open starts a new report session from the beginning.
    async fn open(&mut self) {
        self.0.lock().await.status_open();
    }

    async fn close(&self) {
        self.0.lock().await.status_release();
    }

    /// Read returns (status, chunk); an empty chunk marks the end of the report.
    async fn read(&mut self, max_len: u64) -> (i32, Vec<u8>) {
        let max_len = usize::try_from(max_len).unwrap_or(usize::MAX);
        (0, self.0.lock().await.status_read(max_len))
    }
}

/// Claim the configured bus name and serve both endpoints.
pub async fn serve(cfg: &ServiceConfig, device: SharedDevice) -> zbus::Result<Connection> {
    let builder = match cfg.bus {
        BusKind::Session => connection::Builder::session()?,
        BusKind::System => connection::Builder::system()?,
    };
    builder
        .name(cfg.name.as_str())?
        .serve_at(DEVICE_PATH, DeviceEndpoint::new(device.clone()))?
        .serve_at(STATUS_PATH, StatusEndpoint::new(device))?
        .build()
        .await
}
