use crate::buffer::{Command, DeviceBuffer, Whence};
use crate::error::Error;
use crate::status::StatusReporter;
use log::info;

pub const DEVICE_NAME: &str = "kocd";

/// The single buffer endpoint and its diagnostic channel.
///
/// Operations are plain synchronous calls on `&mut self`. Whoever hosts the
/// device decides how callers share it; nothing here orders a sequence of
/// calls from different callers.
#[derive(Debug)]
pub struct Device {
    buffer: DeviceBuffer,
    reporter: StatusReporter,
}

impl Device {
    pub fn new(capacity: usize) -> Self {
        let device = Self {
            buffer: DeviceBuffer::new(capacity),
            reporter: StatusReporter::new(),
        };
        info!("Initialization of {} device", DEVICE_NAME);
        info!("buffer capacity = {}", capacity);
        device.buffer.log_snapshot();
        device
    }

    pub fn buffer(&self) -> &DeviceBuffer {
        &self.buffer
    }

    pub fn open(&self) {
        info!("open");
    }

    pub fn release(&self) {
        info!("close");
    }

    pub fn write(&mut self, data: &[u8]) -> usize {
        let written = self.buffer.write(data, data.len());
        info!("writing {} bytes", written);
        self.buffer.log_snapshot();
        written
    }

    pub fn read(&mut self, max_len: usize) -> Vec<u8> {
        let bytes = self.buffer.read(max_len);
        info!("reading {} bytes", bytes.len());
        self.buffer.log_snapshot();
        bytes
    }

    /// Seek with a wire-level whence value.
    pub fn seek(&mut self, offset: i64, whence: i32) -> Result<usize, Error> {
        let whence = Whence::try_from(whence)?;
        let pos = self.buffer.seek(offset, whence)?;
        info!("seek to {} ({:?} {})", pos, whence, offset);
        Ok(pos)
    }

    /// Run a control command given by its wire-level code.
    pub fn control(&mut self, code: u32) -> Result<(), Error> {
        let command = Command::try_from(code)?;
        self.buffer.control(command);
        info!("control {:?} (0x{:X})", command, code);
        self.buffer.log_snapshot();
        Ok(())
    }

    /// Opening the diagnostic channel starts a new report session.
    pub fn status_open(&mut self) {
        info!("status open");
        self.reporter.begin_session();
    }

    pub fn status_release(&self) {
        info!("status release");
    }

    pub fn status_read(&mut self, max_len: usize) -> Vec<u8> {
        let chunk = self.reporter.read(&self.buffer, max_len);
        info!(
            "status read {} bytes, cursor at {}",
            chunk.len(),
            self.reporter.report_pos()
        );
        chunk
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        info!("exit");
    }
}
