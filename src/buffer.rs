use crate::error::Error;
use log::{debug, log_enabled, trace, Level};

const BYTES_IN_LINE: usize = 16;

/// Largest capacity whose storage (capacity + 1 bytes) fits an allocation.
pub const MAX_CAPACITY: usize = isize::MAX as usize - 1;

/// Reference point for a seek offset. Wire values are 0, 1 and 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    FromStart,
    FromCurrent,
    /// Relative to `capacity`, not to the write cursor.
    FromEnd,
}

impl Whence {
    pub fn code(self) -> i32 {
        match self {
            Whence::FromStart => 0,
            Whence::FromCurrent => 1,
            Whence::FromEnd => 2,
        }
    }
}

impl TryFrom<i32> for Whence {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self, Error> {
        match value {
            0 => Ok(Whence::FromStart),
            1 => Ok(Whence::FromCurrent),
            2 => Ok(Whence::FromEnd),
            _ => Err(Error::InvalidArgument),
        }
    }
}

/// Out-of-band control commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Zero the storage and both cursors.
    ResetAll,
    ResetWritePos,
    ResetReadPos,
}

impl Command {
    pub const RESET_ALL: u32 = 0xF0;
    pub const RESET_WRITE_POS: u32 = 0xF1;
    pub const RESET_READ_POS: u32 = 0xF2;

    pub fn code(self) -> u32 {
        match self {
            Command::ResetAll => Self::RESET_ALL,
            Command::ResetWritePos => Self::RESET_WRITE_POS,
            Command::ResetReadPos => Self::RESET_READ_POS,
        }
    }
}

impl TryFrom<u32> for Command {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Error> {
        match value {
            Self::RESET_ALL => Ok(Command::ResetAll),
            Self::RESET_WRITE_POS => Ok(Command::ResetWritePos),
            Self::RESET_READ_POS => Ok(Command::ResetReadPos),
            _ => Err(Error::UnsupportedCommand),
        }
    }
}

/// Fixed-capacity linear byte buffer with independent write and read cursors.
///
/// Writes append at `write_pos` until it reaches `capacity`; there is no
/// wrap-around, so a full buffer stays full until a reset command. Reads
/// consume from `read_pos` up to `write_pos`. Seeking only moves `read_pos`
/// and is bounded by `capacity`, so it may leave `read_pos` ahead of
/// `write_pos`; reads then see nothing available.
///
/// Storage holds one extra trailing byte that is never written, so the
/// contents always have a terminator.
#[derive(Debug)]
pub struct DeviceBuffer {
    storage: Vec<u8>,
    capacity: usize,
    write_pos: usize,
    read_pos: usize,
}

impl DeviceBuffer {
    /// `capacity` must not exceed [`MAX_CAPACITY`].
    pub fn new(capacity: usize) -> Self {
        Self {
            storage: vec![0; capacity + 1],
            capacity,
            write_pos: 0,
            read_pos: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    pub fn read_pos(&self) -> usize {
        self.read_pos
    }

    /// Raw storage, including the trailing terminator byte.
    pub fn storage(&self) -> &[u8] {
        &self.storage
    }

    /// Storage up to (not including) the first zero byte.
    pub fn contents(&self) -> &[u8] {
        let end = self
            .storage
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.capacity);
        &self.storage[..end]
    }

    pub fn free_space(&self) -> usize {
        self.capacity.saturating_sub(self.write_pos)
    }

    /// Bytes between the read and write cursors, zero when a seek has put
    /// the read cursor past the write cursor.
    pub fn available(&self) -> usize {
        self.write_pos.saturating_sub(self.read_pos)
    }

    /// Append up to `requested_len` bytes of `src`. Returns how many were
    /// stored, which is 0 once the buffer is full.
    pub fn write(&mut self, src: &[u8], requested_len: usize) -> usize {
        let to_write = requested_len.min(src.len()).min(self.free_space());
        let start = self.write_pos;
        self.storage[start..start + to_write].copy_from_slice(&src[..to_write]);
        self.write_pos += to_write;
        to_write
    }

    /// Copy up to `requested_len` unread bytes into `dest`.
    ///
    /// Fails with [`Error::CopyFault`] and moves nothing if `dest` cannot
    /// hold the bytes that would be copied.
    pub fn read_into(&mut self, dest: &mut [u8], requested_len: usize) -> Result<usize, Error> {
        let to_read = requested_len.min(self.available());
        let dest = dest.get_mut(..to_read).ok_or(Error::CopyFault)?;
        let start = self.read_pos;
        dest.copy_from_slice(&self.storage[start..start + to_read]);
        self.read_pos += to_read;
        Ok(to_read)
    }

    /// Allocating variant of [`DeviceBuffer::read_into`].
    pub fn read(&mut self, requested_len: usize) -> Vec<u8> {
        let mut out = vec![0; requested_len.min(self.available())];
        // `out` is sized for exactly what read_into copies.
        match self.read_into(&mut out, requested_len) {
            Ok(n) => out.truncate(n),
            Err(_) => out.clear(),
        }
        out
    }

    /// Move the read cursor. Returns the new position.
    ///
    /// The target must land in `[0, capacity]`; otherwise the cursor is left
    /// where it was and [`Error::InvalidArgument`] is returned.
    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<usize, Error> {
        let base = match whence {
            Whence::FromStart => Some(0),
            Whence::FromCurrent => i64::try_from(self.read_pos).ok(),
            Whence::FromEnd => i64::try_from(self.capacity).ok(),
        };
        let target = base
            .and_then(|base| match whence {
                Whence::FromEnd => base.checked_sub(offset),
                _ => base.checked_add(offset),
            })
            .ok_or(Error::InvalidArgument)?;
        let new_pos = usize::try_from(target).map_err(|_| Error::InvalidArgument)?;
        if new_pos > self.capacity {
            return Err(Error::InvalidArgument);
        }
        self.read_pos = new_pos;
        Ok(new_pos)
    }

    pub fn control(&mut self, command: Command) {
        match command {
            Command::ResetAll => {
                self.storage.fill(0);
                self.write_pos = 0;
                self.read_pos = 0;
            }
            Command::ResetWritePos => self.write_pos = 0,
            Command::ResetReadPos => self.read_pos = 0,
        }
    }

    /// Emit the buffer state to the log: the text view at debug level and a
    /// hex dump of the whole storage at trace level.
    pub fn log_snapshot(&self) {
        debug!("[{}]", String::from_utf8_lossy(self.contents()));
        if log_enabled!(Level::Trace) {
            for line in hex_lines(&self.storage[..self.capacity]) {
                trace!("{}", line);
            }
        }
    }
}

fn hex_lines(bytes: &[u8]) -> Vec<String> {
    bytes
        .chunks(BYTES_IN_LINE)
        .map(|chunk| {
            chunk
                .iter()
                .map(|b| format!("{:x}", b))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}
