// src/error.rs

use std::fmt;

/// Error kinds returned by buffer, status and control operations.
///
/// A failed call never changes device state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Bad whence, or a seek target outside `[0, capacity]`.
    InvalidArgument,
    /// The caller-side destination cannot take the bytes.
    CopyFault,
    /// Unknown control command code.
    UnsupportedCommand,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument => write!(f, "Invalid argument"),
            Error::CopyFault => write!(f, "Bad address while copying data"),
            Error::UnsupportedCommand => write!(f, "Unsupported control command"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Maps the `Error` to the negative errno returned over the wire.
    pub fn to_status_code(&self) -> i32 {
        match self {
            Error::InvalidArgument => -libc::EINVAL,
            Error::CopyFault => -libc::EFAULT,
            Error::UnsupportedCommand => -libc::ENOTTY,
        }
    }

    /// Inverse of [`Error::to_status_code`]. Returns `None` for success and
    /// for codes this service never produces.
    pub fn from_status_code(code: i32) -> Option<Self> {
        match code.checked_neg()? {
            libc::EINVAL => Some(Error::InvalidArgument),
            libc::EFAULT => Some(Error::CopyFault),
            libc::ENOTTY => Some(Error::UnsupportedCommand),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_are_negative_errno() {
        assert_eq!(Error::InvalidArgument.to_status_code(), -22);
        assert_eq!(Error::CopyFault.to_status_code(), -14);
        assert_eq!(Error::UnsupportedCommand.to_status_code(), -25);
    }

    #[test]
    fn test_status_code_roundtrip() {
        for e in [Error::InvalidArgument, Error::CopyFault, Error::UnsupportedCommand] {
            assert_eq!(Error::from_status_code(e.to_status_code()), Some(e));
        }
        assert_eq!(Error::from_status_code(0), None);
        assert_eq!(Error::from_status_code(-1), None);
        assert_eq!(Error::from_status_code(i32::MIN), None);
    }
}
