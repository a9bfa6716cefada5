//! Errors reported by the BMP280 driver.
//!
//! [`Error`] is generic over the error type of the underlying [`Bus`](crate::bus::Bus),
//! so transport failures keep their original detail.

use core::fmt;

/// A mode, oversampling, standby or filter value outside of its register field
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InvalidArgument;

#[derive(Debug, PartialEq)]
pub enum Error<E> {
    /// The register bus failed
    Bus(E),
    /// The identity register did not hold the BMP280 chip id, contains what was read
    DeviceNotFound(u8),
    /// `ctrl_meas` read back differently from what was written
    ConfigVerificationFailed { expected: u8, actual: u8 },
    /// Rejected before any bus access
    InvalidArgument,
    /// The measuring bit stayed set for the whole poll policy
    PollTimeout,
    /// Calibration has not been loaded by a successful `init`
    NotInitialized,
}

impl<E> From<InvalidArgument> for Error<E> {
    fn from(_: InvalidArgument) -> Self {
        Error::InvalidArgument
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Bus(e) => write!(f, "bus error: {:?}", e),
            Error::DeviceNotFound(id) => write!(f, "device not found, chip id 0x{:02x}", id),
            Error::ConfigVerificationFailed { expected, actual } => write!(
                f,
                "ctrl_meas verification failed, wrote 0x{:02x} read 0x{:02x}",
                expected, actual
            ),
            Error::InvalidArgument => write!(f, "invalid argument"),
            Error::PollTimeout => write!(f, "timed out waiting for measurement"),
            Error::NotInitialized => write!(f, "driver not initialized"),
        }
    }
}
