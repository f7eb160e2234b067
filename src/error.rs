//! Error types for the encoder driver.

use core::fmt;

use crate::pin::PinId;

/// A failed read of one pin during one polling cycle.
///
/// Carried by the `Error` notifications of both drivers. Never fatal: the
/// next cycle's read is the retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinReadError<E> {
    /// Line whose read failed.
    pub pin: PinId,
    /// Failure reported by the connection.
    pub error: E,
}

impl<E: fmt::Debug> fmt::Display for PinReadError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Failed to read pin {}: {:?}", self.pin, self.error)
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for PinReadError<E> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Failed to read pin {}: {}", self.pin.as_str(), self.error)
    }
}

/// Invalid driver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The polling interval must be longer than zero.
    ZeroInterval,

    /// The same pin was assigned to more than one encoder line.
    DuplicatePin(PinId),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::ZeroInterval => write!(f, "Polling interval must be greater than zero"),
            ConfigError::DuplicatePin(pin) => write!(f, "Pin {} is assigned more than once", pin),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ConfigError::ZeroInterval => defmt::write!(f, "Zero polling interval"),
            ConfigError::DuplicatePin(pin) => defmt::write!(f, "Duplicate pin {}", pin.as_str()),
        }
    }
}
