//! Digital-pin read capability.
//!
//! The drivers in this crate never own pins directly. They address lines by
//! [`PinId`] through a shared [`DigitalReader`] connection, so one board
//! connection can back the encoder lines and the push button at once.
//!
//! [`InputPinReader`] adapts a fixed table of `embedded-hal` input pins to
//! that interface.

use core::cell::RefCell;
use core::fmt;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embedded_hal::digital::{Error as _, ErrorKind, InputPin};

// ── PinLevel ─────────────────────────────────────────────────────────────

/// Instantaneous binary level of a digital line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinLevel {
    Low,
    High,
}

impl PinLevel {
    pub fn is_high(self) -> bool {
        self == PinLevel::High
    }

    pub fn is_low(self) -> bool {
        self == PinLevel::Low
    }
}

impl From<bool> for PinLevel {
    fn from(high: bool) -> Self {
        if high {
            PinLevel::High
        } else {
            PinLevel::Low
        }
    }
}

impl From<PinLevel> for bool {
    fn from(level: PinLevel) -> Self {
        level.is_high()
    }
}

// ── PinId ────────────────────────────────────────────────────────────────

/// Opaque label of an addressable input line (e.g. `"GP14"` or `"clk"`).
///
/// Immutable once constructed; compared by label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinId(&'static str);

impl PinId {
    pub const fn new(label: &'static str) -> Self {
        Self(label)
    }

    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.0)
    }
}

// ── DigitalReader ────────────────────────────────────────────────────────

/// A connection able to sample the level of a named digital line.
///
/// Reads are synchronous and must be cheap enough to call at the polling
/// interval of every driver sharing the connection. Errors are cloned into
/// notifications, hence the `Clone` bound.
pub trait DigitalReader {
    type Error: Clone;

    fn digital_read(&self, pin: PinId) -> Result<PinLevel, Self::Error>;
}

impl<T: DigitalReader + ?Sized> DigitalReader for &T {
    type Error = T::Error;

    fn digital_read(&self, pin: PinId) -> Result<PinLevel, Self::Error> {
        (**self).digital_read(pin)
    }
}

// ── embedded-hal adapter ─────────────────────────────────────────────────

/// Failure reading through an [`InputPinReader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPinError {
    /// No pin with this label is registered with the reader.
    UnknownPin(PinId),
    /// The HAL pin reported an error.
    Pin(ErrorKind),
}

impl fmt::Display for InputPinError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InputPinError::UnknownPin(pin) => write!(f, "no input pin registered as {}", pin),
            InputPinError::Pin(kind) => write!(f, "input pin error: {}", kind),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for InputPinError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            InputPinError::UnknownPin(pin) => defmt::write!(f, "Unknown pin {}", pin.as_str()),
            InputPinError::Pin(_) => defmt::write!(f, "Input pin error"),
        }
    }
}

/// [`DigitalReader`] over a fixed table of `embedded-hal` input pins.
///
/// `embedded-hal` pins need `&mut self` to be read, so each pin sits behind
/// its own blocking mutex and the reader can be shared by reference.
///
/// # Example
///
/// ```ignore
/// use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
/// use rotary_encoder_driver::{InputPinReader, PinId};
///
/// let reader: InputPinReader<CriticalSectionRawMutex, _, 3> = InputPinReader::new([
///     (PinId::new("clk"), clk_input),
///     (PinId::new("dt"), dt_input),
///     (PinId::new("sw"), sw_input),
/// ]);
/// ```
pub struct InputPinReader<M: RawMutex, P, const N: usize> {
    pins: [(PinId, Mutex<M, RefCell<P>>); N],
}

impl<M: RawMutex, P: InputPin, const N: usize> InputPinReader<M, P, N> {
    pub fn new(pins: [(PinId, P); N]) -> Self {
        Self {
            pins: pins.map(|(id, pin)| (id, Mutex::new(RefCell::new(pin)))),
        }
    }
}

impl<M: RawMutex, P: InputPin, const N: usize> DigitalReader for InputPinReader<M, P, N> {
    type Error = InputPinError;

    fn digital_read(&self, pin: PinId) -> Result<PinLevel, Self::Error> {
        let (_, slot) = self
            .pins
            .iter()
            .find(|(id, _)| *id == pin)
            .ok_or(InputPinError::UnknownPin(pin))?;

        slot.lock(|cell| cell.borrow_mut().is_high())
            .map(PinLevel::from)
            .map_err(|e| InputPinError::Pin(e.kind()))
    }
}
