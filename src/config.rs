//! Driver configuration.
//!
//! [`EncoderConfig`] holds the only options the encoder takes: its three
//! pins and the polling interval. [`ButtonConfig`] describes the push-button
//! sub-driver, which polls on its own, slower cadence.

use embassy_time::Duration;

use crate::error::ConfigError;
use crate::pin::{PinId, PinLevel};

/// Default encoder polling interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Default push-button polling interval.
pub const DEFAULT_BUTTON_INTERVAL: Duration = Duration::from_millis(10);

// ── EncoderConfig ────────────────────────────────────────────────────────

/// Configuration of a [`RotaryEncoderDriver`](crate::RotaryEncoderDriver).
///
/// [`EncoderConfig::new()`] uses a 1 ms polling interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Encoder `clk` (A) line.
    pub clk_pin: PinId,
    /// Encoder `dt` (B) line.
    pub dt_pin: PinId,
    /// Shaft push-button line.
    pub sw_pin: PinId,
    /// Time between two samples of the `clk`/`dt` pair. Must be non-zero.
    pub interval: Duration,
}

impl EncoderConfig {
    pub const fn new(clk_pin: PinId, dt_pin: PinId, sw_pin: PinId) -> Self {
        Self {
            clk_pin,
            dt_pin,
            sw_pin,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Check the interval is non-zero and the three pins are distinct.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.as_ticks() == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.dt_pin == self.clk_pin {
            return Err(ConfigError::DuplicatePin(self.dt_pin));
        }
        if self.sw_pin == self.clk_pin || self.sw_pin == self.dt_pin {
            return Err(ConfigError::DuplicatePin(self.sw_pin));
        }
        Ok(())
    }

    /// Button configuration derived from `sw_pin` with default settings.
    pub const fn button_config(&self) -> ButtonConfig {
        ButtonConfig::new(self.sw_pin)
    }
}

// ── ButtonConfig ─────────────────────────────────────────────────────────

/// Configuration of a [`ButtonDriver`](crate::ButtonDriver).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonConfig {
    /// Button line.
    pub pin: PinId,
    /// Time between two samples. Default: 10 ms.
    pub interval: Duration,
    /// Level read while the button is released. Default: `Low`.
    pub default_level: PinLevel,
}

impl ButtonConfig {
    pub const fn new(pin: PinId) -> Self {
        Self {
            pin,
            interval: DEFAULT_BUTTON_INTERVAL,
            default_level: PinLevel::Low,
        }
    }

    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Button wired to ground with a pull-up: released reads `High`.
    pub const fn active_low(mut self) -> Self {
        self.default_level = PinLevel::High;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.as_ticks() == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }
}
