//! Push-button sub-driver.
//!
//! [`ButtonDriver`] polls a single line on its own cadence and publishes
//! [`ButtonEvent::Push`] / [`ButtonEvent::Release`] when the level changes.
//! It is started alongside the encoder but halted independently.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::pubsub::Error as PubSubError;

use crate::config::ButtonConfig;
use crate::error::{ConfigError, PinReadError};
use crate::event::{ButtonChannel, ButtonEvent, ButtonSubscriber};
use crate::lifecycle::Lifecycle;
use crate::pin::{DigitalReader, PinId, PinLevel};

/// Polling driver for a binary push button.
pub struct ButtonDriver<'a, M: RawMutex, R: DigitalReader> {
    connection: &'a R,
    config: ButtonConfig,
    events: ButtonChannel<M, R::Error>,
    active: Mutex<M, Cell<bool>>,
    lifecycle: Lifecycle<M>,
}

impl<'a, M: RawMutex, R: DigitalReader> ButtonDriver<'a, M, R> {
    /// Create a stopped button driver reading through `connection`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroInterval`] for a zero polling interval.
    pub fn new(connection: &'a R, config: ButtonConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            connection,
            config,
            events: ButtonChannel::new(),
            active: Mutex::new(Cell::new(false)),
            lifecycle: Lifecycle::new(),
        })
    }

    pub fn pin(&self) -> PinId {
        self.config.pin
    }

    pub fn config(&self) -> &ButtonConfig {
        &self.config
    }

    /// Whether the last observed level differs from the default level.
    pub fn is_active(&self) -> bool {
        self.active.lock(|active| active.get())
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle.is_running()
    }

    pub fn subscribe(&self) -> Result<ButtonSubscriber<'_, M, R::Error>, PubSubError> {
        self.events.subscriber()
    }

    /// Polling loop. Runs until [`halt`](Self::halt) is called.
    ///
    /// Returns at once if this button is already being polled.
    pub async fn run(&self) {
        if !self.lifecycle.begin() {
            #[cfg(feature = "defmt")]
            defmt::warn!("button {}: already running", self.config.pin.as_str());
            return;
        }

        #[cfg(feature = "defmt")]
        defmt::info!("button {}: started", self.config.pin.as_str());

        let mut state = self.config.default_level;
        loop {
            self.sample(&mut state);

            if self.lifecycle.sleep_or_stop(self.config.interval).await {
                break;
            }
        }

        self.lifecycle.finish();

        #[cfg(feature = "defmt")]
        defmt::info!("button {}: halted", self.config.pin.as_str());
    }

    /// Stop the polling loop and wait until it has exited.
    ///
    /// Returns immediately if the loop is not running.
    pub async fn halt(&self) {
        self.lifecycle.halt().await;
    }

    /// One polling cycle. `state` is the last level seen by this loop.
    fn sample(&self, state: &mut PinLevel) {
        let publisher = self.events.immediate_publisher();

        match self.connection.digital_read(self.config.pin) {
            Err(error) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("button {}: read failed", self.config.pin.as_str());
                publisher.publish_immediate(ButtonEvent::Error(PinReadError {
                    pin: self.config.pin,
                    error,
                }));
            }
            Ok(level) if level != *state => {
                *state = level;
                let pushed = level != self.config.default_level;
                self.active.lock(|active| active.set(pushed));
                publisher.publish_immediate(if pushed {
                    ButtonEvent::Push
                } else {
                    ButtonEvent::Release
                });
            }
            Ok(_) => {}
        }
    }
}
