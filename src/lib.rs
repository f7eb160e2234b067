//! Async polling driver for mechanical quadrature rotary encoders.
//!
//! This crate decodes the two phase-shifted lines (`clk`, `dt`) of a
//! mechanical rotary encoder into a signed position and publishes a
//! notification for every step, using Embassy for timing and signalling.
//!
//! # Architecture
//!
//! - **[`decoder`]**: pure one-bit state machine turning `(clk, dt)` samples
//!   into [`Direction`]s. No I/O, no time.
//! - **[`RotaryEncoderDriver`]**: the sampler: reads both pins every
//!   interval, drives the decoder, tracks the position and publishes
//!   [`EncoderEvent`]s. Also starts the shaft's [`ButtonDriver`].
//! - **[`DigitalReader`]**: the pin-read capability both drivers sample
//!   through. [`InputPinReader`] adapts `embedded-hal` input pins.
//!
//! Read failures never stop a loop: they are published as `Error` events
//! and the next cycle retries.
//!
//! # Quick start
//!
//! ```ignore
//! use rotary_encoder_driver::{EncoderConfig, EncoderEvent, PinId, RotaryEncoderDriver};
//!
//! let config = EncoderConfig::new(PinId::new("clk"), PinId::new("dt"), PinId::new("sw"));
//! let encoder = RotaryEncoderDriver::<CriticalSectionRawMutex, _>::new(&pins, config)?;
//! let mut events = encoder.subscribe()?;
//!
//! // In one task:
//! encoder.run().await;
//!
//! // In another:
//! if let EncoderEvent::Rotation { direction, position } = events.next_message_pure().await {
//!     // ...
//! }
//! ```
//!
//! # Features
//!
//! - **`defmt`**: structured logging via [`defmt`] and [`defmt::Format`]
//!   implementations on public types.

#![cfg_attr(not(test), no_std)]

pub mod decoder;

mod button;
mod config;
mod driver;
mod error;
mod event;
mod lifecycle;
mod pin;

pub use button::ButtonDriver;
pub use config::{ButtonConfig, EncoderConfig, DEFAULT_BUTTON_INTERVAL, DEFAULT_POLL_INTERVAL};
pub use decoder::{Decoder, Direction};
pub use driver::{RotaryEncoderDriver, DEFAULT_NAME, NAME_CAPACITY};
pub use error::{ConfigError, PinReadError};
pub use event::{
    ButtonChannel, ButtonEvent, ButtonSubscriber, EncoderChannel, EncoderEvent, EncoderSubscriber,
    EVENT_CAPACITY, MAX_PUBLISHERS, MAX_SUBSCRIBERS,
};
pub use pin::{DigitalReader, InputPinError, InputPinReader, PinId, PinLevel};
