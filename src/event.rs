//! Notifications published by the drivers.
//!
//! Every driver instance owns its own [`PubSubChannel`]; there is no
//! process-wide event bus. Publishing never blocks: when a subscriber lags
//! behind by more than [`EVENT_CAPACITY`] messages the oldest one is dropped.

use embassy_sync::pubsub::{PubSubChannel, Subscriber};

use crate::decoder::Direction;
use crate::error::PinReadError;

/// Messages buffered per channel.
pub const EVENT_CAPACITY: usize = 16;

/// Subscribers allowed per channel.
pub const MAX_SUBSCRIBERS: usize = 4;

/// Publishers per channel. The drivers publish through immediate
/// publishers, which do not take a slot.
pub const MAX_PUBLISHERS: usize = 1;

/// Notification from a [`RotaryEncoderDriver`](crate::RotaryEncoderDriver).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncoderEvent<E> {
    /// The encoder moved one step.
    Rotation {
        direction: Direction,
        /// Position after applying this step.
        position: i32,
    },
    /// One of the encoder pins could not be read this cycle.
    Error(PinReadError<E>),
}

/// Notification from a [`ButtonDriver`](crate::ButtonDriver).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent<E> {
    /// The button left its default level.
    Push,
    /// The button returned to its default level.
    Release,
    /// The button pin could not be read this cycle.
    Error(PinReadError<E>),
}

pub type EncoderChannel<M, E> =
    PubSubChannel<M, EncoderEvent<E>, EVENT_CAPACITY, MAX_SUBSCRIBERS, MAX_PUBLISHERS>;

pub type EncoderSubscriber<'a, M, E> =
    Subscriber<'a, M, EncoderEvent<E>, EVENT_CAPACITY, MAX_SUBSCRIBERS, MAX_PUBLISHERS>;

pub type ButtonChannel<M, E> =
    PubSubChannel<M, ButtonEvent<E>, EVENT_CAPACITY, MAX_SUBSCRIBERS, MAX_PUBLISHERS>;

pub type ButtonSubscriber<'a, M, E> =
    Subscriber<'a, M, ButtonEvent<E>, EVENT_CAPACITY, MAX_SUBSCRIBERS, MAX_PUBLISHERS>;
