//! Quadrature decoding.
//!
//! A one-bit-memory state machine: it remembers the last sampled level of
//! the `clk` line and, when `clk` changes, infers the direction of rotation
//! from the current `dt` level. It knows nothing about time or I/O; the
//! polling interval only decides how densely it is sampled.
//!
//! ```text
//! last_clk  clk   dt    edge
//! ────────  ────  ────  ─────────────────
//!   x       == x  any   none
//!   High    Low   High  Clockwise
//!   High    Low   Low   CounterClockwise
//!   Low     High  any   none (clk still recorded)
//! ```

use crate::pin::PinLevel;

/// Direction of one detected rotation edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    /// Position change contributed by one edge in this direction.
    pub fn delta(self) -> i32 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }
}

/// Decode one sample.
///
/// Returns the `clk` level to remember for the next sample and the edge
/// detected in this one, if any. Total over all eight inputs.
pub fn decode(last_clk: PinLevel, clk: PinLevel, dt: PinLevel) -> (PinLevel, Option<Direction>) {
    if clk == last_clk {
        return (last_clk, None);
    }

    // clk XOR dt is 1 exactly when the lines differ.
    let lines_differ = clk != dt;

    let edge = match clk {
        PinLevel::Low if lines_differ => Some(Direction::Clockwise),
        PinLevel::Low => Some(Direction::CounterClockwise),
        PinLevel::High => None,
    };

    (clk, edge)
}

/// Stateful wrapper around [`decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoder {
    last_clk: PinLevel,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// A decoder that assumes `clk` was `High` before the first sample.
    pub const fn new() -> Self {
        Self {
            last_clk: PinLevel::High,
        }
    }

    /// Feed a freshly sampled `(clk, dt)` pair.
    pub fn update(&mut self, clk: PinLevel, dt: PinLevel) -> Option<Direction> {
        let (next, edge) = decode(self.last_clk, clk, dt);
        self.last_clk = next;
        edge
    }

    pub fn last_clk(&self) -> PinLevel {
        self.last_clk
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────
