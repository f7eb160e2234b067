//! Start/halt coordination for a polling loop.
//!
//! A loop claims the running slot with [`Lifecycle::begin`], sleeps through
//! [`Lifecycle::sleep_or_stop`] once per cycle and releases the slot with
//! [`Lifecycle::finish`]. [`Lifecycle::halt`] requests a stop and waits for
//! that release.

use core::cell::Cell;

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};

pub(crate) struct Lifecycle<M: RawMutex> {
    running: Mutex<M, Cell<bool>>,
    stop: Signal<M, ()>,
    stopped: Signal<M, ()>,
}

impl<M: RawMutex> Lifecycle<M> {
    pub(crate) const fn new() -> Self {
        Self {
            running: Mutex::new(Cell::new(false)),
            stop: Signal::new(),
            stopped: Signal::new(),
        }
    }

    /// Claim the running slot. Returns `false` if a loop already holds it.
    ///
    /// The signals are cleared under the same lock that claims the slot, so
    /// a halt can only observe the loop as running after the clear.
    pub(crate) fn begin(&self) -> bool {
        self.running.lock(|running| {
            if running.get() {
                return false;
            }
            // Drop leftovers from a halt that raced a previous finish.
            self.stop.reset();
            self.stopped.reset();
            running.set(true);
            true
        })
    }

    /// Wait for `interval` or a stop request, whichever comes first.
    ///
    /// Returns `true` when the loop must exit. A pending stop request wins
    /// over an expired timer.
    pub(crate) async fn sleep_or_stop(&self, interval: Duration) -> bool {
        match select(self.stop.wait(), Timer::after(interval)).await {
            Either::First(()) => true,
            Either::Second(()) => false,
        }
    }

    /// Release the running slot and acknowledge any pending halt.
    pub(crate) fn finish(&self) {
        self.running.lock(|running| {
            self.stopped.signal(());
            running.set(false);
        });
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.lock(|running| running.get())
    }

    /// Request a stop and wait until the loop has exited.
    ///
    /// Returns immediately if no loop is running. Only one caller may wait
    /// on a given loop at a time.
    pub(crate) async fn halt(&self) {
        let requested = self.running.lock(|running| {
            if running.get() {
                self.stop.signal(());
            }
            running.get()
        });
        if requested {
            self.stopped.wait().await;
        }
    }
}
