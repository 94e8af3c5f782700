//! Authoritative time of day and the signals around it.
//!
//! The tick interrupt raises a single-slot pulse with [`TimeStore::tick`].
//! The advance task consumes it, steps the time under the lock, releases the
//! lock and only then raises the change notification. Both signals coalesce:
//! any number of raises before the waiter runs collapse into one wakeup.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;

use crate::clock::TimeOfDay;
use crate::config;
use crate::{Error, Result};

pub struct TimeStore<M: RawMutex> {
    time: Mutex<M, RefCell<TimeOfDay>>,
    pulse: Signal<M, ()>,
    changed: Signal<M, ()>,
}

impl<M: RawMutex> TimeStore<M> {
    /// A store reading [`config::INITIAL_TIME`], as after every cold start.
    pub const fn new() -> Self {
        Self::with_time(config::INITIAL_TIME)
    }

    pub const fn with_time(time: TimeOfDay) -> Self {
        Self {
            time: Mutex::new(RefCell::new(time)),
            pulse: Signal::new(),
            changed: Signal::new(),
        }
    }

    pub(crate) fn locked<R>(&self, f: impl FnOnce(&mut TimeOfDay) -> R) -> Result<R> {
        self.time.lock(|cell| {
            let mut time = cell.try_borrow_mut().map_err(|_| Error::LockHeld)?;
            Ok(f(&mut time))
        })
    }

    /// Raises the pending-advance pulse. Safe to call from interrupt context.
    pub fn tick(&self) {
        self.pulse.signal(());
    }

    pub async fn wait_tick(&self) {
        self.pulse.wait().await;
    }

    /// Steps the time by one second and notifies the display path.
    pub fn advance(&self) -> Result<TimeOfDay> {
        let time = self.locked(|time| {
            time.tick();
            *time
        })?;
        trace!("advanced to {}", time);
        self.changed.signal(());
        Ok(time)
    }

    pub fn get(&self) -> Result<TimeOfDay> {
        self.locked(|time| *time)
    }

    /// Replaces the time wholesale. Does not raise the change notification;
    /// the display picks the new value up on the next advance.
    pub fn set(&self, value: TimeOfDay) -> Result<()> {
        value.validate()?;
        self.locked(|time| *time = value)
    }

    /// Waits for the next change notification and returns the time as it is
    /// once the wait ends, which may be several advances past the one that
    /// raised it.
    pub async fn wait_for_change(&self) -> Result<TimeOfDay> {
        self.changed.wait().await;
        self.get()
    }
}

impl<M: RawMutex> Default for TimeStore<M> {
    fn default() -> Self {
        Self::new()
    }
}
