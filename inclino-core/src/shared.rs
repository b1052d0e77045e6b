//! State shared between the acquisition, display and calibration tasks
//!
//! [`SharedAttitude`] is a single-slot "latest sample" cell. The producer
//! overwrites it on every successful decode; consumers read it with a
//! bounded wait and may skip samples. A reader sees either the previous
//! sample or the new one in full, never a partially written value.
//!
//! [`LevelState`] bundles that slot with the active calibration offset and
//! the inversion flag. It is created once at startup and handed out by
//! shared reference.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{with_timeout, Duration};

use crate::attitude::PhysicalSample;
use crate::calibration::CalibrationOffset;

/// Lock not acquired within the allowed time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LockTimeout;

/// Latest decoded sample, last writer wins
pub struct SharedAttitude<M: RawMutex> {
    slot: Mutex<M, Option<PhysicalSample>>,
}

impl<M: RawMutex> SharedAttitude<M> {
    /// Empty slot; reads return `None` until the first write
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Replace the stored sample
    pub async fn write(&self, sample: PhysicalSample) {
        *self.slot.lock().await = Some(sample);
    }

    /// Copy the stored sample, waiting at most `timeout` for the lock
    pub async fn try_read(
        &self,
        timeout: Duration,
    ) -> Result<Option<PhysicalSample>, LockTimeout> {
        with_timeout(timeout, self.slot.lock())
            .await
            .map(|guard| *guard)
            .map_err(|_| LockTimeout)
    }

    /// Hold the slot lock, for exercising readers against a busy writer
    #[cfg(test)]
    pub(crate) async fn hold(
        &self,
    ) -> embassy_sync::mutex::MutexGuard<'_, M, Option<PhysicalSample>> {
        self.slot.lock().await
    }

    /// Copy the stored sample without waiting
    pub fn peek(&self) -> Result<Option<PhysicalSample>, LockTimeout> {
        self.slot
            .try_lock()
            .map(|guard| *guard)
            .map_err(|_| LockTimeout)
    }
}

impl<M: RawMutex> Default for SharedAttitude<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Runtime state of the level instrument
pub struct LevelState<M: RawMutex> {
    attitude: SharedAttitude<M>,
    offset: BlockingMutex<M, Cell<CalibrationOffset>>,
    inverted: BlockingMutex<M, Cell<bool>>,
}

impl<M: RawMutex> LevelState<M> {
    pub const fn new() -> Self {
        Self {
            attitude: SharedAttitude::new(),
            offset: BlockingMutex::new(Cell::new(CalibrationOffset::ZERO)),
            inverted: BlockingMutex::new(Cell::new(false)),
        }
    }

    pub fn attitude(&self) -> &SharedAttitude<M> {
        &self.attitude
    }

    /// Offset applied by the decoder
    pub fn offset(&self) -> CalibrationOffset {
        self.offset.lock(|cell| cell.get())
    }

    pub fn set_offset(&self, offset: CalibrationOffset) {
        self.offset.lock(|cell| cell.set(offset));
    }

    /// Display both axes negated (upside-down mounting)
    pub fn inverted(&self) -> bool {
        self.inverted.lock(|cell| cell.get())
    }

    pub fn set_inverted(&self, inverted: bool) {
        self.inverted.lock(|cell| cell.set(inverted));
    }
}

impl<M: RawMutex> Default for LevelState<M> {
    fn default() -> Self {
        Self::new()
    }
}
