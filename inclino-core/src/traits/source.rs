//! Inertial sample source trait

use inclino_hal::I2cBusError;

use crate::attitude::RawBurst;

/// Errors that can occur while reading a sample source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SourceError {
    /// Bus transaction failed
    Transport,
    /// Identity register returned an unexpected value
    IdentityMismatch(u8),
}

impl From<I2cBusError> for SourceError {
    fn from(_: I2cBusError) -> Self {
        SourceError::Transport
    }
}

/// Trait for anything that produces raw accel/gyro bursts
///
/// Implemented by the hardware IMU driver and by the synthetic generator
/// used on benches without a sensor. The acquisition loop only sees this
/// trait.
pub trait SampleSource {
    /// Bring the source out of reset and verify its identity
    ///
    /// Called once before the first `read_burst`. An
    /// [`SourceError::IdentityMismatch`] is permanent; transport errors may
    /// be retried.
    fn init(&mut self) -> Result<(), SourceError>;

    /// Read one 14-byte accel/temperature/gyro burst
    fn read_burst(&mut self) -> Result<RawBurst, SourceError>;
}
