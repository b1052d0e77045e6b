//! Inertial measurement units

pub mod mpu6050;

pub use mpu6050::Mpu6050;

use inclino_core::attitude::RawBurst;
use inclino_core::traits::{SampleSource, SourceError};
use inclino_hal::I2cBus;

use crate::synthetic::SyntheticSource;

/// Sample source chosen at startup
///
/// Lets the firmware pick hardware or synthetic data without making its
/// tasks generic.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ImuSource<I> {
    Hardware(Mpu6050<I>),
    Synthetic(SyntheticSource),
}

impl<I: I2cBus> SampleSource for ImuSource<I> {
    fn init(&mut self) -> Result<(), SourceError> {
        match self {
            ImuSource::Hardware(imu) => imu.init(),
            ImuSource::Synthetic(synthetic) => synthetic.init(),
        }
    }

    fn read_burst(&mut self) -> Result<RawBurst, SourceError> {
        match self {
            ImuSource::Hardware(imu) => imu.read_burst(),
            ImuSource::Synthetic(synthetic) => synthetic.read_burst(),
        }
    }
}
