//! MPU-6050 accelerometer and gyroscope (I2C)
//!
//! The MPU-6050 powers up asleep. `init` checks WHO_AM_I, clears the
//! sleep bit and selects the ±2 g / ±250 °/s ranges the decoder scales
//! for. Each poll is a single 14-byte burst starting at ACCEL_XOUT_H,
//! which covers accel X/Y/Z, temperature and gyro X/Y/Z.
//!
//! The register-compatible MPU-6500 (WHO_AM_I = 0x70) is accepted too.

use inclino_core::attitude::{RawBurst, BURST_LEN};
use inclino_core::traits::{SampleSource, SourceError};
use inclino_hal::{I2cBus, RegisterAccess};

/// MPU-6050 register addresses
pub mod reg {
    /// Sample rate divider
    pub const SMPLRT_DIV: u8 = 0x19;
    /// DLPF configuration
    pub const CONFIG: u8 = 0x1A;
    /// Gyroscope full-scale range
    pub const GYRO_CONFIG: u8 = 0x1B;
    /// Accelerometer full-scale range
    pub const ACCEL_CONFIG: u8 = 0x1C;
    /// First byte of the accel/temp/gyro burst
    pub const ACCEL_XOUT_H: u8 = 0x3B;
    /// Power management 1 (bit 6 = SLEEP)
    pub const PWR_MGMT_1: u8 = 0x6B;
    /// Device identity
    pub const WHO_AM_I: u8 = 0x75;
}

/// I2C address with AD0 low
pub const ADDRESS: u8 = 0x68;

/// I2C address with AD0 high
pub const ADDRESS_ALT: u8 = 0x69;

/// WHO_AM_I of the MPU-6050
pub const MPU6050_WHO_AM_I: u8 = 0x68;

/// WHO_AM_I of the MPU-6500
pub const MPU6500_WHO_AM_I: u8 = 0x70;

/// Wake, internal oscillator
const PWR_MGMT_1_WAKE: u8 = 0x00;
/// FS_SEL = 0 (±250 °/s)
const GYRO_FS_250: u8 = 0x00;
/// AFS_SEL = 0 (±2 g)
const ACCEL_FS_2G: u8 = 0x00;

/// MPU-6050 on an I2C bus
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Mpu6050<I> {
    bus: I,
    address: u8,
}

impl<I: I2cBus> Mpu6050<I> {
    /// Create a driver for the device at `address`
    pub fn new(bus: I, address: u8) -> Self {
        Self { bus, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Release the bus
    pub fn release(self) -> I {
        self.bus
    }

    /// Read the identity register
    pub fn who_am_i(&mut self) -> Result<u8, SourceError> {
        self.bus
            .read_register(self.address, reg::WHO_AM_I)
            .map_err(|_| SourceError::Transport)
    }

    fn write(&mut self, register: u8, value: u8) -> Result<(), SourceError> {
        self.bus
            .write_register(self.address, register, value)
            .map_err(|_| SourceError::Transport)
    }
}

impl<I: I2cBus> SampleSource for Mpu6050<I> {
    fn init(&mut self) -> Result<(), SourceError> {
        let id = self.who_am_i()?;
        #[cfg(feature = "defmt")]
        defmt::debug!("IMU at {:#x} reports WHO_AM_I {:#x}", self.address, id);
        if id != MPU6050_WHO_AM_I && id != MPU6500_WHO_AM_I {
            return Err(SourceError::IdentityMismatch(id));
        }

        self.write(reg::PWR_MGMT_1, PWR_MGMT_1_WAKE)?;
        self.write(reg::GYRO_CONFIG, GYRO_FS_250)?;
        self.write(reg::ACCEL_CONFIG, ACCEL_FS_2G)?;
        Ok(())
    }

    fn read_burst(&mut self) -> Result<RawBurst, SourceError> {
        let mut buf = [0u8; BURST_LEN];
        self.bus
            .read_registers(self.address, reg::ACCEL_XOUT_H, &mut buf)
            .map_err(|_| SourceError::Transport)?;
        Ok(RawBurst::new(buf))
    }
}
