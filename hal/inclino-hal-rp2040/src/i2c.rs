//! I2C bus adapter
//!
//! Wraps an `embedded-hal` blocking I2C master (such as
//! `embassy_rp::i2c::I2c<'d, T, Blocking>`) and implements the
//! `inclino-hal` bus trait on top of it.

use embassy_rp::i2c::{Blocking, I2c};
use embedded_hal::i2c::{Error as _, ErrorKind, I2c as HalI2cMaster};

pub use inclino_hal::i2c::{I2cBusError, I2cConfig};

/// `inclino_hal::I2cBus` over an `embedded-hal` I2C master
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HalI2c<B> {
    bus: B,
}

impl<B> HalI2c<B> {
    /// Wrap an initialized I2C master
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Release the underlying bus
    pub fn release(self) -> B {
        self.bus
    }
}

/// Blocking RP2040 I2C peripheral behind the `inclino-hal` trait
pub type Rp2040I2c<'d, T> = HalI2c<I2c<'d, T, Blocking>>;

/// Build the embassy-rp I2C configuration for a bus speed
pub fn rp_config(config: I2cConfig) -> embassy_rp::i2c::Config {
    let mut cfg = embassy_rp::i2c::Config::default();
    cfg.frequency = config.frequency;
    cfg
}

fn classify(kind: ErrorKind) -> I2cBusError {
    match kind {
        ErrorKind::Bus => I2cBusError::Bus,
        ErrorKind::ArbitrationLoss => I2cBusError::ArbitrationLost,
        ErrorKind::NoAcknowledge(_) => I2cBusError::Nack,
        ErrorKind::Overrun => I2cBusError::Overrun,
        _ => I2cBusError::Other,
    }
}

impl<B: HalI2cMaster> inclino_hal::I2cBus for HalI2c<B> {
    type Error = I2cBusError;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.bus.write(address, data).map_err(|e| classify(e.kind()))
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.bus.read(address, buf).map_err(|e| classify(e.kind()))
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.bus
            .write_read(address, write_data, read_buf)
            .map_err(|e| {
                let error = classify(e.kind());
                #[cfg(feature = "defmt")]
                defmt::trace!("I2C write_read at {:#x} failed: {}", address, error);
                error
            })
    }
}
