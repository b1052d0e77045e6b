//! I2C bus abstractions
//!
//! Provides traits for I2C master operations that can be implemented
//! by chip-specific HALs, plus the register-oriented access pattern
//! used by inertial sensors.

/// I2C bus master
///
/// Provides basic I2C read/write operations for communicating with
/// peripheral devices.
pub trait I2cBus {
    /// Error type for I2C operations
    type Error: core::fmt::Debug;

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Read data from a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `buf` - Buffer to read into
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write then read in a single transaction (repeated start)
    ///
    /// This is commonly used to write a register address then read data.
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `write_data` - Bytes to write (typically register address)
    /// * `read_buf` - Buffer to read into
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error>;
}

/// Register-oriented access on top of an [`I2cBus`]
///
/// Most sensors expose a flat register file with an auto-incrementing
/// address pointer: a burst read starting at `register` returns
/// consecutive registers.
pub trait RegisterAccess: I2cBus {
    /// Read `buf.len()` consecutive registers starting at `register`
    fn read_registers(
        &mut self,
        device: u8,
        register: u8,
        buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.write_read(device, &[register], buf)
    }

    /// Read a single register
    fn read_register(&mut self, device: u8, register: u8) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.read_registers(device, register, &mut buf)?;
        Ok(buf[0])
    }

    /// Write a single register
    fn write_register(&mut self, device: u8, register: u8, value: u8) -> Result<(), Self::Error> {
        self.write(device, &[register, value])
    }
}

// Blanket implementation for all I2cBus types
impl<T: I2cBus> RegisterAccess for T {}

/// Chip-independent I2C error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cBusError {
    /// Bus error (misplaced start/stop)
    Bus,
    /// Arbitration lost
    ArbitrationLost,
    /// NACK received (device absent or busy)
    Nack,
    /// Timeout
    Timeout,
    /// Overrun
    Overrun,
    /// Other error
    Other,
}

/// I2C configuration
#[derive(Debug, Clone, Copy)]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::FAST
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self { frequency: 100_000 };

    /// Fast mode (400 kHz), the MPU-6050 maximum
    pub const FAST: Self = Self { frequency: 400_000 };
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bus with a 256-byte register file at a single address
    struct RegisterFile {
        address: u8,
        regs: [u8; 256],
    }

    impl I2cBus for RegisterFile {
        type Error = I2cBusError;

        fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
            if address != self.address {
                return Err(I2cBusError::Nack);
            }
            let start = data[0] as usize;
            for (i, byte) in data[1..].iter().enumerate() {
                self.regs[start + i] = *byte;
            }
            Ok(())
        }

        fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
            self.write_read(address, &[0], buf)
        }

        fn write_read(
            &mut self,
            address: u8,
            write_data: &[u8],
            read_buf: &mut [u8],
        ) -> Result<(), Self::Error> {
            if address != self.address {
                return Err(I2cBusError::Nack);
            }
            let start = write_data[0] as usize;
            read_buf.copy_from_slice(&self.regs[start..start + read_buf.len()]);
            Ok(())
        }
    }

    #[test]
    fn test_register_write_then_read() {
        let mut bus = RegisterFile {
            address: 0x68,
            regs: [0; 256],
        };

        bus.write_register(0x68, 0x6B, 0x40).unwrap();
        assert_eq!(bus.read_register(0x68, 0x6B).unwrap(), 0x40);
    }

    #[test]
    fn test_burst_read_is_consecutive() {
        let mut regs = [0u8; 256];
        for (i, r) in regs.iter_mut().enumerate() {
            *r = i as u8;
        }
        let mut bus = RegisterFile {
            address: 0x68,
            regs,
        };

        let mut buf = [0u8; 14];
        bus.read_registers(0x68, 0x3B, &mut buf).unwrap();
        assert_eq!(buf[0], 0x3B);
        assert_eq!(buf[13], 0x3B + 13);
    }

    #[test]
    fn test_wrong_address_nacks() {
        let mut bus = RegisterFile {
            address: 0x68,
            regs: [0; 256],
        };

        assert_eq!(bus.read_register(0x69, 0x75), Err(I2cBusError::Nack));
    }
}
