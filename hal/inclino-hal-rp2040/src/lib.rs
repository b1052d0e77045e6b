//! RP2040-specific HAL for the Inclino dashboard firmware
//!
//! This crate provides RP2040 implementations of the shared
//! `inclino-hal` traits:
//!
//! - I2C bus adapter over any `embedded-hal` I2C master (implements `inclino_hal::I2cBus`)
//! - Flash storage driver (implements `inclino_hal::FlashStorage`)

#![no_std]

pub mod flash;
pub mod i2c;

// Re-export shared traits from inclino-hal for convenience
pub use inclino_hal::{FlashStorage as FlashStorageTrait, I2cBus, StorageKey};
