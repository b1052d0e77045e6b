//! Inclino Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the attitude pipeline
//! is written against. Chip-specific HALs implement them so the same core
//! logic runs on the target and in host tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  inclino-core / inclino-drivers         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  inclino-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ inclino-hal-  │       │  test doubles │
//! │    rp2040     │       │  (host only)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`i2c::I2cBus`] - I2C bus operations
//! - [`i2c::RegisterAccess`] - register-oriented reads/writes on top of `I2cBus`
//! - [`flash::FlashStorage`] - Persistent key/value storage

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod i2c;

// Re-export key traits at crate root for convenience
pub use flash::{FlashError, FlashStorage, StorageKey};
pub use i2c::{I2cBus, I2cBusError, RegisterAccess};
