//! Board-agnostic attitude pipeline for the dashboard level
//!
//! This crate contains all logic of the pitch/roll instrument that does
//! not depend on a specific board:
//!
//! - Sample source trait (hardware IMU or synthetic generator)
//! - Sample decoder (raw burst to calibrated pitch/roll)
//! - Shared attitude state between the acquisition and display tasks
//! - Display mapper (clamp, map, change suppression)
//! - Calibration store and calibration workflow
//! - Configuration defaults
//!
//! ```text
//! SampleSource ──► Acquisition ──► SharedAttitude ──► DisplayMapper ──► UI
//!                      ▲                 │
//!                      │ offset          ▼
//!               CalibrationStore ◄── Calibrator
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod acquisition;
pub mod attitude;
pub mod calibration;
pub mod config;
pub mod display;
pub mod shared;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;
