//! Sample source implementations
//!
//! This crate provides concrete implementations of the
//! [`SampleSource`](inclino_core::traits::SampleSource) trait defined in
//! inclino-core:
//!
//! - MPU-6050 / MPU-6500 accelerometer and gyroscope over I2C
//! - Synthetic tilt generator for benches without a sensor
//! - [`ImuSource`], choosing between the two at startup

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod imu;
pub mod synthetic;

pub use imu::{ImuSource, Mpu6050};
pub use synthetic::SyntheticSource;
