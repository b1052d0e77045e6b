//! Attitude sensing
//!
//! Decoding of raw IMU register bursts into pitch/roll samples.

pub mod decoder;
pub mod sample;

pub use decoder::{AxisMap, Decoder, SensorAngle};
pub use sample::{
    Attitude, ImuReading, PhysicalSample, RawBurst, ACCEL_LSB_PER_G, BURST_LEN, GYRO_LSB_PER_DPS,
};
