//! Display mapping
//!
//! Turns calibrated samples into the bounded integer values and labels
//! the UI draws, suppressing updates that would not change anything.

pub mod mapper;

pub use mapper::{
    clamp_angle, AxisReading, DisplayMapper, LevelUpdate, MappingPolicy, ANGLE_LIMIT_DEG,
    LABEL_CAPACITY,
};
