//! Level instrument configuration
//!
//! Compile-time defaults for timing, mapping and mounting. The firmware
//! starts from [`LevelConfig::new`] and overrides fields per board.
//! User settings that change at runtime (offsets, inversion) are not
//! here; they live in flash, see [`crate::calibration::CalibrationStore`].

use embassy_time::Duration;

use crate::attitude::AxisMap;
use crate::display::MappingPolicy;

/// Default MPU-6050 address (AD0 low)
pub const DEFAULT_SENSOR_ADDRESS: u8 = 0x68;

/// Timing, mapping and mounting parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LevelConfig {
    /// Acquisition ticker period
    pub sample_period: Duration,
    /// Display mapper ticker period
    pub display_period: Duration,
    /// How long a display tick waits for the attitude lock
    pub lock_timeout: Duration,
    /// How long calibration waits for the attitude lock
    pub calibration_read_timeout: Duration,
    /// Samples older than this are not captured as a zero point
    pub max_sample_age: Duration,
    /// How long a calibration request waits for confirmation
    pub confirm_window: Duration,
    /// Pause after a failed bus read
    pub transport_backoff: Duration,
    /// Consecutive failures before the sensor is reported degraded
    pub degraded_after: u16,
    /// Degrees to display units
    pub mapping: MappingPolicy,
    /// Sensor angle to pitch/roll assignment
    pub mounting: AxisMap,
    /// 7-bit I2C address of the IMU
    pub sensor_address: u8,
}

impl LevelConfig {
    pub const fn new() -> Self {
        Self {
            sample_period: Duration::from_millis(100),
            display_period: Duration::from_millis(100),
            lock_timeout: Duration::from_millis(20),
            calibration_read_timeout: Duration::from_secs(1),
            max_sample_age: Duration::from_secs(1),
            confirm_window: Duration::from_secs(10),
            transport_backoff: Duration::from_millis(100),
            degraded_after: 10,
            mapping: MappingPolicy::Identity,
            mounting: AxisMap::REFERENCE,
            sensor_address: DEFAULT_SENSOR_ADDRESS,
        }
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self::new()
    }
}
