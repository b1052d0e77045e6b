//! Sample data types
//!
//! A [`RawBurst`] is the 14-byte register dump read from the IMU on every
//! poll. It is converted into physical units ([`ImuReading`]) and from there
//! into a calibrated [`PhysicalSample`].

use embassy_time::{Duration, Instant};

/// Length of one accel/temperature/gyro register burst
pub const BURST_LEN: usize = 14;

/// Accelerometer sensitivity at ±2 g full scale (LSB per g)
pub const ACCEL_LSB_PER_G: f32 = 16384.0;

/// Gyroscope sensitivity at ±250 °/s full scale (LSB per °/s)
pub const GYRO_LSB_PER_DPS: f32 = 131.0;

/// Temperature sensitivity (LSB per °C)
pub const TEMP_LSB_PER_C: f32 = 340.0;

/// Temperature at raw reading 0 (°C)
pub const TEMP_OFFSET_C: f32 = 36.53;

/// Raw register burst
///
/// Seven big-endian signed 16-bit words in register order:
/// accel X/Y/Z, temperature, gyro X/Y/Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawBurst([u8; BURST_LEN]);

impl RawBurst {
    /// Wrap bytes exactly as read from the bus
    pub const fn new(bytes: [u8; BURST_LEN]) -> Self {
        Self(bytes)
    }

    /// Build a burst from register words
    pub fn from_words(accel: [i16; 3], temperature: i16, gyro: [i16; 3]) -> Self {
        let words = [
            accel[0],
            accel[1],
            accel[2],
            temperature,
            gyro[0],
            gyro[1],
            gyro[2],
        ];
        let mut bytes = [0u8; BURST_LEN];
        for (chunk, word) in bytes.chunks_exact_mut(2).zip(words) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        Self(bytes)
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; BURST_LEN] {
        &self.0
    }

    fn word(&self, index: usize) -> i16 {
        i16::from_be_bytes([self.0[2 * index], self.0[2 * index + 1]])
    }

    /// Accelerometer X/Y/Z counts
    pub fn accel_raw(&self) -> [i16; 3] {
        [self.word(0), self.word(1), self.word(2)]
    }

    /// Temperature counts
    pub fn temperature_raw(&self) -> i16 {
        self.word(3)
    }

    /// Gyroscope X/Y/Z counts
    pub fn gyro_raw(&self) -> [i16; 3] {
        [self.word(4), self.word(5), self.word(6)]
    }
}

/// A burst converted to physical units
///
/// Gyro rates and temperature are diagnostic only; the attitude is
/// derived from the gravity vector alone.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImuReading {
    /// Acceleration X/Y/Z in g
    pub accel_g: [f32; 3],
    /// Angular rate X/Y/Z in °/s
    pub gyro_dps: [f32; 3],
    /// Die temperature in °C
    pub temperature_c: f32,
}

impl ImuReading {
    /// Scale a raw burst into physical units
    pub fn from_burst(burst: &RawBurst) -> Self {
        let accel = burst.accel_raw();
        let gyro = burst.gyro_raw();
        Self {
            accel_g: accel.map(|c| c as f32 / ACCEL_LSB_PER_G),
            gyro_dps: gyro.map(|c| c as f32 / GYRO_LSB_PER_DPS),
            temperature_c: burst.temperature_raw() as f32 / TEMP_LSB_PER_C + TEMP_OFFSET_C,
        }
    }
}

/// Pitch and roll in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Attitude {
    /// Forward/backward tilt
    pub pitch_deg: f32,
    /// Left/right tilt
    pub roll_deg: f32,
}

impl Attitude {
    /// Level
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(pitch_deg: f32, roll_deg: f32) -> Self {
        Self {
            pitch_deg,
            roll_deg,
        }
    }

    /// Both axes negated (upside-down mounting)
    pub fn negated(self) -> Self {
        Self::new(-self.pitch_deg, -self.roll_deg)
    }
}

/// One decoded, calibrated sample
///
/// `attitude` has the calibration offset subtracted. `raw` keeps the
/// angles before the offset so calibration can capture them as the new
/// zero point.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhysicalSample {
    /// Calibrated attitude
    pub attitude: Attitude,
    /// Attitude before offset subtraction
    pub raw: Attitude,
    /// Sensor die temperature in °C
    pub temperature_c: f32,
    /// When the burst was read
    pub timestamp: Instant,
}

impl PhysicalSample {
    /// Time elapsed between the read and `now` (zero if `now` is earlier)
    pub fn age(&self, now: Instant) -> Duration {
        now.checked_duration_since(self.timestamp)
            .unwrap_or(Duration::from_ticks(0))
    }
}
