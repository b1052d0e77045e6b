//! Raw burst to pitch/roll decoding
//!
//! Attitude is derived from the gravity vector only. Each sample is
//! decoded on its own; there is no filtering across samples.
//!
//! Two tilt angles are computed from the accelerometer:
//!
//! ```text
//! angle_yz = atan2(ay, az)   rotation about the sensor X axis
//! angle_xz = atan2(ax, az)   rotation about the sensor Y axis
//! ```
//!
//! `atan2` covers the full ±180° range and is defined for `az == 0`, so
//! no reading can divide by zero. Which angle becomes pitch and which
//! becomes roll depends on how the board is mounted, see [`AxisMap`].

use embassy_time::Instant;

use super::sample::{Attitude, ImuReading, PhysicalSample, RawBurst};
use crate::calibration::CalibrationOffset;

/// One of the two tilt angles the accelerometer yields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorAngle {
    /// `atan2(ay, az)`
    AboutX,
    /// `atan2(ax, az)`
    AboutY,
}

/// Fixed assignment of sensor angles to vehicle pitch and roll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisMap {
    pub pitch: SensorAngle,
    pub roll: SensorAngle,
}

impl AxisMap {
    /// Board mounted rotated 90° to the vehicle: rotation about the
    /// sensor X axis is vehicle pitch.
    pub const REFERENCE: Self = Self {
        pitch: SensorAngle::AboutX,
        roll: SensorAngle::AboutY,
    };

    /// Sensor axes aligned with the vehicle axes
    pub const ALIGNED: Self = Self {
        pitch: SensorAngle::AboutY,
        roll: SensorAngle::AboutX,
    };
}

impl Default for AxisMap {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// Stateless sample decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decoder {
    map: AxisMap,
}

impl Decoder {
    pub const fn new(map: AxisMap) -> Self {
        Self { map }
    }

    pub fn axis_map(&self) -> AxisMap {
        self.map
    }

    /// Pitch/roll of a burst before any calibration offset
    pub fn raw_attitude(&self, reading: &ImuReading) -> Attitude {
        let [ax, ay, az] = reading.accel_g;
        let about_x = libm::atan2f(ay, az).to_degrees();
        let about_y = libm::atan2f(ax, az).to_degrees();

        let pick = |angle: SensorAngle| match angle {
            SensorAngle::AboutX => about_x,
            SensorAngle::AboutY => about_y,
        };

        Attitude::new(pick(self.map.pitch), pick(self.map.roll))
    }

    /// Decode a burst into a calibrated sample
    ///
    /// Pure: the same inputs always yield the same sample.
    pub fn decode(
        &self,
        burst: &RawBurst,
        offset: CalibrationOffset,
        timestamp: Instant,
    ) -> PhysicalSample {
        let reading = ImuReading::from_burst(burst);
        let raw = self.raw_attitude(&reading);

        PhysicalSample {
            attitude: offset.apply(raw),
            raw,
            temperature_c: reading.temperature_c,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ONE_G: i16 = 16384;

    fn burst_for(pitch_deg: f32, roll_deg: f32) -> RawBurst {
        // REFERENCE map: pitch = atan2(ay, az), roll = atan2(ax, az)
        let az = ONE_G as f32 * 0.9;
        let ay = az * libm::tanf(pitch_deg.to_radians());
        let ax = az * libm::tanf(roll_deg.to_radians());
        RawBurst::from_words(
            [
                libm::roundf(ax) as i16,
                libm::roundf(ay) as i16,
                libm::roundf(az) as i16,
            ],
            0,
            [0, 0, 0],
        )
    }

    #[test]
    fn test_level_reads_zero() {
        let decoder = Decoder::new(AxisMap::REFERENCE);
        let burst = RawBurst::from_words([0, 0, ONE_G], 0, [0, 0, 0]);

        let sample = decoder.decode(&burst, CalibrationOffset::ZERO, Instant::from_ticks(0));

        assert!(sample.attitude.pitch_deg.abs() < 0.01);
        assert!(sample.attitude.roll_deg.abs() < 0.01);
        assert!((sample.temperature_c - 36.53).abs() < 0.01);
    }

    #[test]
    fn test_matching_offset_zeroes_attitude() {
        let decoder = Decoder::new(AxisMap::REFERENCE);
        let burst = burst_for(2.0, -1.5);
        let offset = CalibrationOffset::new(2.0, -1.5);

        let sample = decoder.decode(&burst, offset, Instant::from_ticks(0));

        assert!((sample.raw.pitch_deg - 2.0).abs() < 0.01);
        assert!((sample.raw.roll_deg + 1.5).abs() < 0.01);
        assert!(sample.attitude.pitch_deg.abs() < 0.01);
        assert!(sample.attitude.roll_deg.abs() < 0.01);
    }

    #[test]
    fn test_offset_is_subtracted() {
        let decoder = Decoder::default();
        let burst = burst_for(10.0, 5.0);
        let offset = CalibrationOffset::new(3.0, -2.0);

        let sample = decoder.decode(&burst, offset, Instant::from_ticks(0));

        assert!((sample.attitude.pitch_deg - 7.0).abs() < 0.01);
        assert!((sample.attitude.roll_deg - 7.0).abs() < 0.01);
    }

    #[test]
    fn test_aligned_map_swaps_axes() {
        let burst = burst_for(12.0, -4.0);
        let reference = Decoder::new(AxisMap::REFERENCE)
            .decode(&burst, CalibrationOffset::ZERO, Instant::from_ticks(0));
        let aligned = Decoder::new(AxisMap::ALIGNED)
            .decode(&burst, CalibrationOffset::ZERO, Instant::from_ticks(0));

        assert_eq!(reference.attitude.pitch_deg, aligned.attitude.roll_deg);
        assert_eq!(reference.attitude.roll_deg, aligned.attitude.pitch_deg);
    }

    #[test]
    fn test_zero_z_axis_is_defined() {
        let decoder = Decoder::default();
        let burst = RawBurst::from_words([0, ONE_G, 0], 0, [0, 0, 0]);

        let sample = decoder.decode(&burst, CalibrationOffset::ZERO, Instant::from_ticks(0));

        assert!((sample.attitude.pitch_deg - 90.0).abs() < 0.01);
        assert!(sample.attitude.roll_deg.abs() < 0.01);
    }

    #[test]
    fn test_upside_down_reaches_half_turn() {
        let decoder = Decoder::default();
        let burst = RawBurst::from_words([0, 1, -ONE_G], 0, [0, 0, 0]);

        let sample = decoder.decode(&burst, CalibrationOffset::ZERO, Instant::from_ticks(0));

        assert!(sample.attitude.pitch_deg > 179.0);
    }

    proptest! {
        #[test]
        fn prop_decode_is_pure(
            accel in prop::array::uniform3(any::<i16>()),
            gyro in prop::array::uniform3(any::<i16>()),
            temperature in any::<i16>(),
            pitch_off in -30.0f32..30.0,
            roll_off in -30.0f32..30.0,
            ticks in any::<u32>(),
        ) {
            let decoder = Decoder::default();
            let burst = RawBurst::from_words(accel, temperature, gyro);
            let offset = CalibrationOffset::new(pitch_off, roll_off);
            let at = Instant::from_ticks(ticks as u64);

            let first = decoder.decode(&burst, offset, at);
            let second = decoder.decode(&burst, offset, at);

            prop_assert_eq!(first, second);
            prop_assert!(first.attitude.pitch_deg.is_finite());
            prop_assert!(first.attitude.roll_deg.is_finite());
        }

        #[test]
        fn prop_angles_within_half_turn(accel in prop::array::uniform3(any::<i16>())) {
            let decoder = Decoder::default();
            let burst = RawBurst::from_words(accel, 0, [0, 0, 0]);

            let raw = decoder.raw_attitude(&ImuReading::from_burst(&burst));

            prop_assert!(raw.pitch_deg.abs() <= 180.0 + 1e-3);
            prop_assert!(raw.roll_deg.abs() <= 180.0 + 1e-3);
        }
    }
}
