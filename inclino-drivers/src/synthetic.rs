//! Synthetic tilt generator
//!
//! Produces bursts for a sensor slowly rocking about both axes, so the
//! display path can be exercised on a board without an IMU. Angles
//! follow triangle waves; the roll wave lags the pitch wave by a quarter
//! period at half the amplitude.
//!
//! Angles are in the sensor frame: `about_x` is `atan2(ay, az)` and
//! `about_y` is `atan2(ax, az)`. Which one ends up as pitch depends on
//! the decoder's axis map.

use inclino_core::attitude::{RawBurst, ACCEL_LSB_PER_G};
use inclino_core::traits::{SampleSource, SourceError};

/// Raw temperature reading of about 27.5 °C
const TEMP_RAW: i16 = -3070;

/// Vertical component used when building bursts, in g
///
/// Below 1 g so the horizontal components stay in range at steep angles.
const Z_G: f32 = 0.8;

/// Triangle-wave tilt generator
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SyntheticSource {
    amplitude_deg: f32,
    period: u32,
    step: u32,
}

impl SyntheticSource {
    /// `period` is the number of reads per full swing, at least 4
    pub fn new(amplitude_deg: f32, period: u32) -> Self {
        Self {
            amplitude_deg,
            period: period.max(4),
            step: 0,
        }
    }

    /// Sensor-frame angles (about X, about Y) at a given step
    pub fn angles_at(&self, step: u32) -> (f32, f32) {
        let about_x = self.amplitude_deg * triangle(step, self.period);
        let lagged = step.wrapping_add(self.period / 4);
        let about_y = 0.5 * self.amplitude_deg * triangle(lagged, self.period);
        (about_x, about_y)
    }

    /// Burst whose accelerometer reads the given sensor-frame angles
    pub fn burst_for(about_x_deg: f32, about_y_deg: f32) -> RawBurst {
        let az = Z_G * ACCEL_LSB_PER_G;
        let ay = az * libm::tanf(about_x_deg.to_radians());
        let ax = az * libm::tanf(about_y_deg.to_radians());

        RawBurst::from_words(
            [to_count(ax), to_count(ay), to_count(az)],
            TEMP_RAW,
            [0, 0, 0],
        )
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new(20.0, 100)
    }
}

impl SampleSource for SyntheticSource {
    fn init(&mut self) -> Result<(), SourceError> {
        self.step = 0;
        Ok(())
    }

    fn read_burst(&mut self) -> Result<RawBurst, SourceError> {
        let (about_x, about_y) = self.angles_at(self.step);
        self.step = (self.step + 1) % self.period;
        Ok(Self::burst_for(about_x, about_y))
    }
}

/// Triangle wave in [-1, 1]: 0 at step 0, 1 at a quarter period
fn triangle(step: u32, period: u32) -> f32 {
    let phase = (step % period) as f32 / period as f32;
    if phase < 0.25 {
        4.0 * phase
    } else if phase < 0.75 {
        2.0 - 4.0 * phase
    } else {
        4.0 * phase - 4.0
    }
}

fn to_count(value: f32) -> i16 {
    libm::roundf(value).clamp(i16::MIN as f32, i16::MAX as f32) as i16
}
