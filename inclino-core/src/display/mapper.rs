//! Per-tick display mapper
//!
//! On every display tick the mapper reads the latest sample, applies the
//! inversion flag, clamps both angles to ±30°, maps them to integer
//! display units and compares the result with what it last emitted. Only
//! axes whose mapped value changed are sent to the UI.

use core::fmt::Write;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Duration;
use heapless::String;

use crate::attitude::PhysicalSample;
use crate::shared::LevelState;

/// Largest angle shown on the level, in degrees
pub const ANGLE_LIMIT_DEG: f32 = 30.0;

/// Room for labels such as "-30.0°"
pub const LABEL_CAPACITY: usize = 12;

/// Clamp an angle to ±[`ANGLE_LIMIT_DEG`]; NaN clamps to zero
pub fn clamp_angle(deg: f32) -> f32 {
    if deg.is_nan() {
        0.0
    } else {
        deg.clamp(-ANGLE_LIMIT_DEG, ANGLE_LIMIT_DEG)
    }
}

/// Mapping from clamped degrees to display units
///
/// The same policy is used for pitch and roll.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MappingPolicy {
    /// One degree per unit, range ±30
    #[default]
    Identity,
    /// Linear up to `knee_deg`, compressed beyond it
    ///
    /// `[0, knee_deg]` maps to `[0, knee_units]` and
    /// `[knee_deg, 30]` maps to `[knee_units, range_max]`, mirrored for
    /// negative angles.
    CompressedTail {
        knee_deg: f32,
        knee_units: i16,
        range_max: i16,
    },
}

impl MappingPolicy {
    /// Largest magnitude this policy produces
    pub fn range_max(&self) -> i16 {
        match *self {
            MappingPolicy::Identity => ANGLE_LIMIT_DEG as i16,
            MappingPolicy::CompressedTail { range_max, .. } => range_max,
        }
    }

    /// Map a clamped angle to display units, truncating toward zero
    pub fn map(&self, clamped_deg: f32) -> i16 {
        let units = match *self {
            MappingPolicy::Identity => clamped_deg,
            MappingPolicy::CompressedTail {
                knee_deg,
                knee_units,
                range_max,
            } => {
                let magnitude = clamped_deg.abs();
                let knee_deg = knee_deg.clamp(f32::EPSILON, ANGLE_LIMIT_DEG);
                let scaled = if magnitude <= knee_deg {
                    magnitude * knee_units as f32 / knee_deg
                } else if knee_deg >= ANGLE_LIMIT_DEG {
                    knee_units as f32
                } else {
                    knee_units as f32
                        + (magnitude - knee_deg) * (range_max - knee_units) as f32
                            / (ANGLE_LIMIT_DEG - knee_deg)
                };
                libm::copysignf(scaled, clamped_deg)
            }
        };

        let limit = self.range_max().saturating_abs();
        (units as i16).clamp(-limit, limit)
    }
}

/// Current value of one axis
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisReading {
    /// Mapped display value
    pub value: i16,
    /// Clamped angle with one decimal, e.g. "+12.4°"
    pub label: String<LABEL_CAPACITY>,
    /// Value differs from the one last sent
    pub changed: bool,
}

/// Both axes as they should be drawn now
///
/// Every update carries both axes in full, so a consumer that only sees
/// the most recent update still draws the current values. `changed`
/// tells it which axes need a redraw.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LevelUpdate {
    pub pitch: AxisReading,
    pub roll: AxisReading,
}

impl LevelUpdate {
    /// Fold in an older update the consumer has not taken yet
    ///
    /// Values stay those of `self`; an axis is marked changed if either
    /// update changed it.
    pub fn coalesce(mut self, pending: Option<LevelUpdate>) -> Self {
        if let Some(pending) = pending {
            self.pitch.changed |= pending.pitch.changed;
            self.roll.changed |= pending.roll.changed;
        }
        self
    }
}

/// Maps samples to change-suppressed display updates
#[derive(Debug, Clone)]
pub struct DisplayMapper {
    policy: MappingPolicy,
    previous_pitch: Option<i16>,
    previous_roll: Option<i16>,
}

impl DisplayMapper {
    pub const fn new(policy: MappingPolicy) -> Self {
        Self {
            policy,
            previous_pitch: None,
            previous_roll: None,
        }
    }

    pub fn policy(&self) -> MappingPolicy {
        self.policy
    }

    /// Forget emitted values so the next sample is sent in full
    pub fn reset(&mut self) {
        self.previous_pitch = None;
        self.previous_roll = None;
    }

    /// Map one sample
    ///
    /// Returns `None` when there is no sample or neither axis changed.
    pub fn tick(&mut self, sample: Option<&PhysicalSample>, inverted: bool) -> Option<LevelUpdate> {
        let sample = sample?;
        let attitude = if inverted {
            sample.attitude.negated()
        } else {
            sample.attitude
        };

        let pitch = Self::axis(
            self.policy,
            &mut self.previous_pitch,
            attitude.pitch_deg,
        );
        let roll = Self::axis(self.policy, &mut self.previous_roll, attitude.roll_deg);

        if !pitch.changed && !roll.changed {
            return None;
        }

        Some(LevelUpdate { pitch, roll })
    }

    fn axis(policy: MappingPolicy, previous: &mut Option<i16>, deg: f32) -> AxisReading {
        let clamped = clamp_angle(deg);
        let value = policy.map(clamped);
        let changed = *previous != Some(value);
        *previous = Some(value);

        AxisReading {
            value,
            label: format_label(clamped),
            changed,
        }
    }

    /// Read the shared state and map it
    ///
    /// A lock that cannot be taken within `lock_timeout` skips the tick.
    pub async fn poll<M: RawMutex>(
        &mut self,
        level: &LevelState<M>,
        lock_timeout: Duration,
    ) -> Option<LevelUpdate> {
        match level.attitude().try_read(lock_timeout).await {
            Ok(sample) => self.tick(sample.as_ref(), level.inverted()),
            Err(_) => {
                trace!("Attitude lock busy, skipping display tick");
                None
            }
        }
    }
}

impl Default for DisplayMapper {
    fn default() -> Self {
        Self::new(MappingPolicy::Identity)
    }
}

fn format_label(deg: f32) -> String<LABEL_CAPACITY> {
    // Round first so small negatives do not print as "-0.0"
    let tenths = libm::roundf(deg * 10.0);
    let shown = if tenths == 0.0 { 0.0 } else { tenths / 10.0 };

    let mut label = String::new();
    // A clamped angle always fits
    let _ = write!(label, "{:+.1}°", shown);
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attitude::Attitude;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embassy_time::Instant;
    use proptest::prelude::*;

    fn sample(pitch: f32, roll: f32) -> PhysicalSample {
        PhysicalSample {
            attitude: Attitude::new(pitch, roll),
            raw: Attitude::new(pitch, roll),
            temperature_c: 25.0,
            timestamp: Instant::from_ticks(0),
        }
    }

    /// Values of the axes marked changed
    fn values(update: &LevelUpdate) -> (Option<i16>, Option<i16>) {
        let changed = |a: &AxisReading| a.changed.then_some(a.value);
        (changed(&update.pitch), changed(&update.roll))
    }

    #[test]
    fn test_first_sample_emits_both_axes() {
        let mut mapper = DisplayMapper::default();

        let update = mapper.tick(Some(&sample(12.4, -3.7)), false).unwrap();

        assert_eq!(values(&update), (Some(12), Some(-3)));
        assert_eq!(update.pitch.label.as_str(), "+12.4°");
        assert_eq!(update.roll.label.as_str(), "-3.7°");
    }

    #[test]
    fn test_unchanged_value_suppressed() {
        let mut mapper = DisplayMapper::default();

        assert!(mapper.tick(Some(&sample(5.2, 1.0)), false).is_some());
        // Same integers, different fractions
        assert!(mapper.tick(Some(&sample(5.9, 1.4)), false).is_none());
    }

    #[test]
    fn test_only_changed_axis_reported() {
        let mut mapper = DisplayMapper::default();
        mapper.tick(Some(&sample(5.0, 1.0)), false);

        let update = mapper.tick(Some(&sample(5.0, 2.0)), false).unwrap();

        assert_eq!(values(&update), (None, Some(2)));
        // The unchanged axis still carries its current value
        assert_eq!(update.pitch.value, 5);
        assert_eq!(update.pitch.label.as_str(), "+5.0°");
    }

    #[test]
    fn test_partial_updates_coalesce_without_reader() {
        let mut mapper = DisplayMapper::default();
        let mut pending: Option<LevelUpdate> = None;

        // No reader in between: each update replaces the pending one
        for (pitch, roll) in [(0.0, 0.0), (5.0, 0.0), (5.0, 7.0), (6.0, 7.0)] {
            if let Some(update) = mapper.tick(Some(&sample(pitch, roll)), false) {
                pending = Some(update.coalesce(pending.take()));
            }
        }

        let seen = pending.unwrap();
        assert_eq!(values(&seen), (Some(6), Some(7)));

        // Nothing more to send while the attitude holds
        for _ in 0..10 {
            assert!(mapper.tick(Some(&sample(6.0, 7.0)), false).is_none());
        }
    }

    #[test]
    fn test_coalesce_keeps_newest_values() {
        let mut mapper = DisplayMapper::default();
        let first = mapper.tick(Some(&sample(1.0, 1.0)), false).unwrap();
        let second = mapper.tick(Some(&sample(2.0, 1.0)), false).unwrap();

        let merged = second.coalesce(Some(first));

        assert_eq!(merged.pitch.value, 2);
        assert_eq!(merged.roll.value, 1);
        assert!(merged.pitch.changed && merged.roll.changed);
    }

    #[test]
    fn test_label_has_no_negative_zero() {
        assert_eq!(format_label(-0.0).as_str(), "+0.0°");
        assert_eq!(format_label(-0.04).as_str(), "+0.0°");
        assert_eq!(format_label(-0.06).as_str(), "-0.1°");

        let mut mapper = DisplayMapper::default();
        let update = mapper.tick(Some(&sample(0.0, 0.0)), true).unwrap();
        assert_eq!(update.pitch.label.as_str(), "+0.0°");
        assert_eq!(update.roll.label.as_str(), "+0.0°");
    }

    #[test]
    fn test_clamped_to_limit() {
        let mut mapper = DisplayMapper::default();

        let update = mapper.tick(Some(&sample(75.0, -42.0)), false).unwrap();

        assert_eq!(values(&update), (Some(30), Some(-30)));
        assert_eq!(update.pitch.label.as_str(), "+30.0°");

        // Still beyond the limit: nothing to redraw
        assert!(mapper.tick(Some(&sample(80.0, -50.0)), false).is_none());
    }

    #[test]
    fn test_inversion_negates() {
        let mut plain = DisplayMapper::default();
        let mut flipped = DisplayMapper::default();
        let s = sample(12.0, -7.0);

        let a = plain.tick(Some(&s), false).unwrap();
        let b = flipped.tick(Some(&s), true).unwrap();

        assert_eq!(values(&a), (Some(12), Some(-7)));
        assert_eq!(values(&b), (Some(-12), Some(7)));
    }

    #[test]
    fn test_no_sample_no_event() {
        let mut mapper = DisplayMapper::default();
        assert!(mapper.tick(None, false).is_none());
    }

    #[test]
    fn test_reset_re_emits() {
        let mut mapper = DisplayMapper::default();
        mapper.tick(Some(&sample(3.0, 3.0)), false);
        assert!(mapper.tick(Some(&sample(3.0, 3.0)), false).is_none());

        mapper.reset();

        assert!(mapper.tick(Some(&sample(3.0, 3.0)), false).is_some());
    }

    #[test]
    fn test_never_written_state_emits_nothing() {
        let level: LevelState<CriticalSectionRawMutex> = LevelState::new();
        let mut mapper = DisplayMapper::default();

        for _ in 0..5 {
            let update = block_on(mapper.poll(&level, Duration::from_millis(20)));
            assert!(update.is_none());
        }
    }

    #[test]
    fn test_poll_reads_inversion_flag() {
        let level: LevelState<CriticalSectionRawMutex> = LevelState::new();
        level.set_inverted(true);
        block_on(level.attitude().write(sample(4.0, -2.0)));
        let mut mapper = DisplayMapper::default();

        let update = block_on(mapper.poll(&level, Duration::from_millis(20))).unwrap();

        assert_eq!(values(&update), (Some(-4), Some(2)));
    }

    #[test]
    fn test_compressed_tail() {
        let policy = MappingPolicy::CompressedTail {
            knee_deg: 10.0,
            knee_units: 20,
            range_max: 25,
        };

        assert_eq!(policy.map(0.0), 0);
        assert_eq!(policy.map(5.0), 10);
        assert_eq!(policy.map(10.0), 20);
        assert_eq!(policy.map(30.0), 25);
        assert_eq!(policy.map(-30.0), -25);
        assert_eq!(policy.range_max(), 25);
    }

    #[test]
    fn test_compressed_tail_used_for_both_axes() {
        let mut mapper = DisplayMapper::new(MappingPolicy::CompressedTail {
            knee_deg: 10.0,
            knee_units: 20,
            range_max: 25,
        });

        let update = mapper.tick(Some(&sample(5.0, -5.0)), false).unwrap();

        assert_eq!(values(&update), (Some(10), Some(-10)));
    }

    proptest! {
        #[test]
        fn prop_clamp_bounds(deg in proptest::num::f32::ANY) {
            let c = clamp_angle(deg);
            prop_assert!((-ANGLE_LIMIT_DEG..=ANGLE_LIMIT_DEG).contains(&c));
        }

        #[test]
        fn prop_clamp_identity_in_range(deg in -30.0f32..=30.0) {
            prop_assert_eq!(clamp_angle(deg), deg);
        }

        #[test]
        fn prop_mapped_within_range(deg in -1000.0f32..1000.0, inverted in any::<bool>()) {
            let mut mapper = DisplayMapper::default();
            let update = mapper.tick(Some(&sample(deg, deg)), inverted).unwrap();
            let (pitch, roll) = values(&update);
            prop_assert!(pitch.unwrap().abs() <= 30);
            prop_assert!(roll.unwrap().abs() <= 30);
        }
    }
}
