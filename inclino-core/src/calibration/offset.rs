//! Calibration offset and its flash record

use serde::{Deserialize, Serialize};

use crate::attitude::Attitude;

/// Magic number to identify a level calibration record
pub const CALIBRATION_MAGIC: u32 = 0x4C56_4C43; // "LVLC"

/// Current record layout version
pub const CALIBRATION_VERSION: u8 = 1;

/// Zero-point offset subtracted from every decoded sample
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationOffset {
    pub pitch_offset_deg: f32,
    pub roll_offset_deg: f32,
}

impl CalibrationOffset {
    /// No correction
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(pitch_offset_deg: f32, roll_offset_deg: f32) -> Self {
        Self {
            pitch_offset_deg,
            roll_offset_deg,
        }
    }

    /// Offset that makes `raw` read as level
    pub fn from_attitude(raw: Attitude) -> Self {
        Self::new(raw.pitch_deg, raw.roll_deg)
    }

    /// Build from persisted millidegrees
    pub fn from_millidegrees(pitch_millideg: i32, roll_millideg: i32) -> Self {
        Self::new(
            pitch_millideg as f32 / 1000.0,
            roll_millideg as f32 / 1000.0,
        )
    }

    /// Pitch offset rounded to the nearest millidegree
    pub fn pitch_millidegrees(&self) -> i32 {
        to_millidegrees(self.pitch_offset_deg)
    }

    /// Roll offset rounded to the nearest millidegree
    pub fn roll_millidegrees(&self) -> i32 {
        to_millidegrees(self.roll_offset_deg)
    }

    /// The offset as it reads back from flash (whole millidegrees)
    pub fn quantized(&self) -> Self {
        Self::from_millidegrees(self.pitch_millidegrees(), self.roll_millidegrees())
    }

    /// Subtract this offset from a raw attitude
    pub fn apply(&self, raw: Attitude) -> Attitude {
        Attitude::new(
            raw.pitch_deg - self.pitch_offset_deg,
            raw.roll_deg - self.roll_offset_deg,
        )
    }
}

fn to_millidegrees(deg: f32) -> i32 {
    // `as` saturates; NaN becomes 0
    libm::roundf(deg * 1000.0) as i32
}

/// Level calibration as stored in flash
///
/// Both offsets live in one record so they are written as a single
/// storage item. Serialized with postcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationRecord {
    /// Magic number for validation
    pub magic: u32,
    /// Record layout version
    pub version: u8,
    /// Pitch offset in millidegrees
    pub pitch_millideg: i32,
    /// Roll offset in millidegrees
    pub roll_millideg: i32,
    /// CRC32 over magic..roll_millideg
    pub crc: u32,
}

impl CalibrationRecord {
    /// Create a sealed record for an offset
    pub fn new(offset: CalibrationOffset) -> Self {
        let mut record = Self {
            magic: CALIBRATION_MAGIC,
            version: CALIBRATION_VERSION,
            pitch_millideg: offset.pitch_millidegrees(),
            roll_millideg: offset.roll_millidegrees(),
            crc: 0,
        };
        record.update_crc();
        record
    }

    /// Magic and version match this firmware
    pub fn is_valid(&self) -> bool {
        self.magic == CALIBRATION_MAGIC && self.version == CALIBRATION_VERSION
    }

    pub fn offset(&self) -> CalibrationOffset {
        CalibrationOffset::from_millidegrees(self.pitch_millideg, self.roll_millideg)
    }

    /// CRC32 (IEEE) over every field except `crc`
    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFF_FFFF;
        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);
        crc = crc32_update(crc, &self.pitch_millideg.to_le_bytes());
        crc = crc32_update(crc, &self.roll_millideg.to_le_bytes());
        !crc
    }

    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc();
    }

    pub fn verify_crc(&self) -> bool {
        self.crc == self.calculate_crc()
    }
}

/// Bitwise CRC32 update, reflected polynomial 0xEDB88320
fn crc32_update(mut crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (POLY & mask);
        }
    }

    crc
}
