//! Calibration persistence
//!
//! Loads and saves the level offset and the inversion flag through a
//! [`FlashStorage`] implementation. Loads never fail the caller: a
//! missing or damaged record yields the defaults.

use inclino_hal::{FlashError, FlashStorage, StorageKey};

use super::offset::{CalibrationOffset, CalibrationRecord};

/// Maximum serialized record size
const MAX_RECORD_SIZE: usize = 32;

/// Calibration persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationError {
    /// Flash operation failed
    Flash(FlashError),
    /// Deserialization failed
    Deserialize,
    /// Serialization failed
    Serialize,
    /// CRC check failed
    CrcMismatch,
    /// Invalid magic or version
    InvalidFormat,
}

impl From<FlashError> for CalibrationError {
    fn from(e: FlashError) -> Self {
        CalibrationError::Flash(e)
    }
}

/// Level settings in flash
pub struct CalibrationStore<F> {
    flash: F,
}

impl<F: FlashStorage> CalibrationStore<F> {
    pub fn new(flash: F) -> Self {
        Self { flash }
    }

    /// Access the underlying storage
    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }

    /// Load the stored offset, or zero if none is stored or it is invalid
    pub async fn load(&mut self) -> CalibrationOffset {
        match self.load_record().await {
            Ok(record) => {
                info!(
                    "Loaded level offset: pitch={} roll={} mdeg",
                    record.pitch_millideg,
                    record.roll_millideg
                );
                record.offset()
            }
            Err(CalibrationError::Flash(FlashError::NotFound)) => {
                debug!("No level offset in flash, using zero");
                CalibrationOffset::ZERO
            }
            Err(e) => {
                warn!("Failed to load level offset: {:?}, using zero", e);
                CalibrationOffset::ZERO
            }
        }
    }

    async fn load_record(&mut self) -> Result<CalibrationRecord, CalibrationError> {
        let mut buffer = [0u8; MAX_RECORD_SIZE];
        let len = self
            .flash
            .read(StorageKey::LevelCalibration, &mut buffer)
            .await?;

        let record: CalibrationRecord =
            postcard::from_bytes(&buffer[..len]).map_err(|_| CalibrationError::Deserialize)?;

        if !record.is_valid() {
            return Err(CalibrationError::InvalidFormat);
        }

        if !record.verify_crc() {
            return Err(CalibrationError::CrcMismatch);
        }

        Ok(record)
    }

    /// Persist an offset
    ///
    /// Both axes are written as one item; on error the previously stored
    /// offset is still in place.
    pub async fn save(&mut self, offset: CalibrationOffset) -> Result<(), CalibrationError> {
        let record = CalibrationRecord::new(offset);

        let mut buffer = [0u8; MAX_RECORD_SIZE];
        let bytes =
            postcard::to_slice(&record, &mut buffer).map_err(|_| CalibrationError::Serialize)?;

        self.flash
            .write(StorageKey::LevelCalibration, bytes)
            .await?;

        info!(
            "Saved level offset: pitch={} roll={} mdeg",
            record.pitch_millideg,
            record.roll_millideg
        );
        Ok(())
    }

    /// Persist a zero offset
    pub async fn reset(&mut self) -> Result<(), CalibrationError> {
        self.save(CalibrationOffset::ZERO).await
    }

    /// Load the inversion flag, `false` if absent
    pub async fn load_inverted(&mut self) -> bool {
        let mut buffer = [0u8; 1];
        match self.flash.read(StorageKey::LevelInvert, &mut buffer).await {
            Ok(1) => buffer[0] != 0,
            Ok(_) | Err(FlashError::NotFound) => false,
            Err(e) => {
                warn!("Failed to load invert flag: {:?}", e);
                false
            }
        }
    }

    /// Persist the inversion flag
    pub async fn save_inverted(&mut self, inverted: bool) -> Result<(), CalibrationError> {
        self.flash
            .write(StorageKey::LevelInvert, &[inverted as u8])
            .await?;
        info!("Saved invert flag: {}", inverted);
        Ok(())
    }
}
