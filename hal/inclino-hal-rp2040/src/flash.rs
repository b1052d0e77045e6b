//! Flash storage driver for RP2040
//!
//! Keeps user settings (level calibration, inversion flag) in a small
//! wear-leveled key-value map at the end of flash, built on
//! sequential-storage.
//!
//! Implements the `FlashStorage` trait from `inclino-hal`. Every
//! `write` appends a complete new item; the previous item stays valid
//! until the new one is fully programmed, so a power cut mid-write never
//! corrupts stored settings.

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

// Re-export shared types from inclino-hal
pub use inclino_hal::flash::{FlashError, StorageKey};

/// Total flash on the dashboard board
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Settings partition: four erase sectors at the top of flash
pub const SETTINGS_PARTITION_SIZE: usize = 4 * ERASE_SIZE;
pub const SETTINGS_PARTITION_START: usize = FLASH_SIZE - SETTINGS_PARTITION_SIZE;

/// Flash range for the settings partition
pub const SETTINGS_RANGE: core::ops::Range<u32> =
    (SETTINGS_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// Scratch buffer size for sequential-storage item handling.
/// Settings items are a few dozen bytes.
const ITEM_BUFFER_SIZE: usize = 128;

/// RP2040 flash settings store
pub struct Rp2040FlashStorage<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> Rp2040FlashStorage<'d> {
    /// Create a new flash storage instance
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }
}

impl<'d> inclino_hal::FlashStorage for Rp2040FlashStorage<'d> {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let mut data_buffer = [0u8; ITEM_BUFFER_SIZE];

        let result = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            SETTINGS_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
        )
        .await;

        match result {
            Ok(Some(data)) => {
                let len = data.len();
                if buffer.len() < len {
                    return Err(FlashError::BufferTooSmall);
                }
                buffer[..len].copy_from_slice(data);
                Ok(len)
            }
            Ok(None) => Err(FlashError::NotFound),
            Err(sequential_storage::Error::Corrupted { .. }) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Settings partition corrupted reading key {}", key);
                Err(FlashError::Corrupted)
            }
            Err(_) => Err(FlashError::Storage),
        }
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        let mut data_buffer = [0u8; ITEM_BUFFER_SIZE];

        map::store_item(
            &mut self.flash,
            SETTINGS_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
            &data,
        )
        .await
        .map_err(|e| {
            let error = match e {
                sequential_storage::Error::FullStorage => FlashError::Full,
                sequential_storage::Error::Storage { .. } => FlashError::Flash,
                _ => FlashError::Storage,
            };
            #[cfg(feature = "defmt")]
            defmt::warn!("Settings write for key {} failed: {}", key, error);
            error
        })
    }
}
