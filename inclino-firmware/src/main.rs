//! Inclino - Dashboard Level Firmware
//!
//! Main firmware binary for RP2040-based dashboard controllers. Reads a
//! 6-axis IMU, turns the gravity vector into calibrated pitch and roll,
//! and feeds change-suppressed level values to the UI.
//!
//! Tasks:
//! - acquisition: IMU polling at 10 Hz
//! - display: mapping at 10 Hz on its own ticker
//! - calibration: flash-backed offset and inversion settings
//! - console: defmt log of everything sent to the UI

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use inclino_core::acquisition::Acquisition;
use inclino_core::calibration::{CalibrationStore, Calibrator};
use inclino_core::config::LevelConfig;
use inclino_core::shared::LevelState;
use inclino_core::traits::SourceError;
use inclino_hal_rp2040::flash::Rp2040FlashStorage;

use crate::tasks::{Level, Source};

mod channels;
mod tasks;

// Shared level state (must live forever for task references)
static LEVEL: StaticCell<LevelState<CriticalSectionRawMutex>> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Inclino firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = LevelConfig::new();
    let level: &'static Level = LEVEL.init(LevelState::new());

    // Restore offset and inversion flag before the first sample is decoded
    let flash = Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0);
    let mut calibrator = Calibrator::new(CalibrationStore::new(flash), &config);
    calibrator.restore(level).await;
    info!("Level settings restored, inverted={}", level.inverted());

    #[cfg(not(feature = "synthetic-imu"))]
    let source = {
        use inclino_drivers::Mpu6050;
        use inclino_hal_rp2040::i2c::{rp_config, HalI2c, I2cConfig};

        // Pin assignment is board-specific (I2C0: SDA=GPIO4, SCL=GPIO5)
        let i2c = embassy_rp::i2c::I2c::new_blocking(
            p.I2C0,
            p.PIN_5,
            p.PIN_4,
            rp_config(I2cConfig::FAST),
        );
        info!("I2C0 initialized for IMU at {:#x}", config.sensor_address);
        Source::Hardware(Mpu6050::new(HalI2c::new(i2c), config.sensor_address))
    };

    #[cfg(feature = "synthetic-imu")]
    let source = {
        warn!("Using synthetic IMU data");
        Source::Synthetic(inclino_drivers::SyntheticSource::default())
    };

    let mut acquisition = Acquisition::new(source, &config);

    match acquisition.start() {
        Ok(()) => {
            spawner.spawn(tasks::acquisition_task(acquisition, level, config, true).unwrap());
        }
        Err(SourceError::Transport) => {
            warn!("IMU not responding, acquisition will retry");
            spawner.spawn(tasks::acquisition_task(acquisition, level, config, false).unwrap());
        }
        Err(SourceError::IdentityMismatch(_)) => {
            // Reported by `start`; the display keeps showing nothing
        }
    }

    spawner.spawn(tasks::display_task(level, config).unwrap());
    spawner.spawn(tasks::calibration_task(calibrator, level, config).unwrap());
    spawner.spawn(tasks::console_task().unwrap());

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
