//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod acquisition;
pub mod calibration;
pub mod console;
pub mod display;

pub use acquisition::acquisition_task;
pub use calibration::calibration_task;
pub use console::console_task;
pub use display::display_task;

use embassy_rp::peripherals::I2C0;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use inclino_core::shared::LevelState;
use inclino_drivers::ImuSource;
use inclino_hal_rp2040::i2c::Rp2040I2c;

/// Level state shared by all tasks
pub type Level = LevelState<CriticalSectionRawMutex>;

/// IMU on I2C0, or the synthetic generator
pub type Source = ImuSource<Rp2040I2c<'static, I2C0>>;
