//! Inter-task communication channels
//!
//! Defines the static channels used between the level tasks and the UI
//! collaborator. Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use inclino_core::calibration::CalibrationReport;
use inclino_core::display::LevelUpdate;

/// Channel capacity for calibration commands
const CALIBRATION_CHANNEL_SIZE: usize = 4;

/// Calibration commands from the UI or console
#[derive(Debug, Clone, Copy, PartialEq, defmt::Format)]
pub enum CalibrationCommand {
    /// Start a calibration, wait for confirmation
    Request,
    /// Vehicle is level, capture the zero point
    Confirm,
    /// Abandon a pending calibration
    Cancel,
    /// Clear the offset to zero
    Reset,
    /// Enter offsets by hand; `None` keeps the current axis value
    SetOffsets {
        pitch_deg: Option<f32>,
        roll_deg: Option<f32>,
    },
    /// Upside-down mounting on/off
    SetInverted(bool),
}

/// Changed level values for the UI (latest wins)
pub static LEVEL_UPDATE: Signal<CriticalSectionRawMutex, LevelUpdate> = Signal::new();

/// Calibration commands
pub static CALIBRATION_CMD: Channel<
    CriticalSectionRawMutex,
    CalibrationCommand,
    CALIBRATION_CHANNEL_SIZE,
> = Channel::new();

/// Outcome of the last calibration command
pub static CALIBRATION_RESULT: Signal<CriticalSectionRawMutex, CalibrationReport> =
    Signal::new();

/// Ask the display task to resend both axes (offset or inversion changed)
pub static DISPLAY_REFRESH: Signal<CriticalSectionRawMutex, ()> = Signal::new();
