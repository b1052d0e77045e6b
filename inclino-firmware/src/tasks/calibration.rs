//! Calibration task
//!
//! Owns the flash store and serves calibration commands one at a time.
//! A pending request expires if it is not confirmed within the confirm
//! window.

use defmt::*;
use embassy_time::{with_timeout, Instant};

use inclino_core::calibration::{CalibrationAction, CalibrationState, Calibrator};
use inclino_core::config::LevelConfig;
use inclino_hal_rp2040::flash::Rp2040FlashStorage;

use super::Level;
use crate::channels::{CalibrationCommand, CALIBRATION_CMD, CALIBRATION_RESULT, DISPLAY_REFRESH};

/// Calibration task
#[embassy_executor::task]
pub async fn calibration_task(
    mut calibrator: Calibrator<Rp2040FlashStorage<'static>>,
    level: &'static Level,
    config: LevelConfig,
) {
    info!("Calibration task started");

    loop {
        let command = if calibrator.state() == CalibrationState::AwaitingConfirmation {
            match with_timeout(config.confirm_window, CALIBRATION_CMD.receive()).await {
                Ok(command) => command,
                Err(_) => {
                    info!("Calibration not confirmed in time");
                    CALIBRATION_RESULT.signal(calibrator.expire(level));
                    continue;
                }
            }
        } else {
            CALIBRATION_CMD.receive().await
        };

        debug!("Calibration command: {:?}", command);

        let report = match command {
            CalibrationCommand::Request => calibrator.request(level),
            CalibrationCommand::Confirm => calibrator.confirm(level, Instant::now()).await,
            CalibrationCommand::Cancel => calibrator.cancel(level),
            CalibrationCommand::Reset => calibrator.reset(level).await,
            CalibrationCommand::SetOffsets {
                pitch_deg,
                roll_deg,
            } => calibrator.set_offsets(level, pitch_deg, roll_deg).await,
            CalibrationCommand::SetInverted(inverted) => {
                calibrator.set_inverted(level, inverted).await
            }
        };

        let changes_display = !matches!(
            report.action,
            CalibrationAction::Request | CalibrationAction::Cancel | CalibrationAction::Timeout
        );
        if report.applied() && changes_display {
            DISPLAY_REFRESH.signal(());
        }

        CALIBRATION_RESULT.signal(report);
    }
}
