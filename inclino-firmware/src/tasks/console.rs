//! Console task
//!
//! Logs level updates and calibration outcomes over defmt. Stands in for
//! the touchscreen UI, which consumes the same signals.

use defmt::*;
use embassy_futures::select::{select, Either};

use inclino_core::calibration::CalibrationReport;
use inclino_core::display::LevelUpdate;

use crate::channels::{CALIBRATION_RESULT, LEVEL_UPDATE};

/// Console task
#[embassy_executor::task]
pub async fn console_task() {
    info!("Console task started");

    loop {
        match select(LEVEL_UPDATE.wait(), CALIBRATION_RESULT.wait()).await {
            Either::First(update) => log_update(&update),
            Either::Second(report) => log_report(&report),
        }
    }
}

fn log_update(update: &LevelUpdate) {
    if update.pitch.changed {
        info!("Pitch {} ({})", update.pitch.label.as_str(), update.pitch.value);
    }
    if update.roll.changed {
        info!("Roll {} ({})", update.roll.label.as_str(), update.roll.value);
    }
}

fn log_report(report: &CalibrationReport) {
    match report.result {
        Ok(()) => info!(
            "{:?} applied: pitch={} roll={} mdeg, inverted={}",
            report.action,
            report.offset.pitch_millidegrees(),
            report.offset.roll_millidegrees(),
            report.inverted
        ),
        Err(e) => warn!("{:?} not applied: {:?}", report.action, e),
    }
}
