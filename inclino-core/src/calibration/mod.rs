//! Level calibration
//!
//! The calibration offset is the attitude the device reads when the
//! vehicle stands level. It is subtracted from every decoded sample,
//! persisted to flash, and changed through the [`Calibrator`] workflow.

pub mod offset;
pub mod store;
pub mod workflow;

pub use offset::{CalibrationOffset, CalibrationRecord, CALIBRATION_MAGIC, CALIBRATION_VERSION};
pub use store::{CalibrationError, CalibrationStore};
pub use workflow::{
    CalibrationAction, CalibrationEvent, CalibrationFailure, CalibrationReport, CalibrationState,
    Calibrator,
};
