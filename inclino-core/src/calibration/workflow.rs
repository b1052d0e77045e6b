//! Calibration workflow
//!
//! Capturing a new zero point is a two-step operation: the user requests
//! calibration, then confirms with the vehicle standing level. On confirm
//! the pre-offset angles of the latest sample become the new offset.
//!
//! ```text
//!          Request            Confirm
//! Idle ──────────────► AwaitingConfirmation ──────────► Applying
//!  ▲                          │ Cancel / timeout           │
//!  │                          ▼                            │ Failed
//!  └──── Settled ────── Cancelled ◄────────────────────────┘
//!  ▲                                                       │
//!  └──────────────────────── Applied ──────────────────────┘
//! ```
//!
//! Every step of [`Calibrator`] returns a [`CalibrationReport`] for the UI.
//! No failure changes the active offset.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Duration, Instant};
use inclino_hal::FlashStorage;

use super::offset::CalibrationOffset;
use super::store::{CalibrationError, CalibrationStore};
use crate::config::LevelConfig;
use crate::display::ANGLE_LIMIT_DEG;
use crate::shared::LevelState;

/// Workflow states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationState {
    /// Nothing pending
    Idle,
    /// Requested, waiting for the user to confirm
    AwaitingConfirmation,
    /// Capturing and persisting the new zero point
    Applying,
    /// Declined, timed out or failed; nothing changed
    Cancelled,
}

/// Events driving the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationEvent {
    /// User asked to calibrate
    Request,
    /// User confirmed the vehicle is level
    Confirm,
    /// User declined
    Cancel,
    /// Confirmation window elapsed
    ConfirmTimeout,
    /// New offset persisted and active
    Applied,
    /// Sample or persistence unavailable
    Failed,
    /// Outcome reported to the UI
    Settled,
}

impl CalibrationState {
    /// Process an event and return the next state
    pub fn transition(self, event: CalibrationEvent) -> Self {
        use CalibrationEvent::*;
        use CalibrationState::*;

        match (self, event) {
            (Idle, Request) => AwaitingConfirmation,

            (AwaitingConfirmation, Confirm) => Applying,
            (AwaitingConfirmation, Cancel) => Cancelled,
            (AwaitingConfirmation, ConfirmTimeout) => Cancelled,

            (Applying, Applied) => Idle,
            (Applying, Failed) => Cancelled,

            (Cancelled, Settled) => Idle,

            // Invalid transitions - stay in current state
            _ => self,
        }
    }
}

/// Why an action did not take effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationFailure {
    /// Confirm or cancel without a pending request
    NotRequested,
    /// No fresh sample could be read
    SensorUnavailable,
    /// Manual offset outside ±30°
    OutOfRange,
    /// Flash write failed
    Persistence(CalibrationError),
}

impl From<CalibrationError> for CalibrationFailure {
    fn from(e: CalibrationError) -> Self {
        CalibrationFailure::Persistence(e)
    }
}

/// What the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationAction {
    Request,
    Capture,
    Cancel,
    Timeout,
    Reset,
    SetOffsets,
    SetInverted,
}

/// Outcome of one action, with the settings now in effect
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationReport {
    pub action: CalibrationAction,
    pub result: Result<(), CalibrationFailure>,
    pub offset: CalibrationOffset,
    pub inverted: bool,
}

impl CalibrationReport {
    pub fn applied(&self) -> bool {
        self.result.is_ok()
    }
}

/// Drives the calibration workflow against the store and the live state
pub struct Calibrator<F> {
    store: CalibrationStore<F>,
    state: CalibrationState,
    read_timeout: Duration,
    max_sample_age: Duration,
}

impl<F: FlashStorage> Calibrator<F> {
    pub fn new(store: CalibrationStore<F>, config: &LevelConfig) -> Self {
        Self {
            store,
            state: CalibrationState::Idle,
            read_timeout: config.calibration_read_timeout,
            max_sample_age: config.max_sample_age,
        }
    }

    pub fn state(&self) -> CalibrationState {
        self.state
    }

    pub fn store_mut(&mut self) -> &mut CalibrationStore<F> {
        &mut self.store
    }

    /// Load persisted settings into the live state
    pub async fn restore<M: RawMutex>(&mut self, level: &LevelState<M>) {
        let offset = self.store.load().await;
        let inverted = self.store.load_inverted().await;
        level.set_offset(offset);
        level.set_inverted(inverted);
    }

    /// Start a calibration; repeated requests are harmless
    pub fn request<M: RawMutex>(&mut self, level: &LevelState<M>) -> CalibrationReport {
        self.state = self.state.transition(CalibrationEvent::Request);
        info!("Level calibration requested, awaiting confirmation");
        self.report(level, CalibrationAction::Request, Ok(()))
    }

    /// Decline a pending request
    pub fn cancel<M: RawMutex>(&mut self, level: &LevelState<M>) -> CalibrationReport {
        self.abandon(level, CalibrationAction::Cancel, CalibrationEvent::Cancel)
    }

    /// Confirmation window elapsed
    pub fn expire<M: RawMutex>(&mut self, level: &LevelState<M>) -> CalibrationReport {
        self.abandon(level, CalibrationAction::Timeout, CalibrationEvent::ConfirmTimeout)
    }

    fn abandon<M: RawMutex>(
        &mut self,
        level: &LevelState<M>,
        action: CalibrationAction,
        event: CalibrationEvent,
    ) -> CalibrationReport {
        if self.state != CalibrationState::AwaitingConfirmation {
            return self.report(level, action, Err(CalibrationFailure::NotRequested));
        }

        self.state = self.state.transition(event);
        info!("Level calibration cancelled");
        self.state = self.state.transition(CalibrationEvent::Settled);
        self.report(level, action, Ok(()))
    }

    /// Capture the latest sample as the new zero point
    ///
    /// `now` is used to reject samples older than the configured age.
    pub async fn confirm<M: RawMutex>(
        &mut self,
        level: &LevelState<M>,
        now: Instant,
    ) -> CalibrationReport {
        if self.state != CalibrationState::AwaitingConfirmation {
            return self.report(
                level,
                CalibrationAction::Capture,
                Err(CalibrationFailure::NotRequested),
            );
        }
        self.state = self.state.transition(CalibrationEvent::Confirm);

        let result = self.capture(level, now).await;

        match result {
            Ok(()) => {
                self.state = self.state.transition(CalibrationEvent::Applied);
            }
            Err(e) => {
                warn!("Calibration not applied: {:?}", e);
                self.state = self
                    .state
                    .transition(CalibrationEvent::Failed)
                    .transition(CalibrationEvent::Settled);
            }
        }

        self.report(level, CalibrationAction::Capture, result)
    }

    async fn capture<M: RawMutex>(
        &mut self,
        level: &LevelState<M>,
        now: Instant,
    ) -> Result<(), CalibrationFailure> {
        let sample = level
            .attitude()
            .try_read(self.read_timeout)
            .await
            .ok()
            .flatten()
            .ok_or(CalibrationFailure::SensorUnavailable)?;

        if sample.age(now) > self.max_sample_age {
            debug!("Latest sample is {} ms old", sample.age(now).as_millis());
            return Err(CalibrationFailure::SensorUnavailable);
        }

        let offset = CalibrationOffset::from_attitude(sample.raw).quantized();
        self.store.save(offset).await?;
        level.set_offset(offset);
        Ok(())
    }

    /// Clear the offset to zero
    pub async fn reset<M: RawMutex>(&mut self, level: &LevelState<M>) -> CalibrationReport {
        let result = self.apply_offset(level, CalibrationOffset::ZERO).await;
        self.report(level, CalibrationAction::Reset, result)
    }

    /// Set one or both offsets by hand
    ///
    /// `None` keeps the current value of that axis. Values must lie within
    /// ±30°.
    pub async fn set_offsets<M: RawMutex>(
        &mut self,
        level: &LevelState<M>,
        pitch_deg: Option<f32>,
        roll_deg: Option<f32>,
    ) -> CalibrationReport {
        let in_range = |v: f32| v.is_finite() && v.abs() <= ANGLE_LIMIT_DEG;
        if !pitch_deg.into_iter().chain(roll_deg).all(in_range) {
            return self.report(
                level,
                CalibrationAction::SetOffsets,
                Err(CalibrationFailure::OutOfRange),
            );
        }

        let current = level.offset();
        let offset = CalibrationOffset::new(
            pitch_deg.unwrap_or(current.pitch_offset_deg),
            roll_deg.unwrap_or(current.roll_offset_deg),
        );
        let result = self.apply_offset(level, offset).await;
        self.report(level, CalibrationAction::SetOffsets, result)
    }

    async fn apply_offset<M: RawMutex>(
        &mut self,
        level: &LevelState<M>,
        offset: CalibrationOffset,
    ) -> Result<(), CalibrationFailure> {
        // Live value must equal what a restore would load
        let offset = offset.quantized();
        match self.store.save(offset).await {
            Ok(()) => {
                level.set_offset(offset);
                Ok(())
            }
            Err(e) => {
                warn!("Offset not saved: {:?}", e);
                Err(e.into())
            }
        }
    }

    /// Persist and apply the inversion flag
    pub async fn set_inverted<M: RawMutex>(
        &mut self,
        level: &LevelState<M>,
        inverted: bool,
    ) -> CalibrationReport {
        let result = match self.store.save_inverted(inverted).await {
            Ok(()) => {
                level.set_inverted(inverted);
                Ok(())
            }
            Err(e) => {
                warn!("Invert flag not saved: {:?}", e);
                Err(e.into())
            }
        };
        self.report(level, CalibrationAction::SetInverted, result)
    }

    fn report<M: RawMutex>(
        &self,
        level: &LevelState<M>,
        action: CalibrationAction,
        result: Result<(), CalibrationFailure>,
    ) -> CalibrationReport {
        CalibrationReport {
            action,
            result,
            offset: level.offset(),
            inverted: level.inverted(),
        }
    }
}
