//! Sample acquisition
//!
//! One [`Acquisition::poll`] per sample period: read a burst from the
//! source, decode it with the active offset and publish it to the shared
//! state. A failed read publishes nothing; the previous sample stays
//! visible and the next try follows after the backoff.
//!
//! [`Acquisition::cycle`] adds the timing: after a sample it waits for the
//! next tick, after a failure it waits only the backoff and restarts the
//! ticker from there.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Duration, Instant, Ticker, Timer};

use crate::attitude::{AxisMap, Decoder, PhysicalSample};
use crate::config::LevelConfig;
use crate::shared::LevelState;
use crate::traits::{SampleSource, SourceError};

/// Constant delay between retries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FixedBackoff {
    delay: Duration,
}

impl FixedBackoff {
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Sensor link health as seen by the acquisition loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorHealth {
    Nominal,
    /// Too many consecutive read failures
    Degraded,
}

/// Result of one poll
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollOutcome {
    /// Sample decoded and published
    Sampled(PhysicalSample),
    /// Read failed; wait before the next poll
    Skipped { retry_after: Duration },
}

/// Owns the sample source and feeds the shared state
pub struct Acquisition<S> {
    source: S,
    decoder: Decoder,
    backoff: FixedBackoff,
    degraded_after: u16,
    consecutive_failures: u16,
    health: SensorHealth,
}

impl<S: SampleSource> Acquisition<S> {
    pub fn new(source: S, config: &LevelConfig) -> Self {
        Self {
            source,
            decoder: Decoder::new(config.mounting),
            backoff: FixedBackoff::new(config.transport_backoff),
            degraded_after: config.degraded_after.max(1),
            consecutive_failures: 0,
            health: SensorHealth::Nominal,
        }
    }

    /// Initialize the source
    ///
    /// An identity mismatch means the wrong (or no) device answers; the
    /// caller should not start polling.
    pub fn start(&mut self) -> Result<(), SourceError> {
        match self.source.init() {
            Ok(()) => {
                info!("Sample source ready");
                Ok(())
            }
            Err(SourceError::IdentityMismatch(id)) => {
                error!("Unexpected IMU identity {:#x}, acquisition disabled", id);
                Err(SourceError::IdentityMismatch(id))
            }
            Err(e) => {
                warn!("Sample source init failed: {:?}", e);
                Err(e)
            }
        }
    }

    /// Read, decode and publish one sample taken at `now`
    pub async fn poll<M: RawMutex>(&mut self, level: &LevelState<M>, now: Instant) -> PollOutcome {
        match self.source.read_burst() {
            Ok(burst) => {
                let sample = self.decoder.decode(&burst, level.offset(), now);
                level.attitude().write(sample).await;
                self.record_success();
                PollOutcome::Sampled(sample)
            }
            Err(e) => {
                self.record_failure(e);
                PollOutcome::Skipped {
                    retry_after: self.backoff.delay(),
                }
            }
        }
    }

    /// Poll once, then wait until the next poll is due
    pub async fn cycle<M: RawMutex>(
        &mut self,
        level: &LevelState<M>,
        ticker: &mut Ticker,
    ) -> PollOutcome {
        let outcome = self.poll(level, Instant::now()).await;
        match outcome {
            PollOutcome::Sampled(_) => ticker.next().await,
            PollOutcome::Skipped { retry_after } => {
                Timer::after(retry_after).await;
                ticker.reset();
            }
        }
        outcome
    }

    fn record_success(&mut self) {
        if self.health == SensorHealth::Degraded {
            info!(
                "IMU recovered after {} failed reads",
                self.consecutive_failures
            );
        }
        self.consecutive_failures = 0;
        self.health = SensorHealth::Nominal;
    }

    fn record_failure(&mut self, e: SourceError) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);

        match self.health {
            SensorHealth::Nominal if self.consecutive_failures >= self.degraded_after => {
                warn!(
                    "IMU degraded: {} consecutive read failures",
                    self.consecutive_failures
                );
                self.health = SensorHealth::Degraded;
            }
            SensorHealth::Nominal => {
                warn!("IMU read failed: {:?}", e);
            }
            SensorHealth::Degraded => {
                trace!("IMU read failed: {:?}", e);
            }
        }
    }

    pub fn health(&self) -> SensorHealth {
        self.health
    }

    pub fn consecutive_failures(&self) -> u16 {
        self.consecutive_failures
    }

    pub fn axis_map(&self) -> AxisMap {
        self.decoder.axis_map()
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
