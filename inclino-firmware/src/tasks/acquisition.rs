//! Acquisition task
//!
//! Polls the sample source every sample period and publishes decoded
//! samples to the shared level state. Never waits on the display.

use defmt::*;
use embassy_time::{Ticker, Timer};

use inclino_core::acquisition::Acquisition;
use inclino_core::config::LevelConfig;
use inclino_core::traits::SourceError;

use super::{Level, Source};

/// Acquisition task
///
/// `ready` is false when the source did not answer at startup; the task
/// then keeps retrying initialization before it starts polling.
#[embassy_executor::task]
pub async fn acquisition_task(
    mut acquisition: Acquisition<Source>,
    level: &'static Level,
    config: LevelConfig,
    ready: bool,
) {
    info!("Acquisition task started");

    if !ready {
        loop {
            Timer::after(config.transport_backoff).await;
            match acquisition.start() {
                Ok(()) => break,
                Err(SourceError::IdentityMismatch(_)) => {
                    error!("Acquisition task stopped");
                    return;
                }
                Err(SourceError::Transport) => {}
            }
        }
    }

    let mut ticker = Ticker::every(config.sample_period);

    loop {
        acquisition.cycle(level, &mut ticker).await;
    }
}
