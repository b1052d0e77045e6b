//! Display task
//!
//! Maps the latest sample to display units on its own ticker and signals
//! the UI when a value changed.

use defmt::*;
use embassy_time::Ticker;

use inclino_core::config::LevelConfig;
use inclino_core::display::DisplayMapper;

use super::Level;
use crate::channels::{DISPLAY_REFRESH, LEVEL_UPDATE};

/// Display task
#[embassy_executor::task]
pub async fn display_task(level: &'static Level, config: LevelConfig) {
    info!("Display task started");

    let mut mapper = DisplayMapper::new(config.mapping);
    let mut ticker = Ticker::every(config.display_period);

    loop {
        ticker.next().await;

        if DISPLAY_REFRESH.try_take().is_some() {
            mapper.reset();
        }

        if let Some(update) = mapper.poll(level, config.lock_timeout).await {
            // Keep the change flags of an update the UI has not taken yet
            LEVEL_UPDATE.signal(update.coalesce(LEVEL_UPDATE.try_take()));
        }
    }
}
