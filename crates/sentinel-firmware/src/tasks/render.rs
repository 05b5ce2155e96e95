//! Periodic snapshot-and-draw.

use embassy_time::Timer;
use log::{error, info, warn};
use sentinel_core::render::FrameComposer;
use sentinel_core::state::SharedEnvironmentalState;
use ssd1306::Ssd1306Async;
use ssd1306::mode::BufferedGraphicsModeAsync;
use ssd1306::prelude::*;

use crate::config::RENDER_PERIOD;
use crate::tasks::NodeI2c;

pub type NodeDisplay = Ssd1306Async<
    I2CInterface<NodeI2c>,
    DisplaySize128x64,
    BufferedGraphicsModeAsync<DisplaySize128x64>,
>;

#[embassy_executor::task]
pub async fn render_task(mut display: NodeDisplay, state: &'static SharedEnvironmentalState) -> ! {
    info!("Render task started");

    let mut composer = FrameComposer::new();

    loop {
        Timer::after(RENDER_PERIOD).await;

        // The lock is released before any drawing happens.
        let (reading, emergency) = match state.snapshot().await {
            Ok(pair) => pair,
            Err(_) => {
                warn!("Render cycle skipped: state lock busy");
                continue;
            }
        };

        display.clear_buffer();
        // Drawing into the buffer is infallible; errors surface at flush.
        let _ = composer.compose(&mut display, &reading, emergency);
        if let Err(e) = display.flush().await {
            error!("Display flush failed: {:?}", e);
        }
    }
}
