//! Periodic acquisition, compensation and publish.

use embassy_time::Timer;
use log::{info, warn};
use sentinel_core::bme680::compensation::compensate_all;
use sentinel_core::bme680::{Bme680, CalibrationData};
use sentinel_core::reading::Emergency;
use sentinel_core::state::SharedEnvironmentalState;

use crate::config::{CONVERSION_SETTLE, SAMPLING_PERIOD};
use crate::tasks::NodeI2c;

#[embassy_executor::task]
pub async fn sampling_task(
    mut sensor: Bme680<NodeI2c>,
    calibration: CalibrationData,
    state: &'static SharedEnvironmentalState,
) -> ! {
    info!("Sampling task started");

    loop {
        Timer::after(SAMPLING_PERIOD).await;

        // One forced conversion per cycle; the chip sleeps in between.
        if let Err(e) = sensor.trigger_forced_conversion().await {
            warn!("Sample cycle skipped: {}", e);
            continue;
        }
        Timer::after(CONVERSION_SETTLE).await;

        let raw = match sensor.read_raw_sample().await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Sample cycle skipped: {}", e);
                continue;
            }
        };

        let reading = compensate_all(&raw, &calibration);
        let emergency = Emergency::classify(&reading);
        info!(
            "T: {:.2} C | P: {:.2} Pa | H: {:.2} % | Gas: {:.2} Ohm",
            reading.temperature, reading.pressure, reading.humidity, reading.gas_resistance
        );
        if emergency.is_active() {
            warn!("DANGER: environmental threshold exceeded");
        }

        // Dropped, not queued, if the lock wait times out.
        if state.publish(reading, emergency).await.is_err() {
            warn!("Publish skipped: state lock busy");
        }
    }
}
