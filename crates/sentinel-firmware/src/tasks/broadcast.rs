//! Peer status broadcast over the ESP-NOW datagram link.
//!
//! Outgoing only: received peer messages are logged and dropped, nothing
//! in the node consumes them yet.

use embassy_time::Timer;
use esp_radio::esp_now::{BROADCAST_ADDRESS, EspNowReceiver, EspNowSender};
use log::{debug, info, warn};
use sentinel_core::message::StatusMessage;
use sentinel_core::state::SharedEnvironmentalState;

use crate::config::BROADCAST_PERIOD;

#[embassy_executor::task]
pub async fn broadcast_task(
    mut sender: EspNowSender<'static>,
    state: &'static SharedEnvironmentalState,
) -> ! {
    info!("Broadcast task started");

    let mut sequence: u16 = 0;

    loop {
        Timer::after(BROADCAST_PERIOD).await;

        let (reading, emergency) = match state.snapshot().await {
            Ok(pair) => pair,
            Err(_) => {
                warn!("Broadcast skipped: state lock busy");
                continue;
            }
        };

        sequence = sequence.wrapping_add(1);
        let message = StatusMessage {
            sequence,
            reading,
            emergency,
        };
        let frame = match message.encode() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Status encode failed: {:?}", e);
                continue;
            }
        };

        if let Err(e) = sender.send_async(&BROADCAST_ADDRESS, &frame).await {
            warn!("Status broadcast failed: {:?}", e);
        }
    }
}

#[embassy_executor::task]
pub async fn peer_listen_task(mut receiver: EspNowReceiver<'static>) -> ! {
    info!("Peer listen task started");

    loop {
        let frame = receiver.receive_async().await;
        match StatusMessage::decode(frame.data()) {
            Ok(message) => info!(
                "Peer {:02x?}: seq={} T={:.1} C emergency={:?}",
                frame.info.src_address, message.sequence, message.reading.temperature, message.emergency
            ),
            Err(_) => debug!(
                "Ignoring non-status frame from {:02x?}",
                frame.info.src_address
            ),
        }
    }
}
