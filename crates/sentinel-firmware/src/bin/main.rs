#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]

use embassy_executor::Spawner;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Timer};
use esp_hal::clock::CpuClock;
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;
use esp_radio::esp_now::{BROADCAST_ADDRESS, PeerInfo};
use log::info;
use sentinel_core::bme680::{self, Bme680};
use sentinel_core::i2c_bus::SharedI2cDevice;
use sentinel_core::state::SharedEnvironmentalState;
use sentinel_firmware::tasks::{
    broadcast_task, peer_listen_task, render_task, sampling_task,
};
use ssd1306::mode::DisplayConfigAsync;
use ssd1306::prelude::*;
use ssd1306::{I2CDisplayInterface, Ssd1306Async};
use static_cell::StaticCell;

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
esp_bootloader_esp_idf::esp_app_desc!();

static I2C_BUS: StaticCell<Mutex<CriticalSectionRawMutex, I2c<'static, esp_hal::Async>>> =
    StaticCell::new();
static RADIO: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();

/// The one resource the tasks share, injected into each at spawn.
static ENV_STATE: SharedEnvironmentalState = SharedEnvironmentalState::new();

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 73744);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Embassy initialized");

    // Radio bring-up for the ESP-NOW broadcast link.
    let radio = RADIO.init(esp_radio::init().expect("Failed to initialize radio controller"));
    let (mut wifi_controller, interfaces) =
        esp_radio::wifi::new(radio, peripherals.WIFI, Default::default())
            .expect("Failed to initialize Wi-Fi controller");
    wifi_controller
        .set_mode(esp_radio::wifi::WifiMode::Sta)
        .expect("Failed to select station mode");
    wifi_controller
        .start_async()
        .await
        .expect("Failed to start Wi-Fi for the broadcast link");

    // One I2C bus carries both the sensor and the display.
    let i2c = I2c::new(
        peripherals.I2C0,
        I2cConfig::default().with_frequency(Rate::from_khz(100)),
    )
    .expect("Failed to initialize I2C")
    .with_sda(peripherals.GPIO21)
    .with_scl(peripherals.GPIO22)
    .into_async();
    let i2c_bus = I2C_BUS.init(Mutex::new(i2c));

    // Sensor startup order is fixed: identity first, then the one-time
    // calibration read. Either failing here is fatal; no task is spawned.
    let mut sensor = Bme680::new(SharedI2cDevice::new(i2c_bus), bme680::DEFAULT_ADDRESS);
    sensor
        .verify_identity()
        .await
        .expect("BME680 identity check failed");
    let calibration = sensor
        .load_calibration()
        .await
        .expect("BME680 calibration read failed");
    info!("Sensor identified, calibration loaded");

    let interface = I2CDisplayInterface::new(SharedI2cDevice::new(i2c_bus));
    let mut display = Ssd1306Async::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    display.init().await.expect("Failed to initialize display");

    info!("Display initialized");

    let mut esp_now = interfaces.esp_now;
    esp_now
        .add_peer(PeerInfo {
            peer_address: BROADCAST_ADDRESS,
            lmk: None,
            channel: None,
            encrypt: false,
        })
        .expect("Failed to add broadcast peer");
    let (_manager, sender, receiver) = esp_now.split();

    spawner.must_spawn(sampling_task(sensor, calibration, &ENV_STATE));
    spawner.must_spawn(render_task(display, &ENV_STATE));
    spawner.must_spawn(broadcast_task(sender, &ENV_STATE));
    spawner.must_spawn(peer_listen_task(receiver));

    info!("Sentinel node running");

    loop {
        Timer::after(Duration::from_secs(60)).await;
    }
}
