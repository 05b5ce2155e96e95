#![no_std]

//! Hardware-independent core for the sentinel environmental monitoring node.
//!
//! Everything that can be exercised without a board lives here: the BME680
//! register map and compensation math, the shared state the sampling and
//! render tasks exchange, the display frame composition, and the peer
//! status message codec. The firmware crate wires these to the ESP32.

extern crate alloc;

pub mod bme680;
pub mod i2c_bus;
pub mod message;
pub mod reading;
pub mod render;
pub mod state;
