//! The node's periodic tasks.
//!
//! The tasks never call each other; they meet only at the shared
//! environmental state, and each one skips its cycle rather than wait
//! past the state lock bound.

mod broadcast;
mod render;
mod sampling;

pub use broadcast::{broadcast_task, peer_listen_task};
pub use render::{NodeDisplay, render_task};
pub use sampling::sampling_task;

use sentinel_core::i2c_bus::SharedI2cDevice;

/// One logical device on the node's shared I2C bus.
pub type NodeI2c = SharedI2cDevice<'static, esp_hal::i2c::master::I2c<'static, esp_hal::Async>>;
