#![no_std]

//! ESP32 glue for the sentinel environmental monitoring node.
//!
//! All decision logic lives in `sentinel-core`; this crate owns the boot
//! sequence and the periodic tasks that drive it.

pub mod config;
pub mod tasks;
