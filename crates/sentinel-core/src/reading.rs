//! Physical-unit readings and the emergency classification derived from
//! them.

use serde::{Deserialize, Serialize};

/// Temperatures above this are classified as dangerous.
pub const DANGER_TEMPERATURE_C: f32 = 40.0;
/// Pressures above this are classified as dangerous.
pub const DANGER_PRESSURE_PA: f32 = 110_000.0;
/// Humidity above this is classified as dangerous.
pub const DANGER_HUMIDITY_PCT: f32 = 60.0;

/// One set of compensated readings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalReading {
    /// °C.
    pub temperature: f32,
    /// Pa. A value of exactly 0.0 is the degenerate-compensation sentinel.
    pub pressure: f32,
    /// %RH, in [0, 100].
    pub humidity: f32,
    /// Ω.
    pub gas_resistance: f32,
}

/// Emergency classification carried alongside the reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Emergency {
    #[default]
    None,
    Danger,
    /// Reserved for a future fall-detection trigger; nothing produces this
    /// today.
    Fall,
}

impl Emergency {
    /// Threshold rule applied to every published reading.
    ///
    /// All comparisons are strict: a reading exactly at a threshold is
    /// still safe.
    // TODO: add a gas-resistance threshold once the resistance calculation
    // is trusted.
    pub fn classify(reading: &EnvironmentalReading) -> Self {
        if reading.temperature > DANGER_TEMPERATURE_C
            || reading.pressure > DANGER_PRESSURE_PA
            || reading.humidity > DANGER_HUMIDITY_PCT
        {
            Emergency::Danger
        } else {
            Emergency::None
        }
    }

    pub fn is_active(self) -> bool {
        !matches!(self, Emergency::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(temperature: f32, pressure: f32, humidity: f32) -> EnvironmentalReading {
        EnvironmentalReading {
            temperature,
            pressure,
            humidity,
            gas_resistance: 50_000.0,
        }
    }

    #[test]
    fn thresholds_are_strict() {
        assert_eq!(
            Emergency::classify(&reading(40.0, 100_000.0, 50.0)),
            Emergency::None
        );
        assert_eq!(
            Emergency::classify(&reading(40.01, 100_000.0, 50.0)),
            Emergency::Danger
        );

        assert_eq!(
            Emergency::classify(&reading(20.0, 110_000.0, 50.0)),
            Emergency::None
        );
        assert_eq!(
            Emergency::classify(&reading(20.0, 110_000.5, 50.0)),
            Emergency::Danger
        );

        assert_eq!(
            Emergency::classify(&reading(20.0, 100_000.0, 60.0)),
            Emergency::None
        );
        assert_eq!(
            Emergency::classify(&reading(20.0, 100_000.0, 60.01)),
            Emergency::Danger
        );
    }

    #[test]
    fn any_single_exceeded_threshold_is_enough() {
        assert_eq!(
            Emergency::classify(&reading(45.0, 100_000.0, 50.0)),
            Emergency::Danger
        );
        assert_eq!(
            Emergency::classify(&reading(20.0, 120_000.0, 50.0)),
            Emergency::Danger
        );
        assert_eq!(
            Emergency::classify(&reading(20.0, 100_000.0, 80.0)),
            Emergency::Danger
        );
    }

    #[test]
    fn default_reading_is_safe() {
        assert_eq!(
            Emergency::classify(&EnvironmentalReading::default()),
            Emergency::None
        );
    }
}
