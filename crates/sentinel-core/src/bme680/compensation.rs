//! Raw ADC counts to physical units.
//!
//! The polynomials below are the vendor's empirically fitted compensation
//! formulas. The shift amounts and divisor constants are load-bearing;
//! they must not be rearranged or "simplified".

use super::RawSample;
use super::calibration::{CalibrationData, GasCalibration, HumidityCalibration, TemperatureCalibration};
use crate::reading::EnvironmentalReading;

/// High-resolution temperature intermediate.
///
/// Produced by [`compensate_temperature`] and required by the pressure and
/// humidity formulas for the *same* sample. [`compensate_all`] enforces
/// that ordering; the inner value is deliberately not constructible
/// outside this crate.
#[derive(Debug, Clone, Copy)]
pub struct FineTemperature(i32);

// Fixed pressure coefficient profile; the chip's pressure trim registers
// are not read.
// TODO: read the pressure coefficient block from the sensor instead of
// this fixed profile.
const PAR_P1: i64 = 36477;
const PAR_P2: i64 = -10685;
const PAR_P3: i64 = 3024;
const PAR_P4: i64 = 2855;
const PAR_P5: i64 = 140;
const PAR_P6: i64 = -7;
const PAR_P7: i64 = 15500;
const PAR_P8: i64 = -14600;
const PAR_P9: i64 = 6000;

const LOOKUP_TABLE_1: [u32; 16] = [
    2147483647, 2147483647, 2147483647, 2147483647,
    2147483647, 2126008810, 2147483647, 2130303777,
    2147483647, 2147483647, 2143188679, 2136746228,
    2147483647, 2126008810, 2147483647, 2147483647,
];

// Not referenced by the resistance formula below.
#[allow(dead_code)]
const LOOKUP_TABLE_2: [u32; 16] = [
    4096000000, 2048000000, 1024000000, 512000000,
    255744255, 127110228, 64000000, 32258064,
    16016016, 8000000, 4000000, 2000000,
    1000000, 500000, 250000, 125000,
];

/// Temperature in °C, plus the fine intermediate for the rest of the
/// sample.
pub fn compensate_temperature(
    temp_raw: i32,
    calib: &TemperatureCalibration,
) -> (f32, FineTemperature) {
    let var1 = (temp_raw as f32 / 16384.0 - calib.par_t1 as f32 / 1024.0) * calib.par_t2 as f32;
    let diff = temp_raw as f32 / 131072.0 - calib.par_t1 as f32 / 8192.0;
    let var2 = diff * diff * calib.par_t3 as f32;
    let fine = var1 + var2;
    (fine / 5120.0, FineTemperature(fine as i32))
}

/// Pressure in Pa from the 64-bit fixed-point polynomial.
///
/// Returns a 0 Pa sentinel when the divisor degenerates; callers must
/// treat that as "compensation degenerate", not a real reading.
pub fn compensate_pressure(press_raw: i32, fine: FineTemperature) -> f32 {
    let mut var1 = fine.0 as i64 - 128000;
    let mut var2 = var1 * var1 * PAR_P6;
    var2 += (var1 * PAR_P5) << 17;
    var2 += PAR_P4 << 35;
    var1 = ((var1 * var1 * PAR_P3) >> 8) + ((PAR_P2 * var1) << 12);
    var1 = ((1i64 << 47) + var1) * PAR_P1 >> 33;

    if var1 == 0 {
        return 0.0;
    }

    let mut p = 1_048_576 - press_raw as i64;
    p = (((p << 31) - var2) * 3125) / var1;
    var1 = (PAR_P9 * (p >> 13) * (p >> 13)) >> 25;
    var2 = (PAR_P8 * p) >> 19;

    p = ((p + var1 + var2) >> 8) + (PAR_P7 << 4);
    p as f32 / 256.0
}

/// Relative humidity in %, clamped to [0, 100].
pub fn compensate_humidity(
    hum_raw: i32,
    fine: FineTemperature,
    calib: &HumidityCalibration,
) -> f32 {
    let par_h1 = calib.par_h1 as i32;
    let par_h2 = calib.par_h2 as i32;
    let par_h3 = calib.par_h3 as i32;
    let par_h4 = calib.par_h4 as i32;
    let par_h5 = calib.par_h5 as i32;
    let par_h6 = calib.par_h6 as i32;
    let par_h7 = calib.par_h7 as i32;

    // Temperature in 0.01 °C units.
    let temp_scaled: i32 = ((fine.0 * 5) + 128) >> 8;

    let var1 = hum_raw - (par_h1 * 16) - (((temp_scaled * par_h3) / 100) >> 1);
    let var2 = (par_h2
        * ((temp_scaled * par_h4) / 100
            + (((temp_scaled * ((temp_scaled * par_h5) / 100)) >> 6) / 100)
            + (1 << 14)))
        >> 10;
    let var3 = var1 * var2;
    let var4 = ((par_h6 << 7) + (temp_scaled * par_h7) / 100) >> 4;
    let var5 = ((var3 >> 14) * (var3 >> 14)) >> 10;
    let var6 = (var4 * var5) >> 1;

    let hum_comp = ((var3 + var6) >> 10).clamp(0, 100_000);
    hum_comp as f32 / 1000.0
}

/// Gas resistance in Ω.
///
/// `gas_range` must be the masked 4-bit field from the data block; the
/// table lookup is not range-checked here.
pub fn compensate_gas(gas_adc: u16, gas_range: u8, calib: &GasCalibration) -> f32 {
    let var1 = 1340.0 + 5.0 * calib.range_sw_err as f32;
    let var2 = LOOKUP_TABLE_1[gas_range as usize] as f32 / 65536.0;
    let var3 = 1.0 + gas_adc as f32 / 262144.0;
    var2 * var1 * var3
}

/// Compensate one whole sample.
///
/// Recomputes the fine temperature from this sample before the pressure
/// and humidity formulas consume it, so the intermediate can never leak
/// across samples.
pub fn compensate_all(sample: &RawSample, calib: &CalibrationData) -> EnvironmentalReading {
    let (temperature, fine) = compensate_temperature(sample.temp_raw, &calib.temperature);
    EnvironmentalReading {
        temperature,
        pressure: compensate_pressure(sample.press_raw, fine),
        humidity: compensate_humidity(sample.hum_raw, fine, &calib.humidity),
        gas_resistance: compensate_gas(sample.gas_adc, sample.gas_range, &calib.gas),
    }
}
