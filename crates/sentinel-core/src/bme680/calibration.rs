//! Factory compensation coefficients.
//!
//! Populated once at startup from the chip's non-volatile trim registers
//! and read-only afterwards. The bit packing of the humidity and gas
//! groups follows the chip's register layout exactly.

/// Temperature coefficient group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TemperatureCalibration {
    pub par_t1: u16,
    pub par_t2: i16,
    pub par_t3: i8,
}

impl TemperatureCalibration {
    pub fn from_registers(t1: [u8; 2], t2: [u8; 2], t3: u8) -> Self {
        Self {
            par_t1: (t1[1] as u16) << 8 | t1[0] as u16,
            par_t2: ((t2[1] as u16) << 8 | t2[0] as u16) as i16,
            par_t3: t3 as i8,
        }
    }
}

/// Humidity coefficient group, unpacked from the seven-byte block plus two
/// single-register reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HumidityCalibration {
    pub par_h1: i16,
    pub par_h2: i16,
    pub par_h3: i8,
    pub par_h4: i8,
    pub par_h5: i8,
    pub par_h6: u8,
    pub par_h7: i8,
}

impl HumidityCalibration {
    pub fn from_registers(block: [u8; 7], h6: u8, h7: u8) -> Self {
        Self {
            par_h1: ((block[0] as i32) << 4 | (block[1] & 0x0F) as i32) as i16,
            par_h2: ((block[2] as i32) << 4 | (block[1] >> 4) as i32) as i16,
            par_h3: block[3] as i8,
            par_h4: ((block[4] as i8 as i32) << 4 | (block[5] & 0x0F) as i32) as i8,
            par_h5: ((block[5] as i8 as i32) >> 4 | (block[6] as i32) << 4) as i8,
            par_h6: h6,
            par_h7: h7 as i8,
        }
    }
}

/// Gas coefficient group, including the heater trim fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GasCalibration {
    pub par_g1: i8,
    pub par_g2: i16,
    pub par_g3: i8,
    /// Two-bit heater range, bits 5:4 of its register.
    pub res_heat_range: u8,
    pub res_heat_val: i8,
    /// Four-bit range switching error, bits 7:4 of its register.
    pub range_sw_err: i8,
}

impl GasCalibration {
    pub fn from_registers(
        g1: u8,
        g2: [u8; 2],
        g3: u8,
        res_heat_val: u8,
        res_heat_range: u8,
        range_sw_err: u8,
    ) -> Self {
        Self {
            par_g1: g1 as i8,
            par_g2: ((g2[1] as u16) << 8 | g2[0] as u16) as i16,
            par_g3: g3 as i8,
            res_heat_range: (res_heat_range & 0x30) >> 4,
            res_heat_val: res_heat_val as i8,
            range_sw_err: ((range_sw_err & 0xF0) >> 4) as i8,
        }
    }
}

/// All three coefficient groups, loaded in one startup pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalibrationData {
    pub temperature: TemperatureCalibration,
    pub humidity: HumidityCalibration,
    pub gas: GasCalibration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_coefficients_sign_extend() {
        let temp = TemperatureCalibration::from_registers([0x00, 0x80], [0xFF, 0xFF], 0xFD);
        assert_eq!(temp.par_t1, 0x8000);
        assert_eq!(temp.par_t2, -1);
        assert_eq!(temp.par_t3, -3);
    }

    #[test]
    fn humidity_nibble_packing_matches_the_register_layout() {
        let hum = HumidityCalibration::from_registers([0x2A, 0x13, 0x3F, 0x9C, 0x2D, 0x14, 0x78], 0x0E, 0x9A);
        assert_eq!(hum.par_h1, (0x2A << 4) | 0x03);
        assert_eq!(hum.par_h2, (0x3F << 4) | 0x01);
        assert_eq!(hum.par_h3, -100);
        assert_eq!(hum.par_h4, -44);
        assert_eq!(hum.par_h5, -127);
        assert_eq!(hum.par_h6, 14);
        assert_eq!(hum.par_h7, -102);
    }

    #[test]
    fn gas_trim_fields_extract_their_bit_ranges() {
        let gas = GasCalibration::from_registers(0xFB, [0x10, 0x05], 0x04, 0x9C, 0xFF, 0xF0);
        assert_eq!(gas.par_g1, -5);
        assert_eq!(gas.par_g2, 1296);
        assert_eq!(gas.par_g3, 4);
        assert_eq!(gas.res_heat_range, 3);
        assert_eq!(gas.res_heat_val, -100);
        assert_eq!(gas.range_sw_err, 15);
    }
}
