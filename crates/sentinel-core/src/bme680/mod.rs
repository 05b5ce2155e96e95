//! BME680 environmental sensor: register transport, raw sampling and the
//! one-time calibration read.
//!
//! The device is generic over [`embedded_hal_async::i2c::I2c`] so the same
//! driver runs against the board's shared bus or a scripted bus in tests.
//! Compensation of the raw ADC counts is a separate, pure layer in
//! [`compensation`].

pub mod calibration;
pub mod compensation;

use embedded_hal_async::i2c::I2c;
use log::error;
use thiserror_no_std::Error;

pub use calibration::CalibrationData;

/// Default I2C address with SDO pulled low.
pub const DEFAULT_ADDRESS: u8 = 0x76;

/// Value the chip id register must report.
pub const CHIP_ID: u8 = 0x61;

mod regs {
    pub const CHIP_ID: u8 = 0xD0;
    pub const CTRL_HUM: u8 = 0x72;
    pub const CTRL_MEAS: u8 = 0x74;
    pub const CONFIG: u8 = 0x75;
    /// Start of the 15-byte pressure/temperature/humidity/gas data block.
    pub const DATA_START: u8 = 0x1F;

    pub const PAR_T1: u8 = 0xE9;
    pub const PAR_T2: u8 = 0x8A;
    pub const PAR_T3: u8 = 0x8C;
    /// Seven-byte packed humidity coefficient block.
    pub const HUM_BLOCK: u8 = 0xE1;
    pub const PAR_H6: u8 = 0xE9;
    pub const PAR_H7: u8 = 0xEA;
    pub const PAR_G1: u8 = 0xED;
    pub const PAR_G2: u8 = 0xEC;
    pub const PAR_G3: u8 = 0xEE;
    pub const RES_HEAT_VAL: u8 = 0x00;
    pub const RES_HEAT_RANGE: u8 = 0x02;
    pub const RANGE_SW_ERR: u8 = 0x04;
}

mod ctrl {
    pub const OVERSAMPLING_T: u8 = 0x02; // x2
    pub const OVERSAMPLING_P: u8 = 0x05; // x16
    pub const OVERSAMPLING_H: u8 = 0x01; // x1
    pub const IIR_FILTER: u8 = 0x02; // filter coefficient = 3
    pub const MODE_FORCED: u8 = 0x01;
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    #[error("register transfer failed")]
    Bus,
    #[error("unexpected chip id: {found:#04x}")]
    IdentityMismatch { found: u8 },
}

/// One capture of the raw ADC counts, consumed immediately by compensation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    /// 20-bit temperature ADC code.
    pub temp_raw: i32,
    /// 20-bit pressure ADC code.
    pub press_raw: i32,
    /// 16-bit humidity ADC code.
    pub hum_raw: i32,
    /// 10-bit gas resistance ADC code.
    pub gas_adc: u16,
    /// 4-bit gas range index, masked during extraction.
    pub gas_range: u8,
}

pub struct Bme680<I> {
    i2c: I,
    address: u8,
}

impl<I: I2c> Bme680<I> {
    pub fn new(i2c: I, address: u8) -> Self {
        Self { i2c, address }
    }

    async fn write_register(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        self.i2c.write(self.address, &[reg, value]).await.map_err(|e| {
            error!("BME680 write of register {:#04x} failed: {:?}", reg, e);
            SensorError::Bus
        })
    }

    async fn read_registers(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), SensorError> {
        self.i2c
            .write_read(self.address, &[reg], buf)
            .await
            .map_err(|e| {
                error!("BME680 read at register {:#04x} failed: {:?}", reg, e);
                SensorError::Bus
            })
    }

    /// Confirm the chip identity before anything else touches the device.
    pub async fn verify_identity(&mut self) -> Result<(), SensorError> {
        let mut id = [0u8; 1];
        self.read_registers(regs::CHIP_ID, &mut id).await?;
        if id[0] != CHIP_ID {
            return Err(SensorError::IdentityMismatch { found: id[0] });
        }
        Ok(())
    }

    /// Read the factory coefficient blocks.
    ///
    /// Must run once, after [`Self::verify_identity`] and before any
    /// compensation; a transport failure here is a fatal startup error for
    /// the caller.
    pub async fn load_calibration(&mut self) -> Result<CalibrationData, SensorError> {
        let mut buf_t1 = [0u8; 2];
        let mut buf_t2 = [0u8; 2];
        let mut buf_t3 = [0u8; 1];
        self.read_registers(regs::PAR_T1, &mut buf_t1).await?;
        self.read_registers(regs::PAR_T2, &mut buf_t2).await?;
        self.read_registers(regs::PAR_T3, &mut buf_t3).await?;
        let temperature = calibration::TemperatureCalibration::from_registers(buf_t1, buf_t2, buf_t3[0]);

        let mut hum_block = [0u8; 7];
        let mut par_h6 = [0u8; 1];
        let mut par_h7 = [0u8; 1];
        self.read_registers(regs::HUM_BLOCK, &mut hum_block).await?;
        self.read_registers(regs::PAR_H6, &mut par_h6).await?;
        self.read_registers(regs::PAR_H7, &mut par_h7).await?;
        let humidity = calibration::HumidityCalibration::from_registers(hum_block, par_h6[0], par_h7[0]);

        let mut buf_g1 = [0u8; 1];
        let mut buf_g2 = [0u8; 2];
        let mut buf_g3 = [0u8; 1];
        let mut res_heat_val = [0u8; 1];
        let mut res_heat_range = [0u8; 1];
        let mut range_sw_err = [0u8; 1];
        self.read_registers(regs::PAR_G1, &mut buf_g1).await?;
        self.read_registers(regs::PAR_G2, &mut buf_g2).await?;
        self.read_registers(regs::PAR_G3, &mut buf_g3).await?;
        self.read_registers(regs::RES_HEAT_VAL, &mut res_heat_val).await?;
        self.read_registers(regs::RES_HEAT_RANGE, &mut res_heat_range).await?;
        self.read_registers(regs::RANGE_SW_ERR, &mut range_sw_err).await?;
        let gas = calibration::GasCalibration::from_registers(
            buf_g1[0],
            buf_g2,
            buf_g3[0],
            res_heat_val[0],
            res_heat_range[0],
            range_sw_err[0],
        );

        Ok(CalibrationData {
            temperature,
            humidity,
            gas,
        })
    }

    /// Kick off one forced-mode conversion.
    ///
    /// The chip measures once and drops back to sleep; the data block is
    /// valid after the conversion settle time.
    pub async fn trigger_forced_conversion(&mut self) -> Result<(), SensorError> {
        self.write_register(regs::CTRL_HUM, ctrl::OVERSAMPLING_H).await?;
        self.write_register(regs::CONFIG, ctrl::IIR_FILTER << 2).await?;
        self.write_register(
            regs::CTRL_MEAS,
            (ctrl::OVERSAMPLING_T << 5) | (ctrl::OVERSAMPLING_P << 2) | ctrl::MODE_FORCED,
        )
        .await
    }

    /// Burst-read the data block into one [`RawSample`].
    pub async fn read_raw_sample(&mut self) -> Result<RawSample, SensorError> {
        let mut data = [0u8; 15];
        self.read_registers(regs::DATA_START, &mut data).await?;

        let press_raw = ((data[0] as u32) << 12 | (data[1] as u32) << 4 | (data[2] as u32) >> 4) as i32;
        let temp_raw = ((data[3] as u32) << 12 | (data[4] as u32) << 4 | (data[5] as u32) >> 4) as i32;
        let hum_raw = ((data[6] as u32) << 8 | data[7] as u32) as i32;

        let gas_adc = ((data[13] as u16) << 2) | ((data[14] & 0xC0) as u16 >> 6);
        let gas_range = data[14] & 0x0F;

        Ok(RawSample {
            temp_raw,
            press_raw,
            hum_raw,
            gas_adc,
            gas_range,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embedded_hal_async::i2c::{ErrorKind, ErrorType, Operation};

    #[derive(Debug)]
    struct BusFault;

    impl embedded_hal_async::i2c::Error for BusFault {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    /// Scripted register file standing in for the sensor on the bus.
    struct ScriptedBus {
        fail: bool,
    }

    impl ScriptedBus {
        fn register(&self, reg: u8) -> u8 {
            match reg {
                0xD0 => 0x61,
                // Temperature coefficients: par_t1 = 26126, par_t2 = 26372, par_t3 = 3.
                0xE9 => 0x0E,
                0xEA => 0x66,
                0x8A => 0x04,
                0x8B => 0x67,
                0x8C => 0x03,
                // Packed humidity block.
                0xE1 => 0x2A,
                0xE2 => 0x13,
                0xE3 => 0x3F,
                0xE4 => 0x00,
                0xE5 => 0x2D,
                0xE6 => 0x14,
                0xE7 => 0x78,
                // Gas coefficients and heater trim.
                0xEC => 0x10,
                0xED => 0x05,
                0xEE => 0xFC,
                0x00 => 0x32,
                0x02 => 0x30,
                0x04 => 0xA0,
                // Data block: press 415148, temp 491176, hum 13500, gas 500 @ range 10.
                0x1F => 0x65,
                0x20 => 0x5A,
                0x21 => 0xC0,
                0x22 => 0x77,
                0x23 => 0xEA,
                0x24 => 0x80,
                0x25 => 0x34,
                0x26 => 0xBC,
                0x2C => 0x7D,
                0x2D => 0x0A,
                _ => 0x00,
            }
        }
    }

    impl ErrorType for ScriptedBus {
        type Error = BusFault;
    }

    impl embedded_hal_async::i2c::I2c for ScriptedBus {
        async fn transaction(
            &mut self,
            _address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), BusFault> {
            if self.fail {
                return Err(BusFault);
            }
            let mut start = 0u8;
            for op in operations {
                match op {
                    Operation::Write(bytes) => start = bytes[0],
                    Operation::Read(buf) => {
                        for (i, byte) in buf.iter_mut().enumerate() {
                            *byte = self.register(start.wrapping_add(i as u8));
                        }
                    }
                }
            }
            Ok(())
        }
    }

    fn scripted_sensor() -> Bme680<ScriptedBus> {
        Bme680::new(ScriptedBus { fail: false }, DEFAULT_ADDRESS)
    }

    #[test]
    fn identity_check_accepts_the_expected_chip_id() {
        let mut sensor = scripted_sensor();
        block_on(sensor.verify_identity()).unwrap();
    }

    #[test]
    fn identity_check_rejects_a_foreign_chip() {
        struct WrongChip;
        impl ErrorType for WrongChip {
            type Error = BusFault;
        }
        impl embedded_hal_async::i2c::I2c for WrongChip {
            async fn transaction(
                &mut self,
                _address: u8,
                operations: &mut [Operation<'_>],
            ) -> Result<(), BusFault> {
                for op in operations {
                    if let Operation::Read(buf) = op {
                        buf.fill(0x55);
                    }
                }
                Ok(())
            }
        }

        let mut sensor = Bme680::new(WrongChip, DEFAULT_ADDRESS);
        assert_eq!(
            block_on(sensor.verify_identity()),
            Err(SensorError::IdentityMismatch { found: 0x55 })
        );
    }

    #[test]
    fn calibration_load_unpacks_every_coefficient_group() {
        let mut sensor = scripted_sensor();
        let calib = block_on(sensor.load_calibration()).unwrap();

        assert_eq!(calib.temperature.par_t1, 26126);
        assert_eq!(calib.temperature.par_t2, 26372);
        assert_eq!(calib.temperature.par_t3, 3);

        assert_eq!(calib.humidity.par_h1, 675);
        assert_eq!(calib.humidity.par_h2, 1009);
        assert_eq!(calib.humidity.par_h3, 0);
        assert_eq!(calib.humidity.par_h4, -44);
        assert_eq!(calib.humidity.par_h5, -127);
        assert_eq!(calib.humidity.par_h6, 0x0E);
        assert_eq!(calib.humidity.par_h7, 0x66);

        assert_eq!(calib.gas.par_g1, 5);
        assert_eq!(calib.gas.par_g2, 1296);
        assert_eq!(calib.gas.par_g3, -4);
        assert_eq!(calib.gas.res_heat_val, 0x32);
        assert_eq!(calib.gas.res_heat_range, 3);
        assert_eq!(calib.gas.range_sw_err, 10);
    }

    #[test]
    fn raw_sample_unpacks_the_data_block() {
        let mut sensor = scripted_sensor();
        let raw = block_on(sensor.read_raw_sample()).unwrap();

        assert_eq!(raw.press_raw, 415148);
        assert_eq!(raw.temp_raw, 491176);
        assert_eq!(raw.hum_raw, 13500);
        assert_eq!(raw.gas_adc, 500);
        assert_eq!(raw.gas_range, 10);
    }

    #[test]
    fn transport_failure_surfaces_as_a_bus_error() {
        let mut sensor = Bme680::new(ScriptedBus { fail: true }, DEFAULT_ADDRESS);
        assert_eq!(block_on(sensor.load_calibration()), Err(SensorError::Bus));
        assert_eq!(block_on(sensor.read_raw_sample()), Err(SensorError::Bus));
    }
}
