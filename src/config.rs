//! User settable device configuration and its `ctrl_meas`/`config` register encoding.

use core::convert::TryFrom;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::InvalidArgument;
use crate::registers::{field, IirFilter, Oversampling, StandbyTime};
use crate::Mode;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceConfiguration {
    pub temperature_oversampling: Oversampling,
    pub pressure_oversampling: Oversampling,
    /// `t_sb` code, see [`StandbyTime`]
    pub standby_time: u8,
    /// IIR filter code, see [`IirFilter`]
    pub filter: u8,
    pub mode: Mode,
}

impl Default for DeviceConfiguration {
    fn default() -> Self {
        Self {
            temperature_oversampling: Oversampling::StandardResolution,
            pressure_oversampling: Oversampling::StandardResolution,
            standby_time: StandbyTime::Ms1000 as u8,
            filter: IirFilter::X16 as u8,
            mode: Mode::Normal,
        }
    }
}

impl DeviceConfiguration {
    /// Weather monitoring: single samples, no filtering, slowest normal mode rate
    pub fn low_power() -> Self {
        Self::default()
            .with_oversampling(Oversampling::UltraLowPower, Oversampling::UltraLowPower)
            .with_filter(IirFilter::Off)
            .with_standby_time(StandbyTime::Ms4000)
    }

    /// Indoor navigation: highest pressure resolution with the strongest filter
    pub fn high_accuracy() -> Self {
        Self::default()
            .with_oversampling(Oversampling::LowPower, Oversampling::UltraHighResolution)
            .with_filter(IirFilter::X16)
            .with_standby_time(StandbyTime::Ms0_5)
    }

    pub fn with_oversampling(mut self, temperature: Oversampling, pressure: Oversampling) -> Self {
        self.temperature_oversampling = temperature;
        self.pressure_oversampling = pressure;
        self
    }

    pub fn with_standby_time(mut self, standby_time: StandbyTime) -> Self {
        self.standby_time = standby_time as u8;
        self
    }

    pub fn with_filter(mut self, filter: IirFilter) -> Self {
        self.filter = filter as u8;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn validate(&self) -> Result<(), InvalidArgument> {
        if self.standby_time > field::THREE_BITS || self.filter > field::THREE_BITS {
            return Err(InvalidArgument);
        }
        Ok(())
    }

    /// `ctrl_meas` (0xF4): osrs_t[7:5], osrs_p[4:2], mode[1:0]
    pub fn ctrl_meas(&self) -> u8 {
        (self.temperature_oversampling as u8) << field::TEMPERATURE_OVERSAMPLING_OFFSET
            | (self.pressure_oversampling as u8) << field::PRESSURE_OVERSAMPLING_OFFSET
            | self.mode as u8
    }

    /// `config` (0xF5): t_sb[7:5], filter[4:2], spi3w_en left cleared
    pub fn config_byte(&self) -> u8 {
        (self.standby_time & field::THREE_BITS) << field::STANDBY_OFFSET
            | (self.filter & field::THREE_BITS) << field::FILTER_OFFSET
    }

    pub fn from_registers(ctrl_meas: u8, config: u8) -> Self {
        Self {
            temperature_oversampling: Oversampling::from_bits(
                ctrl_meas >> field::TEMPERATURE_OVERSAMPLING_OFFSET,
            ),
            pressure_oversampling: Oversampling::from_bits(
                ctrl_meas >> field::PRESSURE_OVERSAMPLING_OFFSET,
            ),
            standby_time: (config >> field::STANDBY_OFFSET) & field::THREE_BITS,
            filter: (config >> field::FILTER_OFFSET) & field::THREE_BITS,
            mode: Mode::from_bits(ctrl_meas),
        }
    }

    /// Upper bound of one conversion in milliseconds, datasheet appendix B
    pub fn max_measurement_time_ms(&self) -> u8 {
        let temperature = self.temperature_oversampling.samples() as u32;
        let pressure = self.pressure_oversampling.samples() as u32;
        // microseconds
        let mut time = 1250 + 2300 * temperature;
        if pressure > 0 {
            time += 2300 * pressure + 575;
        }
        ((time + 999) / 1000) as u8
    }
}

impl TryFrom<u8> for Mode {
    type Error = InvalidArgument;

    fn try_from(value: u8) -> Result<Self, InvalidArgument> {
        match value {
            0b00 => Ok(Mode::Sleep),
            0b01 => Ok(Mode::Forced),
            0b11 => Ok(Mode::Normal),
            _ => Err(InvalidArgument),
        }
    }
}

impl Mode {
    /// Decodes the mode field of `ctrl_meas`, both 0b01 and 0b10 select forced mode
    pub fn from_bits(ctrl_meas: u8) -> Self {
        match ctrl_meas & field::MODE_MASK {
            0b00 => Mode::Sleep,
            0b11 => Mode::Normal,
            _ => Mode::Forced,
        }
    }
}
