use core::convert::TryFrom;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::InvalidArgument;

pub const ID: u8 = 0x58;

pub const RESET: u8 = 0xb6;

pub const CALIBRATION_SIZE: usize = 24;

pub const MEASUREMENT_SIZE: usize = 6;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Register {
    Calib0 = 0x88,
    Id = 0xd0,
    Reset = 0xe0,
    Status = 0xf3,
    ControlMeasurement = 0xf4,
    Config = 0xf5,
    PressureMsb = 0xf7,
    PressureLsb = 0xf8,
    PressureXLsb = 0xf9,
    TemperatureMsb = 0xfa,
    TemperatureLsb = 0xfb,
    TemperatureXLsb = 0xfc,
}

/// Bit positions of the fields packed into `ctrl_meas` (0xF4) and `config` (0xF5)
pub mod field {
    pub const MODE_MASK: u8 = 0b11;
    pub const PRESSURE_OVERSAMPLING_OFFSET: u8 = 2;
    pub const TEMPERATURE_OVERSAMPLING_OFFSET: u8 = 5;
    pub const FILTER_OFFSET: u8 = 2;
    pub const STANDBY_OFFSET: u8 = 5;
    pub const THREE_BITS: u8 = 0b111;

    pub const STATUS_MEASURING: u8 = 1 << 3;
    pub const STATUS_IM_UPDATE: u8 = 1 << 0;
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Status {
    /// A conversion is running, cleared once results are in the data registers
    pub measuring: bool,
    /// NVM data is being copied to the image registers
    pub im_update: bool,
}

impl Status {
    pub fn from_bits(status: u8) -> Self {
        Self {
            measuring: status & field::STATUS_MEASURING != 0,
            im_update: status & field::STATUS_IM_UPDATE != 0,
        }
    }
}

/// Oversampling shared by the temperature (`osrs_t`) and pressure (`osrs_p`) fields
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Oversampling {
    Skipped = 0x0,
    UltraLowPower = 0x1,
    LowPower = 0x2,
    StandardResolution = 0x3,
    HighResolution = 0x4,
    UltraHighResolution = 0x5,
}

impl Oversampling {
    pub const ALL: [Oversampling; 6] = [
        Oversampling::Skipped,
        Oversampling::UltraLowPower,
        Oversampling::LowPower,
        Oversampling::StandardResolution,
        Oversampling::HighResolution,
        Oversampling::UltraHighResolution,
    ];

    /// Number of internal samples, 0 when the measurement is skipped
    pub fn samples(self) -> u8 {
        match self {
            Self::Skipped => 0,
            Self::UltraLowPower => 1,
            Self::LowPower => 2,
            Self::StandardResolution => 4,
            Self::HighResolution => 8,
            Self::UltraHighResolution => 16,
        }
    }

    /// Decodes a field read back from the device, codes 6 and 7 also mean x16
    pub fn from_bits(bits: u8) -> Self {
        match bits & field::THREE_BITS {
            0 => Self::Skipped,
            1 => Self::UltraLowPower,
            2 => Self::LowPower,
            3 => Self::StandardResolution,
            4 => Self::HighResolution,
            _ => Self::UltraHighResolution,
        }
    }
}

impl TryFrom<u8> for Oversampling {
    type Error = InvalidArgument;

    fn try_from(value: u8) -> Result<Self, InvalidArgument> {
        match value {
            0..=5 => Ok(Self::from_bits(value)),
            _ => Err(InvalidArgument),
        }
    }
}

#[macro_export]
macro_rules! temperature_resolution {
    (16bit/0.0050dC) => {
        Oversampling::UltraLowPower
    };
    (17bit/0.0025dC) => {
        Oversampling::LowPower
    };
    (18bit/0.0012dC) => {
        Oversampling::StandardResolution
    };
    (19bit/0.0006dC) => {
        Oversampling::HighResolution
    };
    (20bit/0.0003dC) => {
        Oversampling::UltraHighResolution
    };
}

#[macro_export]
macro_rules! pressure_resolution {
    (16bit/2.62Pa) => {
        Oversampling::UltraLowPower
    };
    (17bit/1.31Pa) => {
        Oversampling::LowPower
    };
    (18bit/0.66Pa) => {
        Oversampling::StandardResolution
    };
    (19bit/0.33Pa) => {
        Oversampling::HighResolution
    };
    (20bit/0.16Pa) => {
        Oversampling::UltraHighResolution
    };
}

/// Inactive period between two conversions in normal mode
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StandbyTime {
    Ms0_5 = 0,
    Ms62_5,
    Ms125,
    Ms250,
    Ms500,
    Ms1000,
    Ms2000,
    Ms4000,
}

impl StandbyTime {
    pub fn from_bits(bits: u8) -> Self {
        match bits & field::THREE_BITS {
            0 => Self::Ms0_5,
            1 => Self::Ms62_5,
            2 => Self::Ms125,
            3 => Self::Ms250,
            4 => Self::Ms500,
            5 => Self::Ms1000,
            6 => Self::Ms2000,
            _ => Self::Ms4000,
        }
    }

    pub fn micros(self) -> u32 {
        match self {
            Self::Ms0_5 => 500,
            Self::Ms62_5 => 62_500,
            Self::Ms125 => 125_000,
            Self::Ms250 => 250_000,
            Self::Ms500 => 500_000,
            Self::Ms1000 => 1_000_000,
            Self::Ms2000 => 2_000_000,
            Self::Ms4000 => 4_000_000,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IirFilter {
    Off = 0,
    X2,
    X4,
    X8,
    X16,
}

impl IirFilter {
    /// Rounds a filter coefficient down to the nearest supported one
    pub fn from_coefficient(coefficient: u8) -> Self {
        match coefficient {
            0..=1 => Self::Off,
            2..=3 => Self::X2,
            4..=7 => Self::X4,
            8..=15 => Self::X8,
            16..=255 => Self::X16,
        }
    }
}
