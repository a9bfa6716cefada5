use crate::registers::{CALIBRATION_SIZE, MEASUREMENT_SIZE};

/// Factory trimming coefficients stored at 0x88..0x9F, little endian
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Calibration {
    pub dig_t1: u16,
    pub dig_t2: i16,
    pub dig_t3: i16,
    pub dig_p1: u16,
    pub dig_p2: i16,
    pub dig_p3: i16,
    pub dig_p4: i16,
    pub dig_p5: i16,
    pub dig_p6: i16,
    pub dig_p7: i16,
    pub dig_p8: i16,
    pub dig_p9: i16,
}

macro_rules! pow2 {
    ($x:expr) => {
        $x * $x
    };
}

impl Calibration {
    pub fn from_bytes(bytes: &[u8; CALIBRATION_SIZE]) -> Self {
        let word = |i: usize| [bytes[i * 2], bytes[i * 2 + 1]];
        Self {
            dig_t1: u16::from_le_bytes(word(0)),
            dig_t2: i16::from_le_bytes(word(1)),
            dig_t3: i16::from_le_bytes(word(2)),
            dig_p1: u16::from_le_bytes(word(3)),
            dig_p2: i16::from_le_bytes(word(4)),
            dig_p3: i16::from_le_bytes(word(5)),
            dig_p4: i16::from_le_bytes(word(6)),
            dig_p5: i16::from_le_bytes(word(7)),
            dig_p6: i16::from_le_bytes(word(8)),
            dig_p7: i16::from_le_bytes(word(9)),
            dig_p8: i16::from_le_bytes(word(10)),
            dig_p9: i16::from_le_bytes(word(11)),
        }
    }

    /// Datasheet 32 bit temperature compensation.
    ///
    /// Intermediates are widened to 64 bit so that out of range ADC values cannot
    /// overflow; results are identical for every input the 32 bit formula handles.
    pub fn compensate_temperature(&self, raw: RawTemperature) -> TemperatureFine {
        let adc_t = raw.0 as i64;
        let t1 = self.dig_t1 as i64;
        let var1 = (((adc_t >> 3) - (t1 << 1)) * self.dig_t2 as i64) >> 11;
        let var2 = ((pow2!((adc_t >> 4) - t1) >> 12) * self.dig_t3 as i64) >> 14;
        TemperatureFine((var1 + var2) as i32)
    }

    // Pa*256, e.g. 24674867 represents 24674867 / 256 = 96386.2 Pa or 963.862 hPa
    pub fn compensate_pressure(&self, raw: RawPressure, t_fine: TemperatureFine) -> u32 {
        let mut var1 = t_fine.0 as i64 - 128000;
        let mut var2 = pow2!(var1) * self.dig_p6 as i64 + ((var1 * self.dig_p5 as i64) << 17);
        var2 += (self.dig_p4 as i64) << 35;
        var1 = ((pow2!(var1) * self.dig_p3 as i64) >> 8) + ((var1 * self.dig_p2 as i64) << 12);
        var1 = (((1i64 << 47) + var1) * (self.dig_p1 as i64)) >> 33;
        if var1 == 0 {
            return 0;
        }
        let mut p = 1048576 - raw.0 as i64;
        p = (((p << 31) - var2) * 3125) / var1;
        var1 = (self.dig_p9 as i64 * pow2!(p >> 13)) >> 25;
        var2 = (self.dig_p8 as i64 * p) >> 19;
        (((p + var1 + var2) >> 8) + ((self.dig_p7 as i64) << 4)) as u32
    }

    /// Temperature first, its fine value feeds the pressure path
    pub fn compensate(&self, sample: RawSample) -> CompensatedReading {
        let t_fine = self.compensate_temperature(sample.temperature);
        let pressure = self.compensate_pressure(sample.pressure, t_fine);
        CompensatedReading { temperature: t_fine.degree_celsius_x100(), pressure }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TemperatureFine(i32);

impl TemperatureFine {
    pub fn new(value: i32) -> Self {
        Self(value)
    }

    pub fn value(self) -> i32 {
        self.0
    }

    #[inline]
    pub fn degree_celsius_x100(self) -> i32 {
        (self.0 * 5 + 128) >> 8
    }
}

fn unpack_20bit(bytes: &[u8]) -> i32 {
    (bytes[0] as i32) << 12 | (bytes[1] as i32) << 4 | (bytes[2] as i32) >> 4
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RawTemperature(i32);

impl RawTemperature {
    pub fn new(adc: u32) -> Self {
        Self((adc & 0xF_FFFF) as i32)
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(unpack_20bit(bytes))
    }

    pub fn value(self) -> u32 {
        self.0 as u32
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RawPressure(i32);

impl RawPressure {
    pub fn new(adc: u32) -> Self {
        Self((adc & 0xF_FFFF) as i32)
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(unpack_20bit(bytes))
    }

    pub fn value(self) -> u32 {
        self.0 as u32
    }
}

/// One burst read of 0xF7..0xFC, pressure first
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RawSample {
    pub pressure: RawPressure,
    pub temperature: RawTemperature,
}

impl RawSample {
    pub fn from_bytes(bytes: &[u8; MEASUREMENT_SIZE]) -> Self {
        Self {
            pressure: RawPressure::from_bytes(&bytes[..3]),
            temperature: RawTemperature::from_bytes(&bytes[3..]),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CompensatedReading {
    /// 0.01 degree celsius
    pub temperature: i32,
    /// Q24.8 pascal
    pub pressure: u32,
}

impl CompensatedReading {
    pub fn celsius(&self) -> f32 {
        self.temperature as f32 / 100.0
    }

    pub fn pascal(&self) -> f32 {
        self.pressure as f32 / 256.0
    }

    pub fn hectopascal(&self) -> f32 {
        self.pascal() / 100.0
    }
}
