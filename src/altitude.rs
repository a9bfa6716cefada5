//! International barometric formula helpers.
//!
//! Both pressures must use the same unit, altitude is in meters. Non-positive
//! pressures are outside of the formula's domain.

use libm::powf;

const SCALE_HEIGHT: f32 = 44330.0;

/// Pressure reduced to sea level from a reading taken at `altitude`
pub fn sea_level_pressure(pressure: f32, altitude: f32) -> f32 {
    pressure / powf(1.0 - altitude / SCALE_HEIGHT, 5.255)
}

/// Altitude of a `pressure` reading relative to `sea_level_pressure`
pub fn altitude(pressure: f32, sea_level_pressure: f32) -> f32 {
    SCALE_HEIGHT * (1.0 - powf(pressure / sea_level_pressure, 0.1903))
}
