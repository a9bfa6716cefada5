#![cfg_attr(not(test), no_std)]

#[cfg(test)]
#[macro_use]
extern crate hex_literal;

#[macro_use]
pub mod registers;
pub mod altitude;
pub mod bus;
pub mod config;
pub mod error;
pub mod measurement;
#[cfg(test)]
mod testing;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::spi::{self, Phase, Polarity};
use log::{debug, error, info, warn};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use bus::Bus;
pub use config::DeviceConfiguration;
pub use error::Error;
use measurement::{Calibration, CompensatedReading, RawSample};
use registers::{field, Oversampling, Register, Status, CALIBRATION_SIZE, ID, MEASUREMENT_SIZE, RESET};

pub const DEFAULT_SPI_MODE: spi::Mode =
    spi::Mode { polarity: Polarity::IdleHigh, phase: Phase::CaptureOnSecondTransition };
pub const ALTERNATE_SPI_MODE: spi::Mode =
    spi::Mode { polarity: Polarity::IdleLow, phase: Phase::CaptureOnFirstTransition };

/// Wait after a soft reset before the device is accessed again
const RESET_DELAY_MS: u8 = 10;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mode {
    Sleep = 0b00,
    Forced = 0b01,
    Normal = 0b11,
}

/// Bounds every wait on the status register's measuring bit
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PollPolicy {
    pub interval_ms: u8,
    pub max_attempts: u16,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self { interval_ms: 10, max_attempts: 100 }
    }
}

/// Oversampling bits must be equal and the mode field must decode to the
/// written mode, a dropped forced write reads back as sleep and fails.
fn ctrl_meas_matches(expected: u8, actual: u8) -> bool {
    let settings = !field::MODE_MASK;
    expected & settings == actual & settings && Mode::from_bits(expected) == Mode::from_bits(actual)
}

/// Blocking BMP280 driver.
///
/// Not re-entrant: every operation is a sequence of register accesses, callers
/// sharing a device between tasks must serialize access to the whole driver.
pub struct BMP280<BUS, D> {
    bus: BUS,
    delay: D,
    config: DeviceConfiguration,
    calibration: Option<Calibration>,
    poll: PollPolicy,
}

impl<E, BUS: Bus<Error = E>, D: DelayMs<u8>> BMP280<BUS, D> {
    pub fn new(bus: BUS, delay: D) -> Self {
        Self::with_config(bus, delay, DeviceConfiguration::default())
    }

    /// `config` is applied by [`init`](Self::init), e.g. one restored from storage
    pub fn with_config(bus: BUS, delay: D, config: DeviceConfiguration) -> Self {
        BMP280 { bus, delay, config, calibration: None, poll: PollPolicy::default() }
    }

    pub fn free(self) -> (BUS, D) {
        (self.bus, self.delay)
    }

    /// Last successfully applied configuration
    pub fn config(&self) -> &DeviceConfiguration {
        &self.config
    }

    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    pub fn poll_policy(&self) -> PollPolicy {
        self.poll
    }

    pub fn set_poll_policy(&mut self, poll: PollPolicy) {
        self.poll = poll;
    }

    fn write_reg(&mut self, reg: Register, value: u8) -> Result<(), Error<E>> {
        self.bus.write(reg, value).map_err(Error::Bus)
    }

    fn read_reg(&mut self, reg: Register) -> Result<u8, Error<E>> {
        self.bus.read(reg).map_err(Error::Bus)
    }

    fn read_regs(&mut self, reg: Register, output: &mut [u8]) -> Result<(), Error<E>> {
        self.bus.reads(reg, output).map_err(Error::Bus)
    }

    pub fn chip_id(&mut self) -> Result<u8, Error<E>> {
        self.read_reg(Register::Id)
    }

    pub fn verify(&mut self) -> Result<bool, Error<E>> {
        Ok(self.chip_id()? == ID)
    }

    pub fn reset(&mut self) -> Result<(), Error<E>> {
        self.write_reg(Register::Reset, RESET)?;
        self.delay.delay_ms(RESET_DELAY_MS);
        debug!("BMP280 soft reset done");
        Ok(())
    }

    /// Resets the device, checks its identity, loads calibration and applies the
    /// stored configuration. Measurements are refused until this succeeds.
    pub fn init(&mut self) -> Result<(), Error<E>> {
        self.calibration = None;
        self.reset()?;

        let id = self.chip_id()?;
        if id != ID {
            error!("BMP280 not found, chip id 0x{:02x}", id);
            return Err(Error::DeviceNotFound(id));
        }
        info!("BMP280 detected");

        let calibration = self.read_calibration()?;
        self.apply_config(self.config)?;
        self.calibration = Some(calibration);
        Ok(())
    }

    pub fn read_calibration(&mut self) -> Result<Calibration, Error<E>> {
        let mut bytes = [0u8; CALIBRATION_SIZE];
        self.read_regs(Register::Calib0, &mut bytes)?;
        Ok(Calibration::from_bytes(&bytes))
    }

    pub fn status(&mut self) -> Result<Status, Error<E>> {
        Ok(Status::from_bits(self.read_reg(Register::Status)?))
    }

    pub fn is_measuring(&mut self) -> Result<bool, Error<E>> {
        Ok(self.status()?.measuring)
    }

    /// Checks the measuring bit, then again after each of up to `max_attempts`
    /// intervals until it clears
    pub fn wait_for_completion(&mut self) -> Result<(), Error<E>> {
        let attempts = self.poll.max_attempts;
        for attempt in 0..=attempts {
            if !self.is_measuring()? {
                return Ok(());
            }
            if attempt < attempts {
                self.delay.delay_ms(self.poll.interval_ms);
            }
        }
        warn!("BMP280 still measuring after {} polls", self.poll.max_attempts);
        Err(Error::PollTimeout)
    }

    /// Writes sleep mode keeping the oversampling bits, then lets a running
    /// conversion finish. Returns the written `ctrl_meas`.
    fn enter_sleep(&mut self, ctrl_meas: u8) -> Result<u8, Error<E>> {
        let value = (ctrl_meas & !field::MODE_MASK) | Mode::Sleep as u8;
        self.write_reg(Register::ControlMeasurement, value)?;
        self.wait_for_completion()?;
        Ok(value)
    }

    /// Applies all of `config` or nothing.
    ///
    /// The device is put to sleep first, `config` (0xF5) is written while
    /// sleeping since normal mode may ignore it, then `ctrl_meas` (0xF4) is
    /// written and read back.
    pub fn apply_config(&mut self, config: DeviceConfiguration) -> Result<(), Error<E>> {
        config.validate()?;

        let current = self.read_reg(Register::ControlMeasurement)?;
        if Mode::from_bits(current) != Mode::Sleep {
            self.enter_sleep(current)?;
        }

        self.write_reg(Register::Config, config.config_byte())?;
        let ctrl_meas = config.ctrl_meas();
        self.write_reg(Register::ControlMeasurement, ctrl_meas)?;

        let actual = self.read_reg(Register::ControlMeasurement)?;
        if !ctrl_meas_matches(ctrl_meas, actual) {
            warn!("ctrl_meas wrote 0x{:02x} but read 0x{:02x}", ctrl_meas, actual);
            return Err(Error::ConfigVerificationFailed { expected: ctrl_meas, actual });
        }

        self.config = config;
        info!("BMP280 configuration applied: {:?}", config);
        Ok(())
    }

    pub fn set_oversampling(
        &mut self,
        temperature: Oversampling,
        pressure: Oversampling,
    ) -> Result<(), Error<E>> {
        self.apply_config(self.config.with_oversampling(temperature, pressure))
    }

    /// `standby_time` and `filter` are raw 3 bit codes
    pub fn configure_standby_filter(&mut self, standby_time: u8, filter: u8) -> Result<(), Error<E>> {
        let mut config = self.config;
        config.standby_time = standby_time;
        config.filter = filter;
        self.apply_config(config)
    }

    pub fn set_low_power_profile(&mut self) -> Result<(), Error<E>> {
        self.apply_config(DeviceConfiguration::low_power())
    }

    pub fn set_high_accuracy_profile(&mut self) -> Result<(), Error<E>> {
        self.apply_config(DeviceConfiguration::high_accuracy())
    }

    /// Configuration as currently latched by the device
    pub fn read_device_config(&mut self) -> Result<DeviceConfiguration, Error<E>> {
        let ctrl_meas = self.read_reg(Register::ControlMeasurement)?;
        let config = self.read_reg(Register::Config)?;
        Ok(DeviceConfiguration::from_registers(ctrl_meas, config))
    }

    /// Leaving normal mode waits for the running conversion before the new
    /// mode is written, forced mode starts a single conversion.
    pub fn set_mode(&mut self, mode: Mode) -> Result<(), Error<E>> {
        let mut ctrl_meas = self.read_reg(Register::ControlMeasurement)?;
        let drained = Mode::from_bits(ctrl_meas) == Mode::Normal && mode != Mode::Normal;
        if drained {
            ctrl_meas = self.enter_sleep(ctrl_meas)?;
        }
        if !(drained && mode == Mode::Sleep) {
            ctrl_meas = (ctrl_meas & !field::MODE_MASK) | mode as u8;
            self.write_reg(Register::ControlMeasurement, ctrl_meas)?;
        }

        let actual = self.read_reg(Register::ControlMeasurement)?;
        if !ctrl_meas_matches(ctrl_meas, actual) {
            warn!("mode {:?} not taken, ctrl_meas 0x{:02x}", mode, actual);
            return Err(Error::ConfigVerificationFailed { expected: ctrl_meas, actual });
        }
        self.config.mode = mode;
        debug!("BMP280 mode set to {:?}", mode);
        Ok(())
    }

    /// A finished forced conversion reports [`Mode::Sleep`]
    pub fn get_mode(&mut self) -> Result<Mode, Error<E>> {
        let mode = Mode::from_bits(self.read_reg(Register::ControlMeasurement)?);
        if mode == Mode::Forced && !self.is_measuring()? {
            return Ok(Mode::Sleep);
        }
        Ok(mode)
    }

    pub fn read_raw(&mut self) -> Result<RawSample, Error<E>> {
        let mut bytes = [0u8; MEASUREMENT_SIZE];
        self.read_regs(Register::PressureMsb, &mut bytes)?;
        Ok(RawSample::from_bytes(&bytes))
    }

    /// Reads and compensates the latest conversion results
    pub fn read_data(&mut self) -> Result<CompensatedReading, Error<E>> {
        let calibration = self.calibration.ok_or(Error::NotInitialized)?;
        let sample = self.read_raw()?;
        Ok(calibration.compensate(sample))
    }

    /// Runs one forced conversion and reads its result
    pub fn trigger_measurement(&mut self) -> Result<CompensatedReading, Error<E>> {
        if self.calibration.is_none() {
            return Err(Error::NotInitialized);
        }
        self.set_mode(Mode::Forced)?;
        self.delay.delay_ms(self.config.max_measurement_time_ms());
        self.wait_for_completion()?;
        self.read_data()
    }
}
