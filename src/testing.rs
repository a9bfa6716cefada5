use std::vec::Vec;

use crate::bus::Bus;
use crate::registers::{field, Register, ID, RESET};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FakeError;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Access {
    Write(u8, u8),
    Read(u8, usize),
}

/// Simulated BMP280 register file.
///
/// A forced conversion keeps the measuring bit set for `forced_polls` status
/// reads and then drops the mode field back to sleep, like the real device.
pub struct FakeBus {
    pub registers: [u8; 256],
    /// Status reads left that report a running conversion
    pub measuring_polls: usize,
    pub forced_polls: usize,
    /// XORed into every `ctrl_meas` read, simulates a write the device dropped
    pub ctrl_meas_corruption: u8,
    pub fail_register: Option<Register>,
    /// Ignores `ctrl_meas` writes selecting forced mode
    pub drop_forced_writes: bool,
    pub accesses: Vec<Access>,
    forced_pending: bool,
}

impl FakeBus {
    pub fn new(calibration: &[u8; 24]) -> Self {
        let mut registers = [0u8; 256];
        registers[Register::Id as usize] = ID;
        let start = Register::Calib0 as usize;
        registers[start..start + calibration.len()].copy_from_slice(calibration);
        Self {
            registers,
            measuring_polls: 0,
            forced_polls: 0,
            ctrl_meas_corruption: 0,
            fail_register: None,
            drop_forced_writes: false,
            accesses: Vec::new(),
            forced_pending: false,
        }
    }

    pub fn with_adc(mut self, bytes: &[u8; 6]) -> Self {
        let start = Register::PressureMsb as usize;
        self.registers[start..start + 6].copy_from_slice(bytes);
        self
    }

    pub fn register(&self, reg: Register) -> u8 {
        self.registers[reg as usize]
    }

    pub fn writes(&self) -> Vec<(u8, u8)> {
        self.accesses
            .iter()
            .filter_map(|access| match *access {
                Access::Write(reg, value) => Some((reg, value)),
                _ => None,
            })
            .collect()
    }

    fn status(&mut self) -> u8 {
        if self.measuring_polls > 0 {
            self.measuring_polls -= 1;
            return field::STATUS_MEASURING;
        }
        if self.forced_pending {
            self.forced_pending = false;
            self.registers[Register::ControlMeasurement as usize] &= !field::MODE_MASK;
        }
        0
    }
}

impl Bus for FakeBus {
    type Error = FakeError;

    fn write(&mut self, reg: Register, value: u8) -> Result<(), FakeError> {
        self.accesses.push(Access::Write(reg as u8, value));
        if self.fail_register == Some(reg) {
            return Err(FakeError);
        }
        match reg {
            Register::Reset if value == RESET => {
                self.registers[Register::ControlMeasurement as usize] = 0;
                self.registers[Register::Config as usize] = 0;
                self.measuring_polls = 0;
                self.forced_pending = false;
            }
            Register::ControlMeasurement => {
                let mode = value & field::MODE_MASK;
                let forced = mode == 0b01 || mode == 0b10;
                if forced && self.drop_forced_writes {
                    return Ok(());
                }
                self.registers[reg as usize] = value;
                if forced {
                    self.measuring_polls = self.forced_polls;
                    self.forced_pending = true;
                }
            }
            _ => self.registers[reg as usize] = value,
        }
        Ok(())
    }

    fn reads(&mut self, reg: Register, output: &mut [u8]) -> Result<(), FakeError> {
        self.accesses.push(Access::Read(reg as u8, output.len()));
        if self.fail_register == Some(reg) {
            return Err(FakeError);
        }
        match reg {
            Register::Status => output[0] = self.status(),
            Register::ControlMeasurement => {
                output[0] = self.registers[reg as usize] ^ self.ctrl_meas_corruption;
            }
            _ => {
                let start = reg as usize;
                output.copy_from_slice(&self.registers[start..start + output.len()]);
            }
        }
        Ok(())
    }
}
