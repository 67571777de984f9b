//! Supply-voltage measurement against the MCU's internal bandgap reference,
//! with an interactive serial calibration workflow.
#![no_std]

pub mod bsp;
pub mod calib;
pub mod keyscan;
pub mod record;
pub mod vcc;
