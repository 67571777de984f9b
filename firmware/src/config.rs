//! Configuration constants for the precision Vcc firmware

use precision_vcc::record::RECORD_SIZE;

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = 16_000_000;

/// UART baud rate
pub const UART_BAUD: u32 = 9600;

/// Nominal bandgap reference voltage in millivolts (datasheet typical;
/// the true value is fixed per device and found by calibration).
pub const BANDGAP_NOMINAL_MV: u16 = 1230;

/// EEPROM byte address of the calibration record. Utilities that use the
/// EEPROM tend to start at address zero, so the record sits at the very
/// end of the 4 KiB array.
pub const RECORD_ADDR: u16 = 4096 - RECORD_SIZE as u16;

/// Period of the idle Vcc report in the main loop.
pub const REPORT_PERIOD_MS: u32 = 1000;
