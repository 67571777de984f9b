#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]

use panic_halt as _;

mod config;
mod drivers;
mod hal;

use precision_vcc::bsp::clock::Clock;
use precision_vcc::bsp::serial::SerialPort;
use precision_vcc::vcc::PrecisionVcc;

use drivers::{CalibrationStore, SerialConsole};
use hal::{Adc, Eeprom, SystemClock};

#[avr_device::entry]
fn main() -> ! {
    let mut console = SerialConsole::new();
    let clock = SystemClock::start();
    let adc = Adc::new();
    let store = CalibrationStore::new(Eeprom::new(), config::RECORD_ADDR);

    // UART ring buffers and the millisecond tick are interrupt-driven.
    unsafe { avr_device::interrupt::enable() };

    // Picks up a previously calibrated reference from EEPROM, or starts
    // from the datasheet typical.
    let mut vcc = PrecisionVcc::new(adc, store, config::BANDGAP_NOMINAL_MV);

    console.write_line("Precision Vcc firmware v0.1.0");
    console.write_line("Press [c] to calibrate the bandgap reference");

    let mut next_report = clock.now_ms().wrapping_add(config::REPORT_PERIOD_MS);
    loop {
        if let Some(byte) = console.read_byte() {
            if byte == b'c' {
                vcc.calibrate(&mut console, &clock);
                console.write_line("Calibration closed");
                next_report = clock.now_ms().wrapping_add(config::REPORT_PERIOD_MS);
            }
        }

        if clock.now_ms() >= next_report {
            ufmt::uwrite!(console, "Vcc: {}mV\r\n", vcc.read_vcc()).ok();
            next_report = clock.now_ms().wrapping_add(config::REPORT_PERIOD_MS);
        }
    }
}
