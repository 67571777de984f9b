use avr_device::atmega128::ADC;

use crate::hal::timer::delay_ms;
use precision_vcc::bsp::adc::BandgapAdc;

// AVcc reference, multiplexer on the internal 1.23V bandgap
const ADMUX_BANDGAP: u8 = 0x5E;

// Bandgap settling time after switching the multiplexer
const SETTLE_MS: u32 = 2;

pub struct Adc {
    _private: (),
}

impl Adc {
    pub fn new() -> Self {
        unsafe {
            let p = ADC::ptr();
            // Enable ADC, prescaler div128 (125kHz @ 16MHz)
            (*p).adcsra.write(|w| w.bits(0x87));
            // Reference voltage = AVCC
            (*p).admux.write(|w| w.bits(0x40));
        }
        Self { _private: () }
    }

    /// One conversion of the bandgap reference measured against AVcc.
    /// The MUX needs a moment to settle before the result is usable.
    pub fn read_bandgap(&mut self) -> u16 {
        unsafe {
            let p = ADC::ptr();

            (*p).admux.write(|w| w.bits(ADMUX_BANDGAP));
            delay_ms(SETTLE_MS);

            // Start conversion
            (*p).adcsra.modify(|r, w| w.bits(r.bits() | 0x40));

            // Wait for completion
            while (*p).adcsra.read().bits() & 0x40 != 0 {}

            // Read result (ADCL must be read first)
            let low = (*p).adcl.read().bits() as u16;
            let high = (*p).adch.read().bits() as u16;

            (high << 8) | low
        }
    }
}

impl BandgapAdc for Adc {
    fn sample_bandgap(&mut self) -> u16 {
        self.read_bandgap()
    }
}

impl Default for Adc {
    fn default() -> Self {
        Self::new()
    }
}
