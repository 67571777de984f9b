use avr_device::atmega128::TC0;
use avr_device::interrupt::Mutex;
use core::cell::Cell;

use crate::config::CPU_FREQ_HZ;
use precision_vcc::bsp::clock::Clock;

// One compare match per millisecond (16MHz/64 = 250kHz, 250 ticks = 1ms)
const TICKS_PER_MS: u8 = (CPU_FREQ_HZ / 64 / 1000) as u8;

static MILLIS: Mutex<Cell<u32>> = Mutex::new(Cell::new(0));

fn millis() -> u32 {
    avr_device::interrupt::free(|cs| MILLIS.borrow(cs).get())
}

/// Millisecond time base on TC0. Time starts flowing once global
/// interrupts are enabled.
pub struct SystemClock {
    _private: (),
}

impl SystemClock {
    pub fn start() -> Self {
        unsafe {
            let p = TC0::ptr();
            // CTC mode, prescaler div64
            (*p).tccr.write(|w| w.bits(0x0C));
            (*p).ocr.write(|w| w.bits(TICKS_PER_MS - 1));
            (*p).tcnt.write(|w| w.bits(0));
            // Compare match interrupt
            (*p).timsk.modify(|r, w| w.bits(r.bits() | 0x02));
        }
        Self { _private: () }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u32 {
        millis()
    }
}

/// Busy-wait. Needs the system clock running.
pub fn delay_ms(ms: u32) {
    let start = millis();
    while millis().wrapping_sub(start) < ms {}
}

#[avr_device::interrupt(atmega128)]
fn TIMER0_COMP() {
    avr_device::interrupt::free(|cs| {
        let counter = MILLIS.borrow(cs);
        counter.set(counter.get().wrapping_add(1));
    });
}
