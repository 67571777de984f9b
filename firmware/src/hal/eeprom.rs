use avr_device::atmega128::EEPROM;

// EECR bits
const EERE: u8 = 0x01;
const EEWE: u8 = 0x02;
const EEMWE: u8 = 0x04;

pub struct Eeprom {
    _private: (),
}

impl Eeprom {
    pub fn new() -> Self {
        Self { _private: () }
    }

    pub fn read_byte(&mut self, addr: u16) -> u8 {
        unsafe {
            let p = EEPROM::ptr();

            // Wait for a previous write to finish
            while (*p).eecr.read().bits() & EEWE != 0 {}

            (*p).eear.write(|w| w.bits(addr));
            (*p).eecr.modify(|r, w| w.bits(r.bits() | EERE));

            (*p).eedr.read().bits()
        }
    }

    pub fn write_byte(&mut self, addr: u16, value: u8) {
        unsafe {
            let p = EEPROM::ptr();

            while (*p).eecr.read().bits() & EEWE != 0 {}

            // EEMWE arms the write; EEWE must follow within four cycles,
            // so the pair runs with interrupts masked.
            avr_device::interrupt::free(|_| {
                (*p).eear.write(|w| w.bits(addr));
                (*p).eedr.write(|w| w.bits(value));
                (*p).eecr.modify(|r, w| w.bits(r.bits() | EEMWE));
                (*p).eecr.modify(|r, w| w.bits(r.bits() | EEWE));
            });
        }
    }

    pub fn read(&mut self, addr: u16, buffer: &mut [u8]) {
        for (offset, byte) in buffer.iter_mut().enumerate() {
            *byte = self.read_byte(addr + offset as u16);
        }
    }

    pub fn write(&mut self, addr: u16, data: &[u8]) {
        for (offset, &byte) in data.iter().enumerate() {
            self.write_byte(addr + offset as u16, byte);
        }
    }
}

impl Default for Eeprom {
    fn default() -> Self {
        Self::new()
    }
}
