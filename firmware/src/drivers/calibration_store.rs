use crate::hal::Eeprom;
use precision_vcc::bsp::nvm::NvStore;
use precision_vcc::record::{CalibrationRecord, RECORD_SIZE};

/// Calibration record slot at a fixed EEPROM address.
pub struct CalibrationStore {
    eeprom: Eeprom,
    addr: u16,
}

impl CalibrationStore {
    pub fn new(eeprom: Eeprom, addr: u16) -> Self {
        Self { eeprom, addr }
    }
}

impl NvStore for CalibrationStore {
    fn load(&mut self) -> CalibrationRecord {
        let mut bytes = [0u8; RECORD_SIZE];
        self.eeprom.read(self.addr, &mut bytes);
        CalibrationRecord::from_bytes(bytes)
    }

    fn store(&mut self, record: &CalibrationRecord) {
        self.eeprom.write(self.addr, &record.to_bytes());
    }
}
