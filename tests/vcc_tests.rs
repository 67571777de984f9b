#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use embedded_hal_mock::serial::{Mock as SerialMock, Transaction};
    use precision_vcc::bsp::adc::BandgapAdc;
    use precision_vcc::bsp::nvm::NvStore;
    use precision_vcc::bsp::serial::{EhSerial, SerialPort};
    use precision_vcc::record::{CalibrationRecord, RECORD_SIZE, RECORD_TAG};
    use precision_vcc::vcc::{analog_millivolts, supply_millivolts, PrecisionVcc};

    struct StubAdc {
        code: u16,
    }

    impl BandgapAdc for StubAdc {
        fn sample_bandgap(&mut self) -> u16 {
            self.code
        }
    }

    struct MemStore<'a> {
        bytes: &'a RefCell<[u8; RECORD_SIZE]>,
        writes: &'a Cell<u32>,
    }

    impl<'a> NvStore for MemStore<'a> {
        fn load(&mut self) -> CalibrationRecord {
            CalibrationRecord::from_bytes(*self.bytes.borrow())
        }

        fn store(&mut self, record: &CalibrationRecord) {
            *self.bytes.borrow_mut() = record.to_bytes();
            self.writes.set(self.writes.get() + 1);
        }
    }

    #[test]
    fn supply_millivolts_truncates_like_the_hardware_formula() {
        assert_eq!(supply_millivolts(1100, 500), 2252); // (1100 * 1024) / 500
        assert_eq!(supply_millivolts(1100, 1024), 1100);
        assert_eq!(supply_millivolts(1230, 252), 4998);
    }

    #[test]
    fn supply_millivolts_saturates_instead_of_dividing_by_zero() {
        assert_eq!(supply_millivolts(1100, 0), u16::MAX);
        assert_eq!(supply_millivolts(1100, 1), u16::MAX);
    }

    #[test]
    fn analog_millivolts_rescales_against_measured_vcc() {
        assert_eq!(analog_millivolts(5000, 0), 0);
        assert_eq!(analog_millivolts(5000, 1023), 5000);
        assert_eq!(analog_millivolts(5000, 512), 2502);
    }

    #[test]
    fn construction_falls_back_to_the_nominal_reference() {
        let bytes = RefCell::new([0xFF; RECORD_SIZE]);
        let writes = Cell::new(0);
        let vcc = PrecisionVcc::new(
            StubAdc { code: 500 },
            MemStore {
                bytes: &bytes,
                writes: &writes,
            },
            1230,
        );
        assert_eq!(vcc.bg_ref_mv(), 1230);
    }

    #[test]
    fn construction_adopts_a_valid_stored_record() {
        let bytes = RefCell::new(CalibrationRecord::tagged(1187).to_bytes());
        let writes = Cell::new(0);
        let mut vcc = PrecisionVcc::new(
            StubAdc { code: 500 },
            MemStore {
                bytes: &bytes,
                writes: &writes,
            },
            1230,
        );
        assert_eq!(vcc.bg_ref_mv(), 1187);
        assert_eq!(vcc.read_vcc(), (1187u32 * 1024 / 500) as u16);
    }

    #[test]
    fn with_reference_skips_the_store_probe() {
        let bytes = RefCell::new(CalibrationRecord::tagged(1187).to_bytes());
        let writes = Cell::new(0);
        let vcc = PrecisionVcc::with_reference(
            StubAdc { code: 500 },
            MemStore {
                bytes: &bytes,
                writes: &writes,
            },
            1050,
        );
        assert_eq!(vcc.bg_ref_mv(), 1050);
    }

    #[test]
    fn record_codec_round_trips_and_checks_the_label() {
        let record = CalibrationRecord::tagged(1199);
        assert!(record.is_valid());
        assert_eq!(CalibrationRecord::from_bytes(record.to_bytes()), record);

        let erased = CalibrationRecord::from_bytes([0xFF; RECORD_SIZE]);
        assert!(!erased.is_valid());

        let mut foreign = record.to_bytes();
        foreign[0] = b'x';
        assert!(!CalibrationRecord::from_bytes(foreign).is_valid());
        assert_eq!(record.label, RECORD_TAG);
    }

    #[test]
    fn eh_serial_adapts_an_embedded_hal_port() {
        let expectations = [
            Transaction::read(b'a'),
            Transaction::write(b'o'),
            Transaction::write(b'k'),
        ];
        let mut port = EhSerial::new(SerialMock::new(&expectations));

        assert!(port.rx_ready());
        // The peeked byte is handed out exactly once.
        assert_eq!(port.read_byte(), Some(b'a'));
        port.write_byte(b'o');
        port.write_byte(b'k');

        port.release().done();
    }
}
