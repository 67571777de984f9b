//! Board support seams. The firmware implements these traits over real
//! peripherals; tests implement them over scripted fakes.

pub mod serial {
    use ufmt::uWrite;

    /// Character-oriented serial link. Reads are non-blocking; the decoder
    /// does its own waiting. Text goes out through the `uWrite` supertrait.
    pub trait SerialPort: uWrite {
        fn rx_ready(&mut self) -> bool;
        fn read_byte(&mut self) -> Option<u8>;
        fn write_byte(&mut self, byte: u8);
    }

    /// Adapter that turns any `embedded-hal` 0.2 serial into a [`SerialPort`].
    ///
    /// `rx_ready` has to pull a byte out of the inner port to answer, so a
    /// one-byte peek buffer sits between the two interfaces.
    pub struct EhSerial<P> {
        port: P,
        pending: Option<u8>,
    }

    impl<P> EhSerial<P>
    where
        P: embedded_hal::serial::Read<u8> + embedded_hal::serial::Write<u8>,
    {
        pub fn new(port: P) -> Self {
            Self { port, pending: None }
        }

        pub fn release(self) -> P {
            self.port
        }
    }

    impl<P> uWrite for EhSerial<P>
    where
        P: embedded_hal::serial::Read<u8> + embedded_hal::serial::Write<u8>,
    {
        type Error = core::convert::Infallible;

        fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
            for byte in s.bytes() {
                nb::block!(self.port.write(byte)).ok();
            }
            Ok(())
        }
    }

    impl<P> SerialPort for EhSerial<P>
    where
        P: embedded_hal::serial::Read<u8> + embedded_hal::serial::Write<u8>,
    {
        fn rx_ready(&mut self) -> bool {
            if self.pending.is_none() {
                self.pending = self.port.read().ok();
            }
            self.pending.is_some()
        }

        fn read_byte(&mut self) -> Option<u8> {
            self.pending.take().or_else(|| self.port.read().ok())
        }

        fn write_byte(&mut self, byte: u8) {
            nb::block!(self.port.write(byte)).ok();
        }
    }
}

pub mod clock {
    /// Monotonic millisecond counter. Wraps after ~49 days.
    pub trait Clock {
        fn now_ms(&self) -> u32;
    }
}

pub mod adc {
    /// One-shot read of the bandgap reference channel against AVcc.
    /// Returns the raw 10-bit conversion code.
    pub trait BandgapAdc {
        fn sample_bandgap(&mut self) -> u16;
    }
}

pub mod nvm {
    use crate::record::CalibrationRecord;

    /// Typed get/put of the calibration record at its fixed slot.
    /// `load` returns whatever the slot holds; the caller checks the label.
    pub trait NvStore {
        fn load(&mut self) -> CalibrationRecord;
        fn store(&mut self, record: &CalibrationRecord);
    }
}
