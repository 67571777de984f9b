use avr_device::atmega128::USART0;
use ufmt::uWrite;

use crate::hal::Uart;
use precision_vcc::bsp::serial::SerialPort;

/// Operator console on USART0. This is the byte source and text sink the
/// calibration session runs against.
pub struct SerialConsole {
    uart: Uart<USART0>,
}

impl SerialConsole {
    pub fn new() -> Self {
        Self { uart: Uart::new() }
    }

    pub fn write_line(&mut self, s: &str) {
        self.uart.write_str(s);
        self.uart.write_str("\r\n");
    }
}

impl uWrite for SerialConsole {
    type Error = core::convert::Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        self.uart.write_str(s);
        Ok(())
    }
}

impl SerialPort for SerialConsole {
    fn rx_ready(&mut self) -> bool {
        self.uart.is_rx_ready()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.uart.read_byte()
    }

    fn write_byte(&mut self, byte: u8) {
        self.uart.write_byte(byte);
    }
}

impl Default for SerialConsole {
    fn default() -> Self {
        Self::new()
    }
}
