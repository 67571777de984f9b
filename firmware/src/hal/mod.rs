pub mod adc;
pub mod eeprom;
pub mod timer;
pub mod uart;

// Re-export commonly used types
pub use adc::Adc;
pub use eeprom::Eeprom;
pub use timer::{delay_ms, SystemClock};
pub use uart::Uart;
