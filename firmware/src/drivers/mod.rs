pub mod calibration_store;
pub mod serial_console;

pub use calibration_store::CalibrationStore;
pub use serial_console::SerialConsole;
