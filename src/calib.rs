//! Interactive bandgap calibration over the serial console.
//!
//! The operator watches the true supply voltage on a multimeter while this
//! session prints the firmware's estimate once a second. Arrow keys walk the
//! reference value in 1 mV steps until the two agree; the result can then be
//! saved to EEPROM for every later boot.

use ufmt::uWrite;

use crate::bsp::adc::BandgapAdc;
use crate::bsp::clock::Clock;
use crate::bsp::nvm::NvStore;
use crate::bsp::serial::SerialPort;
use crate::keyscan::{Key, KeyScanner, DEFAULT_KEYMAP};
use crate::vcc::PrecisionVcc;

/// Inter-byte idle timeout handed to the key decoder. Long enough to cover
/// a terminal's escape sequence, short enough to keep the loop lively.
pub const KEY_TIMEOUT_MS: u32 = 100;

/// Period of the live Vcc readout while tuning.
pub const DISPLAY_PERIOD_MS: u32 = 1000;

const MENU: &str = "\r\n== Bandgap calibration ==\r\n\
                    [Space] enters the live tuning display.\r\n\
                    [1] loads the saved bandgap value from EEPROM.\r\n\
                    [2] saves the current bandgap value to EEPROM.\r\n\
                    [Escape]/[q] leaves calibration.\r\n\r\n\
                    While tuning, press:\r\n\
                    [Space]/[Escape] to come back to this menu.\r\n\
                    [Up]/[Down] (or [k]/[j]) to adjust the bandgap reference\r\n\
                    while reading the true supply voltage on a multimeter.\r\n\r\n";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Menu,
    Tune,
}

/// What the session loop should do after dispatching one event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Transient state of one calibration session: the current mode and the
/// next live-display deadline. The reference value itself lives on the
/// [`PrecisionVcc`] the session operates on.
pub struct CalibrationSession {
    mode: Mode,
    next_update_at: u32,
    scanner: KeyScanner,
}

impl CalibrationSession {
    pub fn new(now_ms: u32) -> Self {
        Self {
            mode: Mode::Menu,
            next_update_at: now_ms.wrapping_add(DISPLAY_PERIOD_MS),
            scanner: KeyScanner::new(&DEFAULT_KEYMAP),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Show the menu and service the session until the operator quits.
    /// Returning is how the session ends; there is no stopped state.
    pub fn run<A, N, S, C>(vcc: &mut PrecisionVcc<A, N>, serial: &mut S, clock: &C)
    where
        A: BandgapAdc,
        N: NvStore,
        S: SerialPort,
        C: Clock,
    {
        let mut session = Self::new(clock.now_ms());
        serial.write_str(MENU).ok();
        loop {
            let key = session.scanner.poll(serial, clock, KEY_TIMEOUT_MS);
            if session.process_key(vcc, key, serial, clock) == Flow::Exit {
                return;
            }
        }
    }

    /// Dispatch one decoded key (or the lack of one) against the current
    /// mode. Strictly request/response: one event in, one action out.
    pub fn process_key<A, N, S, C>(
        &mut self,
        vcc: &mut PrecisionVcc<A, N>,
        key: Option<Key>,
        serial: &mut S,
        clock: &C,
    ) -> Flow
    where
        A: BandgapAdc,
        N: NvStore,
        S: SerialPort,
        C: Clock,
    {
        match (self.mode, key) {
            (Mode::Tune, None) => {
                if clock.now_ms() >= self.next_update_at {
                    let vcc_mv = vcc.read_vcc();
                    ufmt::uwrite!(serial, "Vcc: {}mV, BG ref: {}mV\r\n", vcc_mv, vcc.bg_ref_mv())
                        .ok();
                    self.next_update_at = clock.now_ms().wrapping_add(DISPLAY_PERIOD_MS);
                }
            }
            (Mode::Menu, Some(Key::Toggle)) => self.mode = Mode::Tune,
            (Mode::Tune, Some(Key::Toggle)) => self.show_menu(serial),
            // Quitting only works from the menu; from the tuning display
            // Escape is just another way back to the menu.
            (Mode::Menu, Some(Key::Quit)) => return Flow::Exit,
            (Mode::Tune, Some(Key::Quit)) => self.show_menu(serial),
            (Mode::Menu, Some(Key::Save)) => {
                vcc.save_reference();
                serial.write_str("\r\nSaved to EEPROM.\r\n\r\n").ok();
                self.mode = Mode::Tune;
            }
            (Mode::Menu, Some(Key::Load)) => {
                if vcc.load_reference() {
                    serial.write_str("Loaded saved value from EEPROM.\r\n\r\n").ok();
                    self.mode = Mode::Tune;
                } else {
                    serial
                        .write_str("\r\nNo saved bandgap value found in EEPROM.\r\n")
                        .ok();
                }
            }
            (Mode::Tune, Some(Key::Up)) => {
                serial.write_str("[up]\r\n").ok();
                vcc.adjust_reference(1);
            }
            (Mode::Tune, Some(Key::Down)) => {
                serial.write_str("[down]\r\n").ok();
                vcc.adjust_reference(-1);
            }
            // Menu ignores tuning keys, the tuning display ignores menu
            // keys, and an idle menu has nothing to do.
            _ => {}
        }
        Flow::Continue
    }

    fn show_menu<S: SerialPort>(&mut self, serial: &mut S) {
        self.mode = Mode::Menu;
        serial.write_str(MENU).ok();
    }
}
