//! Table-driven keystroke decoder for a raw serial terminal.
//!
//! A terminal worth using sends single bytes for ordinary keys but multi-byte
//! escape sequences for arrows, and those sequences start with the same 0x1B
//! that the Escape key sends on its own. The decoder disambiguates by
//! accumulating bytes under an inter-byte idle timeout: a prefix that is
//! itself a complete key (bare Escape) only wins once no longer completion
//! arrives before the line goes idle.

use crate::bsp::clock::Clock;
use crate::bsp::serial::SerialPort;

/// Longest byte sequence a single key may produce.
pub const MAX_SEQ: usize = 3;

/// Pad byte for unused trailing positions, in both the table and the
/// accumulator. Must never appear as a real payload byte.
const SEQ_UNUSED: u8 = 0x00;

const ESC: u8 = 0x1B;
const CR: u8 = 0x0D;
const LF: u8 = 0x0A;

/// Logical command a decoded keypress maps to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Load,
    Save,
    Toggle,
    Quit,
    Up,
    Down,
}

/// One key binding: a byte sequence (padded with [`SEQ_UNUSED`]) and the
/// command it decodes to. Several bindings may share a command; no two
/// bindings may share a sequence.
pub struct KeyDef {
    pub seq: [u8; MAX_SEQ],
    pub key: Key,
}

/// Bindings for the calibration workflow: digits and space for the menu,
/// VT100 arrows with vi-style letter aliases for tuning, Escape with a
/// plain-letter alias for quitting.
pub const DEFAULT_KEYMAP: [KeyDef; 9] = [
    KeyDef { seq: [b'1', 0, 0], key: Key::Load },
    KeyDef { seq: [b'2', 0, 0], key: Key::Save },
    KeyDef { seq: [b' ', 0, 0], key: Key::Toggle },
    KeyDef { seq: [ESC, b'[', b'A'], key: Key::Up },
    KeyDef { seq: [ESC, b'[', b'B'], key: Key::Down },
    KeyDef { seq: [ESC, 0, 0], key: Key::Quit },
    KeyDef { seq: [b'q', 0, 0], key: Key::Quit },
    KeyDef { seq: [b'j', 0, 0], key: Key::Down },
    KeyDef { seq: [b'k', 0, 0], key: Key::Up },
];

pub struct KeyScanner {
    table: &'static [KeyDef],
}

impl KeyScanner {
    pub const fn new(table: &'static [KeyDef]) -> Self {
        Self { table }
    }

    /// Decode at most one keypress from the serial link.
    ///
    /// Returns immediately with `None` when nothing is pending. Otherwise
    /// accumulates bytes until the table says the input either resolved or
    /// can never resolve, or until `timeout_ms` passes with no new byte.
    /// The deadline restarts on every accepted byte, so `timeout_ms` bounds
    /// inter-byte silence, not the whole call.
    pub fn poll<S, C>(&self, serial: &mut S, clock: &C, timeout_ms: u32) -> Option<Key>
    where
        S: SerialPort,
        C: Clock,
    {
        if !serial.rx_ready() {
            return None;
        }

        let mut buf = [SEQ_UNUSED; MAX_SEQ];
        let mut cursor = 0;
        let mut matched: Option<Key> = None;
        let mut deadline = clock.now_ms().wrapping_add(timeout_ms);

        while clock.now_ms() < deadline {
            let byte = match serial.read_byte() {
                Some(byte) => byte,
                None => continue,
            };
            // Terminals that insist on appending line endings to an
            // "instant" keypress get them stripped here, without touching
            // the accumulator or the idle deadline.
            if byte == CR || byte == LF {
                continue;
            }
            deadline = clock.now_ms().wrapping_add(timeout_ms);

            buf[cursor] = byte;
            matched = None;
            let mut partial = 0u8;
            for def in self.table {
                if def.seq[0] != buf[0] {
                    continue;
                }
                // Unused tails on both sides hold the same pad byte, so a
                // short key matches by comparing every position, not by a
                // length check.
                if (0..MAX_SEQ).all(|i| def.seq[i] == buf[i]) {
                    matched = Some(def.key);
                } else {
                    partial += 1;
                }
            }

            // Unambiguous complete match with the line drained: done now,
            // single-byte keys must not sit out the idle timeout.
            if matched.is_some() && partial == 0 && !serial.rx_ready() {
                return matched;
            }
            // Nothing matched and nothing can still complete.
            if matched.is_none() && partial == 0 {
                return None;
            }
            cursor += 1;
            // Accumulator full: whatever completed along the way is the
            // answer, and there is no room to wait for anything longer.
            if cursor == MAX_SEQ {
                return matched;
            }
        }

        // Idle deadline hit mid-sequence. A complete match still pending
        // here is a short key that is also a prefix of a longer one (bare
        // Escape vs. an arrow sequence); the silence resolves it.
        matched
    }
}
