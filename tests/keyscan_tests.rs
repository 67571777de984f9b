#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use precision_vcc::bsp::clock::Clock;
    use precision_vcc::bsp::serial::SerialPort;
    use precision_vcc::keyscan::{Key, KeyScanner, DEFAULT_KEYMAP};
    use ufmt::uWrite;

    const TIMEOUT: u32 = 100;

    /// Clock that advances one millisecond per observation, so the
    /// decoder's busy-poll makes progress without real time passing.
    struct TickingClock {
        now: Cell<u32>,
    }

    impl TickingClock {
        fn new() -> Self {
            TickingClock { now: Cell::new(0) }
        }

        fn peek(&self) -> u32 {
            self.now.get()
        }
    }

    impl Clock for TickingClock {
        fn now_ms(&self) -> u32 {
            let now = self.now.get();
            self.now.set(now + 1);
            now
        }
    }

    /// Serial link replaying a script of (arrival time, byte) pairs.
    /// Polling for input also costs a millisecond, like the real UART.
    struct ScriptPort<'a> {
        feed: &'a [(u32, u8)],
        next: Cell<usize>,
        clock: &'a TickingClock,
        out: RefCell<String>,
    }

    impl<'a> ScriptPort<'a> {
        fn new(feed: &'a [(u32, u8)], clock: &'a TickingClock) -> Self {
            ScriptPort {
                feed,
                next: Cell::new(0),
                clock,
                out: RefCell::new(String::new()),
            }
        }
    }

    impl<'a> uWrite for ScriptPort<'a> {
        type Error = std::convert::Infallible;

        fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
            self.out.borrow_mut().push_str(s);
            Ok(())
        }
    }

    impl<'a> SerialPort for ScriptPort<'a> {
        fn rx_ready(&mut self) -> bool {
            let now = self.clock.now_ms();
            let next = self.next.get();
            next < self.feed.len() && self.feed[next].0 <= now
        }

        fn read_byte(&mut self) -> Option<u8> {
            if !self.rx_ready() {
                return None;
            }
            let next = self.next.get();
            self.next.set(next + 1);
            Some(self.feed[next].1)
        }

        fn write_byte(&mut self, byte: u8) {
            self.out.borrow_mut().push(byte as char);
        }
    }

    fn decode(feed: &[(u32, u8)]) -> (Option<Key>, u32) {
        let clock = TickingClock::new();
        let mut port = ScriptPort::new(feed, &clock);
        let scanner = KeyScanner::new(&DEFAULT_KEYMAP);
        let key = scanner.poll(&mut port, &clock, TIMEOUT);
        (key, clock.peek())
    }

    #[test]
    fn empty_input_returns_at_once() {
        let (key, elapsed) = decode(&[]);
        assert_eq!(key, None);
        assert!(elapsed <= 1, "spent {}ms on an empty line", elapsed);
    }

    #[test]
    fn single_byte_key_resolves_before_the_idle_timeout() {
        let (key, elapsed) = decode(&[(0, b'1')]);
        assert_eq!(key, Some(Key::Load));
        assert!(elapsed < TIMEOUT, "took {}ms", elapsed);

        let (key, elapsed) = decode(&[(0, b'2')]);
        assert_eq!(key, Some(Key::Save));
        assert!(elapsed < TIMEOUT, "took {}ms", elapsed);

        let (key, elapsed) = decode(&[(0, b' ')]);
        assert_eq!(key, Some(Key::Toggle));
        assert!(elapsed < TIMEOUT, "took {}ms", elapsed);
    }

    #[test]
    fn letter_aliases_map_to_the_same_commands() {
        assert_eq!(decode(&[(0, b'k')]).0, Some(Key::Up));
        assert_eq!(decode(&[(0, b'j')]).0, Some(Key::Down));
        assert_eq!(decode(&[(0, b'q')]).0, Some(Key::Quit));
    }

    #[test]
    fn arrow_sequences_decode_with_gaps_below_the_timeout() {
        let (key, _) = decode(&[(0, 0x1B), (10, b'['), (20, b'A')]);
        assert_eq!(key, Some(Key::Up));

        let (key, _) = decode(&[(0, 0x1B), (50, b'['), (120, b'B')]);
        assert_eq!(key, Some(Key::Down));
    }

    #[test]
    fn each_full_sequence_yields_exactly_one_event() {
        let clock = TickingClock::new();
        let feed = [(0, 0x1B), (10, b'['), (20, b'A')];
        let mut port = ScriptPort::new(&feed, &clock);
        let scanner = KeyScanner::new(&DEFAULT_KEYMAP);

        assert_eq!(scanner.poll(&mut port, &clock, TIMEOUT), Some(Key::Up));
        assert_eq!(scanner.poll(&mut port, &clock, TIMEOUT), None);
    }

    #[test]
    fn bare_escape_resolves_once_the_line_goes_idle() {
        let (key, elapsed) = decode(&[(0, 0x1B)]);
        assert_eq!(key, Some(Key::Quit));
        assert!(elapsed >= TIMEOUT, "resolved after only {}ms", elapsed);
    }

    #[test]
    fn unmatched_byte_fails_without_waiting_out_the_timeout() {
        let (key, elapsed) = decode(&[(0, b'z')]);
        assert_eq!(key, None);
        assert!(elapsed < TIMEOUT, "took {}ms", elapsed);
    }

    #[test]
    fn unknown_escape_sequence_fails_at_the_buffer_bound() {
        let (key, elapsed) = decode(&[(0, 0x1B), (5, b'['), (10, b'Z')]);
        assert_eq!(key, None);
        assert!(elapsed < TIMEOUT, "took {}ms", elapsed);
    }

    #[test]
    fn line_endings_are_discarded() {
        let (key, _) = decode(&[(0, 0x0D), (1, 0x0A)]);
        assert_eq!(key, None);

        // A keypress arriving behind a stray CR still decodes.
        let (key, _) = decode(&[(0, 0x0D), (2, b'2')]);
        assert_eq!(key, Some(Key::Save));
    }
}
