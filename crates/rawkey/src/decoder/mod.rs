//! Escape-sequence decoding.
//!
//! [`KeyDecoder`] turns the raw byte stream of a terminal in raw mode into
//! [`Key`]s. Regular characters pass through unchanged. An escape character
//! starts a sequence of the form `ESC <keypad> <final>` where `<keypad>` is
//! `[` (normal keypad) or `O` (application keypad); see
//! <https://vt100.net/docs/vt102-ug/appendixc.html>.
//!
//! A lone Escape keypress is told apart from the start of a sequence by
//! whether further bytes are already buffered: terminals write a whole
//! sequence in one burst, so by the time the escape is decoded the rest of
//! the sequence is in memory. No timer is involved. A sequence split across
//! reads (slow links, tiny buffers) therefore decodes as `Escape` followed by
//! its remaining characters.

use crate::error::{Error, Result};
use crate::input::InputBuffer;
use crate::model::{Key, KeyPress, Keypad, ReaderOptions, ESCAPE};
use std::io::Read;
use std::iter::FusedIterator;
use tracing::{trace, warn};

/// Decodes keys from a buffered byte source.
pub struct KeyDecoder<R> {
    input: InputBuffer<R>,
    /// Set once iteration has ended.
    done: bool,
}

impl<R: Read> KeyDecoder<R> {
    /// Decode keys from `source` with default options.
    pub fn new(source: R) -> Self {
        Self::with_options(source, &ReaderOptions::default())
    }

    /// Decode keys from `source` using `options`.
    pub fn with_options(source: R, options: &ReaderOptions) -> Self {
        Self {
            input: InputBuffer::with_options(source, options),
            done: false,
        }
    }

    /// Read exactly one key.
    ///
    /// Blocks until at least one byte is available. Read errors (including
    /// end of input) abort the key and are returned unchanged; no partial
    /// key is ever produced.
    pub fn read_key(&mut self) -> Result<KeyPress> {
        let start = self.input.consumed();
        let key = self.decode()?;
        let press = KeyPress::new(key, self.input.consumed() - start);
        trace!(key = %press.key, len = press.len, "decoded key");
        Ok(press)
    }

    fn decode(&mut self) -> Result<Key> {
        let ch = self.input.read_char()?;
        if ch != ESCAPE {
            return Ok(Key::Char(ch));
        }

        if self.input.buffered() == 0 {
            return Ok(Key::Escape);
        }

        let prefix = self.input.read_char()?;
        let Some(keypad) = Keypad::from_prefix(prefix) else {
            warn!(prefix = %prefix.escape_debug(), "unexpected escape sequence");
            return Err(Error::UnexpectedEscapeSequence {
                sequence: [ESCAPE, prefix],
            });
        };

        let last = self.input.read_char()?;
        let key = match last {
            'A' => Key::ArrowUp,
            'B' => Key::ArrowDown,
            'C' => Key::ArrowRight,
            'D' => Key::ArrowLeft,
            'F' => Key::End,
            'H' => Key::Home,
            // ESC [ 3 ~
            '3' if keypad == Keypad::Normal => {
                self.input.discard(1);
                Key::Delete
            }
            _ => {
                trace!(?keypad, last = %last.escape_debug(), "ignoring unmapped sequence");
                self.input.discard(1);
                Key::Ignore
            }
        };
        Ok(key)
    }
}

impl<R> KeyDecoder<R> {
    /// The buffered input, for inspecting the consumed-byte record.
    pub fn input(&self) -> &InputBuffer<R> {
        &self.input
    }

    /// Mutable access to the buffered input.
    pub fn input_mut(&mut self) -> &mut InputBuffer<R> {
        &mut self.input
    }
}

impl<R: Read> Iterator for KeyDecoder<R> {
    type Item = Result<KeyPress>;

    /// Yields keys until end of input.
    ///
    /// Unexpected escape sequences are yielded and iteration continues; any
    /// other error is yielded once and ends the iteration.
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_key() {
            Err(err) if err.is_end_of_input() => {
                self.done = true;
                None
            }
            Err(err) if !err.is_recoverable() => {
                self.done = true;
                Some(Err(err))
            }
            other => Some(other),
        }
    }
}

impl<R: Read> FusedIterator for KeyDecoder<R> {}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn keys(bytes: &[u8]) -> Vec<Key> {
        KeyDecoder::new(bytes)
            .map(|press| press.unwrap().key)
            .collect()
    }

    #[test]
    fn printable_bytes_pass_through() {
        for byte in 0x20u8..0x7f {
            let bytes = [byte];
            let mut decoder = KeyDecoder::new(&bytes[..]);
            let press = decoder.read_key().unwrap();
            assert_eq!(press.key, Key::Char(char::from(byte)));
            assert_eq!(press.width, 1);
            assert_eq!(press.len, 1);
        }
    }

    #[test]
    fn lone_escape_is_escape_key() {
        assert_eq!(keys(b"\x1b"), vec![Key::Escape]);
    }

    #[test]
    fn arrows_in_both_dialects() {
        assert_eq!(
            keys(b"\x1b[A\x1bOA\x1b[B\x1bOD"),
            vec![Key::ArrowUp, Key::ArrowUp, Key::ArrowDown, Key::ArrowLeft]
        );
    }

    #[test]
    fn delete_consumes_its_terminator() {
        let mut decoder = KeyDecoder::new(&b"\x1b[3~z"[..]);
        let press = decoder.read_key().unwrap();
        assert_eq!(press.key, Key::Delete);
        assert_eq!(press.width, 1);
        assert_eq!(press.len, 4);
        assert_eq!(decoder.read_key().unwrap().key, Key::Char('z'));
    }

    #[test]
    fn bad_keypad_prefix_is_an_error() {
        let mut decoder = KeyDecoder::new(&b"\x1bXq"[..]);
        let err = decoder.read_key().unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedEscapeSequence {
                sequence: ['\u{1b}', 'X']
            }
        ));
        assert_eq!(decoder.read_key().unwrap().key, Key::Char('q'));
    }

    #[test]
    fn truncated_sequence_propagates_end_of_input() {
        let mut decoder = KeyDecoder::new(&b"\x1b["[..]);
        let err = decoder.read_key().unwrap_err();
        assert!(err.is_end_of_input());
    }

    #[test]
    fn iterator_stops_at_end_of_input() {
        assert_eq!(keys(b"hi"), vec![Key::Char('h'), Key::Char('i')]);
        assert!(KeyDecoder::new(&b""[..]).next().is_none());
    }

    /// Fails every read with the same error.
    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn iterator_ends_after_a_persistent_read_error() {
        let mut decoder = KeyDecoder::new(Broken);
        let first = decoder.next().expect("error should be yielded once");
        assert!(matches!(first, Err(Error::Io(ref err)) if err.kind() == std::io::ErrorKind::BrokenPipe));
        assert!(decoder.next().is_none());
        assert!(decoder.next().is_none());
    }

    #[test]
    fn iterator_continues_past_unexpected_sequences() {
        let items: Vec<_> = KeyDecoder::new(&b"\x1bXq"[..]).collect();
        assert_eq!(items.len(), 2);
        assert!(items[0].as_ref().is_err_and(Error::is_recoverable));
        assert_eq!(items[1].as_ref().unwrap().key, Key::Char('q'));
    }
}
