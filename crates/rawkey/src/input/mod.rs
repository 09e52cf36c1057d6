//! Buffered view over the raw terminal byte source.
//!
//! [`InputBuffer`] sits between the terminal and the key decoder. Besides
//! decoding code points it answers "how many bytes are already in memory?"
//! without touching the source, which is what lets the decoder tell a lone
//! Escape keypress from the start of an escape sequence. Every consumed byte
//! is optionally recorded so the prompt can replay or echo it later.

use crate::model::ReaderOptions;
use std::io::{self, BufRead, BufReader, Read};

/// Replacement for malformed UTF-8 input.
const REPLACEMENT: char = char::REPLACEMENT_CHARACTER;

/// Buffered cursor over a byte source with a record of consumed bytes.
pub struct InputBuffer<R> {
    inner: BufReader<R>,
    record: Vec<u8>,
    record_input: bool,
    consumed: usize,
}

impl<R: Read> InputBuffer<R> {
    /// Wrap `source` with default options.
    pub fn new(source: R) -> Self {
        Self::with_options(source, &ReaderOptions::default())
    }

    /// Wrap `source` using the capacity and recording settings in `options`.
    pub fn with_options(source: R, options: &ReaderOptions) -> Self {
        Self {
            inner: BufReader::with_capacity(options.effective_capacity(), source),
            record: Vec::new(),
            record_input: options.record_input,
            consumed: 0,
        }
    }

    /// Read one byte, blocking until the source provides one.
    pub fn read_byte(&mut self) -> io::Result<u8> {
        let byte = self.peek_byte()?.ok_or_else(end_of_input)?;
        self.consume(1);
        Ok(byte)
    }

    /// Decode one UTF-8 code point.
    ///
    /// A malformed or truncated sequence yields U+FFFD. A byte that cannot
    /// continue the sequence is left unread, so decoding resynchronises on it.
    pub fn read_char(&mut self) -> io::Result<char> {
        let lead = self.read_byte()?;
        let width = utf8_width(lead);
        if width == 1 {
            return Ok(char::from(lead));
        }
        if width == 0 {
            return Ok(REPLACEMENT);
        }

        let mut encoded = [lead, 0, 0, 0];
        for slot in encoded.iter_mut().take(width).skip(1) {
            match self.peek_byte()? {
                Some(byte) if is_continuation(byte) => {
                    *slot = byte;
                    self.consume(1);
                }
                _ => return Ok(REPLACEMENT),
            }
        }

        let decoded = encoded
            .get(..width)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .and_then(|text| text.chars().next());
        Ok(decoded.unwrap_or(REPLACEMENT))
    }

    /// Drop up to `count` bytes that are already buffered.
    ///
    /// Never blocks waiting for more input; returns how many were dropped.
    pub fn discard(&mut self, count: usize) -> usize {
        let count = count.min(self.buffered());
        self.consume(count);
        count
    }

    /// Next byte without consuming it; `None` at end of input.
    fn peek_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            match self.inner.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
    }

    fn consume(&mut self, count: usize) {
        if self.record_input {
            if let Some(bytes) = self.inner.buffer().get(..count) {
                self.record.extend_from_slice(bytes);
            }
        }
        self.inner.consume(count);
        self.consumed += count;
    }
}

impl<R> InputBuffer<R> {
    /// Number of unread bytes already held in memory.
    ///
    /// Never reads from the source.
    pub fn buffered(&self) -> usize {
        self.inner.buffer().len()
    }

    /// Total bytes consumed since creation (read or discarded).
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Bytes recorded so far.
    pub fn recorded(&self) -> &[u8] {
        &self.record
    }

    /// Take the recorded bytes, leaving the record empty.
    pub fn take_recorded(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.record)
    }

    /// Forget the recorded bytes.
    pub fn clear_recorded(&mut self) {
        self.record.clear();
    }

    /// The wrapped byte source.
    pub fn get_ref(&self) -> &R {
        self.inner.get_ref()
    }
}

fn end_of_input() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "end of terminal input")
}

/// Encoded length announced by a UTF-8 lead byte; 0 when `lead` cannot start a sequence.
fn utf8_width(lead: u8) -> usize {
    match lead {
        0x00..=0x7f => 1,
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => 0,
    }
}

fn is_continuation(byte: u8) -> bool {
    byte & 0xc0 == 0x80
}
