//! Fluent builders for scripted terminal input.

use std::collections::VecDeque;
use std::io::{self, Read};

/// Byte sequences sent by terminals for special keys.
pub mod sequence {
    /// Escape key on its own.
    pub const ESCAPE: &[u8] = b"\x1b";
    /// Arrow up, normal keypad.
    pub const ARROW_UP: &[u8] = b"\x1b[A";
    /// Arrow down, normal keypad.
    pub const ARROW_DOWN: &[u8] = b"\x1b[B";
    /// Arrow right, normal keypad.
    pub const ARROW_RIGHT: &[u8] = b"\x1b[C";
    /// Arrow left, normal keypad.
    pub const ARROW_LEFT: &[u8] = b"\x1b[D";
    /// End, normal keypad.
    pub const END: &[u8] = b"\x1b[F";
    /// Home, normal keypad.
    pub const HOME: &[u8] = b"\x1b[H";
    /// Delete, normal keypad.
    pub const DELETE: &[u8] = b"\x1b[3~";

    /// `ESC <prefix> <last>`: a three byte sequence in either dialect.
    pub fn csi(prefix: u8, last: u8) -> [u8; 3] {
        [0x1b, prefix, last]
    }
}

/// A byte source that returns one scripted burst per `read`.
///
/// Once the bursts run out the source reports end of input, or the
/// configured error if one was set with [`InputScript::then_fail`].
#[derive(Debug, Default)]
pub struct ScriptedInput {
    bursts: VecDeque<Vec<u8>>,
    failure: Option<io::ErrorKind>,
    reads: usize,
}

impl ScriptedInput {
    /// Number of `read` calls made so far, including the final empty one.
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Bursts not yet delivered.
    pub fn remaining(&self) -> usize {
        self.bursts.len()
    }
}

impl Read for ScriptedInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;
        let Some(mut burst) = self.bursts.pop_front() else {
            return match self.failure {
                Some(kind) => Err(io::Error::new(kind, "scripted input failure")),
                None => Ok(0),
            };
        };

        let count = burst.len().min(buf.len());
        if let (Some(dst), Some(src)) = (buf.get_mut(..count), burst.get(..count)) {
            dst.copy_from_slice(src);
        }
        if count < burst.len() {
            self.bursts.push_front(burst.split_off(count));
        }
        Ok(count)
    }
}

/// Fluent builder for [`ScriptedInput`].
#[derive(Debug, Default)]
pub struct InputScript {
    bursts: Vec<Vec<u8>>,
    failure: Option<io::ErrorKind>,
}

impl InputScript {
    /// Start an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one burst, delivered by a single `read`.
    #[must_use]
    pub fn burst(mut self, bytes: &[u8]) -> Self {
        self.bursts.push(bytes.to_vec());
        self
    }

    /// Append `text` as one burst per character, like a person typing.
    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        let mut utf8 = [0u8; 4];
        for ch in text.chars() {
            self.bursts.push(ch.encode_utf8(&mut utf8).as_bytes().to_vec());
        }
        self
    }

    /// Append each byte of `bytes` as its own burst, like a slow link.
    #[must_use]
    pub fn trickle(mut self, bytes: &[u8]) -> Self {
        self.bursts.extend(bytes.iter().map(|byte| vec![*byte]));
        self
    }

    /// Fail with `kind` instead of reporting end of input.
    #[must_use]
    pub fn then_fail(mut self, kind: io::ErrorKind) -> Self {
        self.failure = Some(kind);
        self
    }

    /// Build the input source.
    pub fn build(self) -> ScriptedInput {
        ScriptedInput {
            bursts: self.bursts.into(),
            failure: self.failure,
            reads: 0,
        }
    }
}
