//! Raw-mode key reading sessions.
//!
//! [`RuneReader`] ties the key decoder to a terminal: it saves the terminal
//! mode, switches to raw input, and restores the saved mode afterwards. The
//! terminal mode is shared by the whole process (and the user's shell), so the
//! restore must happen on every exit path. [`RawSession`] is the scoped form:
//! it restores in [`RawSession::finish`] or, failing that, on drop.
//!
//! # Example
//!
//! ```
//! use rawkey::{Key, ModeControl, Result, RuneReader};
//!
//! // A controller for something that is not a real terminal.
//! struct Detached;
//!
//! impl ModeControl for Detached {
//!     type Mode = ();
//!     fn get_mode(&self) -> Result<()> { Ok(()) }
//!     fn set_mode(&self, _: &()) -> Result<()> { Ok(()) }
//!     fn derive_raw_mode(&self, _: &()) {}
//! }
//!
//! # fn main() -> Result<()> {
//! let mut reader = RuneReader::new(&b"\x1b[Ax"[..], Detached);
//! let keys = reader.with_raw_mode(|session| {
//!     Ok([session.read_key()?.key, session.read_key()?.key])
//! })?;
//! assert_eq!(keys, [Key::ArrowUp, Key::Char('x')]);
//! assert!(!reader.is_raw());
//! # Ok(())
//! # }
//! ```

use crate::decoder::KeyDecoder;
use crate::error::{Error, Result};
use crate::input::InputBuffer;
use crate::model::{KeyPress, ReaderOptions};
use crate::terminal::ModeControl;
use std::io::Read;
use tracing::{debug, warn};

/// Reads keys from a terminal and owns its saved mode.
pub struct RuneReader<R, C: ModeControl> {
    decoder: KeyDecoder<R>,
    control: C,
    saved: Option<C::Mode>,
}

impl<R: Read, C: ModeControl> RuneReader<R, C> {
    /// Read keys from `input`, switching modes through `control`.
    pub fn new(input: R, control: C) -> Self {
        Self::with_options(input, control, &ReaderOptions::default())
    }

    /// Like [`RuneReader::new`] with explicit buffer options.
    pub fn with_options(input: R, control: C, options: &ReaderOptions) -> Self {
        Self {
            decoder: KeyDecoder::with_options(input, options),
            control,
            saved: None,
        }
    }

    /// Read one key. See [`KeyDecoder::read_key`].
    pub fn read_key(&mut self) -> Result<KeyPress> {
        self.decoder.read_key()
    }

    /// Enter raw mode and return a guard that restores the terminal.
    pub fn raw_session(&mut self) -> Result<RawSession<'_, R, C>> {
        self.enter_raw_mode()?;
        Ok(RawSession {
            reader: self,
            restored: false,
        })
    }

    /// Run `body` inside a raw-mode session.
    ///
    /// The terminal is restored before returning. If both `body` and the
    /// restore fail, the error from `body` is returned and the restore
    /// failure is logged.
    pub fn with_raw_mode<T, F>(&mut self, body: F) -> Result<T>
    where
        F: FnOnce(&mut RawSession<'_, R, C>) -> Result<T>,
    {
        let mut session = self.raw_session()?;
        let outcome = body(&mut session);
        let restored = session.finish();
        match (outcome, restored) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(err)) | (Err(err), Ok(())) => Err(err),
            (Err(err), Err(restore_err)) => {
                warn!(error = %restore_err, "failed to restore terminal mode");
                Err(err)
            }
        }
    }
}

impl<R, C: ModeControl> RuneReader<R, C> {
    /// Save the current terminal mode and switch to raw input.
    ///
    /// The saved mode is only kept once the raw mode has been applied; on
    /// failure nothing is saved and the error is returned.
    pub fn enter_raw_mode(&mut self) -> Result<()> {
        if self.saved.is_some() {
            return Err(Error::AlreadyRaw);
        }
        let original = self.control.get_mode()?;
        let raw = self.control.derive_raw_mode(&original);
        self.control.set_mode(&raw)?;
        self.saved = Some(original);
        debug!("entered raw mode");
        Ok(())
    }

    /// Reapply the mode saved by [`RuneReader::enter_raw_mode`].
    ///
    /// The saved mode is dropped once applied and kept if applying fails.
    pub fn restore_mode(&mut self) -> Result<()> {
        let Some(original) = self.saved.as_ref() else {
            return Err(Error::NotRaw);
        };
        self.control.set_mode(original)?;
        self.saved = None;
        debug!("restored terminal mode");
        Ok(())
    }

    /// True while a saved mode is waiting to be restored.
    pub fn is_raw(&self) -> bool {
        self.saved.is_some()
    }

    /// The mode controller.
    pub fn control(&self) -> &C {
        &self.control
    }

    /// The buffered input behind the decoder.
    pub fn input(&self) -> &InputBuffer<R> {
        self.decoder.input()
    }

    /// Every byte consumed so far, for echo or history.
    pub fn recorded(&self) -> &[u8] {
        self.decoder.input().recorded()
    }

    /// Take the consumed-byte record, leaving it empty.
    pub fn take_recorded(&mut self) -> Vec<u8> {
        self.decoder.input_mut().take_recorded()
    }
}

/// A raw-mode session borrowed from a [`RuneReader`].
///
/// The saved terminal mode is restored exactly once: by [`RawSession::finish`]
/// or when the session is dropped.
pub struct RawSession<'a, R, C: ModeControl> {
    reader: &'a mut RuneReader<R, C>,
    restored: bool,
}

impl<R: Read, C: ModeControl> RawSession<'_, R, C> {
    /// Read one key.
    pub fn read_key(&mut self) -> Result<KeyPress> {
        self.reader.read_key()
    }
}

impl<R, C: ModeControl> RawSession<'_, R, C> {
    /// Restore the terminal and report the outcome.
    pub fn finish(mut self) -> Result<()> {
        self.restored = true;
        self.reader.restore_mode()
    }

    /// Every byte consumed so far.
    pub fn recorded(&self) -> &[u8] {
        self.reader.recorded()
    }

    /// Take the consumed-byte record, leaving it empty.
    pub fn take_recorded(&mut self) -> Vec<u8> {
        self.reader.take_recorded()
    }
}

impl<R, C: ModeControl> Drop for RawSession<'_, R, C> {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;
        if let Err(err) = self.reader.restore_mode() {
            warn!(error = %err, "failed to restore terminal mode");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::model::Key;
    use std::cell::{Cell, RefCell};

    /// Counts calls and remembers the last applied mode.
    #[derive(Default)]
    struct Recorder {
        current: Cell<u8>,
        sets: RefCell<Vec<u8>>,
    }

    impl ModeControl for Recorder {
        type Mode = u8;

        fn get_mode(&self) -> Result<u8> {
            Ok(self.current.get())
        }

        fn set_mode(&self, mode: &u8) -> Result<()> {
            self.current.set(*mode);
            self.sets.borrow_mut().push(*mode);
            Ok(())
        }

        fn derive_raw_mode(&self, mode: &u8) -> u8 {
            mode | 0x80
        }
    }

    #[test]
    fn session_restores_on_finish() {
        let control = Recorder::default();
        control.current.set(7);
        let mut reader = RuneReader::new(&b"a"[..], &control);

        let mut session = reader.raw_session().unwrap();
        assert_eq!(session.read_key().unwrap().key, Key::Char('a'));
        session.finish().unwrap();

        assert_eq!(*control.sets.borrow(), vec![0x87, 7]);
        assert!(!reader.is_raw());
    }

    #[test]
    fn session_restores_on_drop() {
        let control = Recorder::default();
        let mut reader = RuneReader::new(&b""[..], &control);
        {
            let mut session = reader.raw_session().unwrap();
            assert!(session.read_key().is_err());
        }
        assert_eq!(*control.sets.borrow(), vec![0x80, 0]);
    }

    #[test]
    fn double_entry_is_rejected() {
        let control = Recorder::default();
        let mut reader = RuneReader::new(&b""[..], &control);
        reader.enter_raw_mode().unwrap();
        assert!(matches!(reader.enter_raw_mode(), Err(Error::AlreadyRaw)));
        reader.restore_mode().unwrap();
        assert!(matches!(reader.restore_mode(), Err(Error::NotRaw)));
    }

    /// Inspects a reader without knowing how its input is read.
    fn snapshot<R, C: ModeControl>(reader: &RuneReader<R, C>) -> (bool, usize, Vec<u8>) {
        (
            reader.is_raw(),
            reader.input().buffered(),
            reader.recorded().to_vec(),
        )
    }

    fn drain<R, C: ModeControl>(session: &mut RawSession<'_, R, C>) -> Vec<u8> {
        let seen = session.recorded().len();
        let taken = session.take_recorded();
        assert_eq!(taken.len(), seen);
        taken
    }

    #[test]
    fn accessors_work_for_any_input_type() {
        let control = Recorder::default();
        let mut reader = RuneReader::new(&b"ab"[..], &control);
        assert_eq!(reader.read_key().unwrap().key, Key::Char('a'));
        assert_eq!(snapshot(&reader), (false, 1, b"a".to_vec()));

        let mut session = reader.raw_session().unwrap();
        assert_eq!(session.read_key().unwrap().key, Key::Char('b'));
        assert_eq!(drain(&mut session), b"ab");
        session.finish().unwrap();
        assert_eq!(snapshot(&reader), (false, 0, Vec::new()));
    }
}
