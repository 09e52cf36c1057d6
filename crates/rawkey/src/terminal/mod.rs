//! Terminal mode control.
//!
//! The line discipline settings of a terminal (echo, canonical input, signal
//! characters, read thresholds) are process-wide state owned by the OS. This
//! module exposes them through [`ModeControl`], a get/set/derive seam with one
//! termios-backed implementation ([`TtyControl`]). The reader depends only on
//! the trait, so the decoding logic can be exercised against a fake.
//!
//! # Raw mode
//!
//! [`ModeControl::derive_raw_mode`] clears `ICANON`, `ECHO`, `ECHONL` and
//! `ISIG`, and sets `VMIN = 1`, `VTIME = 0`: a read blocks until one byte
//! arrives and returns immediately, never waiting for a quiet period. Output
//! processing is left untouched, so `\n` still starts a new line.

use crate::error::Result;

/// Access to the attributes of one terminal.
pub trait ModeControl {
    /// Opaque snapshot of the terminal attributes.
    type Mode: Clone;

    /// Read the current attributes.
    fn get_mode(&self) -> Result<Self::Mode>;

    /// Apply `mode` in a single call. Failures are not retried.
    fn set_mode(&self, mode: &Self::Mode) -> Result<()>;

    /// Copy of `mode` with raw-input settings applied.
    fn derive_raw_mode(&self, mode: &Self::Mode) -> Self::Mode;
}

impl<C: ModeControl + ?Sized> ModeControl for &C {
    type Mode = C::Mode;

    fn get_mode(&self) -> Result<Self::Mode> {
        (**self).get_mode()
    }

    fn set_mode(&self, mode: &Self::Mode) -> Result<()> {
        (**self).set_mode(mode)
    }

    fn derive_raw_mode(&self, mode: &Self::Mode) -> Self::Mode {
        (**self).derive_raw_mode(mode)
    }
}

#[cfg(unix)]
mod tty;

#[cfg(unix)]
pub use tty::{derive_raw_termios, TtyControl};
