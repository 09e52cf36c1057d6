//! rawkey: raw keystroke capture for interactive command-line prompts.
//!
//! This crate puts a terminal into a mode where every keypress is delivered
//! immediately (no line buffering, no local echo, no signal characters) and
//! decodes the resulting byte stream into logical keys, including the
//! multi-byte escape sequences terminals send for arrow and navigation keys.
//!
//! # Key Types
//!
//! - [`RuneReader`] - Owns the input, the mode controller and the saved terminal mode
//! - [`RawSession`] - Scoped raw-mode session that restores the terminal exactly once
//! - [`KeyDecoder`] - Escape-sequence state machine, usable without a terminal
//! - [`ModeControl`] - Get/set/derive seam over the OS terminal attributes
//! - [`Key`] / [`KeyPress`] - Decoded keys
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(unix)]
//! # fn example() -> rawkey::Result<()> {
//! use rawkey::{Key, RuneReader, TtyControl};
//! use std::os::fd::AsFd;
//!
//! let tty = std::io::stdin().as_fd().try_clone_to_owned()?;
//! let input = std::fs::File::from(tty.try_clone()?);
//! let mut reader = RuneReader::new(input, TtyControl::new(tty));
//!
//! reader.with_raw_mode(|session| loop {
//!     let press = session.read_key()?;
//!     if press.key == Key::Char('q') {
//!         return Ok(());
//!     }
//! })?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod decoder;
pub mod error;
pub mod input;
pub mod model;
pub mod reader;
pub mod terminal;

pub use crate::decoder::KeyDecoder;
pub use crate::error::{Error, ModeOperation, Result};
pub use crate::input::InputBuffer;
pub use crate::model::*;
pub use crate::reader::{RawSession, RuneReader};
pub use crate::terminal::ModeControl;
#[cfg(unix)]
pub use crate::terminal::TtyControl;
