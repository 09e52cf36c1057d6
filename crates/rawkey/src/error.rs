//! Error type shared by the mode controller, the decoder and the reader.

use miette::Diagnostic;
use std::fmt;
use std::io;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Which terminal attribute call failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeOperation {
    /// Reading the current attributes (`TCGETS`).
    Get,
    /// Applying attributes (`TCSETS`).
    Set,
}

impl fmt::Display for ModeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("TCGETS"),
            Self::Set => f.write_str("TCSETS"),
        }
    }
}

/// Errors produced while controlling the terminal or decoding keys.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// The OS rejected a get/set of the terminal attributes.
    ///
    /// Attribute changes are never retried.
    #[error("{operation} ioctl failed with error code: {code}")]
    #[diagnostic(
        code(rawkey::mode_control),
        help("is the input stream attached to a terminal?")
    )]
    ModeControl {
        /// The failing call.
        operation: ModeOperation,
        /// Platform error code (errno).
        code: i32,
    },

    /// An escape was followed by something other than `[` or `O`.
    #[error("unexpected escape sequence from terminal: {sequence:?}")]
    #[diagnostic(code(rawkey::unexpected_escape_sequence))]
    UnexpectedEscapeSequence {
        /// The escape and the offending character.
        sequence: [char; 2],
    },

    /// The underlying byte source failed, including end of input.
    #[error(transparent)]
    #[diagnostic(code(rawkey::io))]
    Io(#[from] io::Error),

    /// Raw mode was requested while a saved mode is still pending restore.
    #[error("terminal is already in raw mode")]
    #[diagnostic(code(rawkey::already_raw))]
    AlreadyRaw,

    /// Restore was requested but no mode has been saved.
    #[error("no saved terminal mode to restore")]
    #[diagnostic(
        code(rawkey::not_raw),
        help("enter raw mode before restoring the terminal")
    )]
    NotRaw,
}

impl Error {
    pub(crate) fn mode_control(operation: ModeOperation, code: i32) -> Self {
        Self::ModeControl { operation, code }
    }

    /// True when the byte source reached end of input.
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, Self::Io(err) if err.kind() == io::ErrorKind::UnexpectedEof)
    }

    /// True for decode errors after which reading may simply continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::UnexpectedEscapeSequence { .. })
    }
}
