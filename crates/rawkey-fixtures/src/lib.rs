//! Test utilities and fixtures for rawkey integration tests.
//!
//! This crate provides stand-ins for the two things the reader talks to:
//!
//! - [`ScriptedInput`] - A byte source that delivers pre-arranged bursts,
//!   one burst per `read` call, the way a terminal delivers keystrokes
//! - [`InputScript`] - Fluent builder for scripted input
//! - [`FakeModeControl`] - In-memory terminal attributes with call counting
//!   and failure injection
//! - [`sequence`] - Byte sequences terminals send for special keys
//!
//! # Example
//!
//! ```
//! use rawkey::{Key, RuneReader};
//! use rawkey_fixtures::{sequence, FakeModeControl, InputScript};
//!
//! let input = InputScript::new()
//!     .burst(sequence::ARROW_UP)
//!     .text("q")
//!     .build();
//! let control = FakeModeControl::new();
//! let mut reader = RuneReader::new(input, control.clone());
//!
//! let key = reader.with_raw_mode(|session| Ok(session.read_key()?.key)).unwrap();
//! assert_eq!(key, Key::ArrowUp);
//! assert_eq!(control.restore_count(), 1);
//! ```

// Test fixtures crate - relaxed lints for test utilities
#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::missing_panics_doc)]

pub mod builders;
pub mod fake;

// Re-export commonly used items at crate root
pub use builders::{sequence, InputScript, ScriptedInput};
pub use fake::{FakeAttributes, FakeModeControl};
