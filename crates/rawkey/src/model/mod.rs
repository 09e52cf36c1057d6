//! Key and option types.

pub mod key;
pub mod options;

pub use key::{Key, KeyPress, Keypad, ESCAPE};
pub use options::{ReaderOptions, DEFAULT_BUFFER_CAPACITY, MIN_BUFFER_CAPACITY};
