//! Input buffer settings.

use serde::{Deserialize, Serialize};

/// Default capacity of the buffered input view, in bytes.
pub const DEFAULT_BUFFER_CAPACITY: usize = 4096;
/// Smallest capacity accepted; a full escape burst must fit in one fill.
pub const MIN_BUFFER_CAPACITY: usize = 16;

/// Tunables for a [`crate::RuneReader`] or [`crate::KeyDecoder`].
///
/// Missing fields fall back to their defaults when deserialized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    /// Capacity of the in-memory buffer in front of the byte source.
    pub buffer_capacity: usize,
    /// Keep a copy of every consumed byte for echo/history.
    pub record_input: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            record_input: true,
        }
    }
}

impl ReaderOptions {
    /// Buffer capacity clamped to [`MIN_BUFFER_CAPACITY`].
    pub fn effective_capacity(&self) -> usize {
        self.buffer_capacity.max(MIN_BUFFER_CAPACITY)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_uses_defaults() {
        let options: ReaderOptions = serde_json::from_str(r#"{"record_input": false}"#).unwrap();
        assert_eq!(options.buffer_capacity, DEFAULT_BUFFER_CAPACITY);
        assert!(!options.record_input);
    }

    #[test]
    fn tiny_capacity_is_clamped() {
        let options = ReaderOptions {
            buffer_capacity: 1,
            ..ReaderOptions::default()
        };
        assert_eq!(options.effective_capacity(), MIN_BUFFER_CAPACITY);
    }
}
