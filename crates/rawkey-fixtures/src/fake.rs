//! In-memory terminal mode controller.

use rawkey::{Error, ModeControl, ModeOperation, Result};
use std::cell::RefCell;
use std::rc::Rc;

/// Terminal attributes modelled after the termios fields raw mode touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FakeAttributes {
    /// Local flag bits (`ECHO`, `ECHONL`, `ICANON`, `ISIG`, ...).
    pub local_flags: u32,
    /// Flag bits raw mode must not touch.
    pub other_flags: u32,
    /// Minimum bytes per read.
    pub vmin: u8,
    /// Inter-byte read timeout.
    pub vtime: u8,
}

impl FakeAttributes {
    /// Echo input characters.
    pub const ECHO: u32 = 0x0008;
    /// Echo newline even when `ECHO` is off.
    pub const ECHONL: u32 = 0x0040;
    /// Canonical (line-buffered) input.
    pub const ICANON: u32 = 0x0002;
    /// Generate signals for interrupt characters.
    pub const ISIG: u32 = 0x0001;
    /// Extended input processing.
    pub const IEXTEN: u32 = 0x8000;

    /// True once every raw-mode setting is in place.
    pub fn is_raw(&self) -> bool {
        self.local_flags & (Self::ECHO | Self::ECHONL | Self::ICANON | Self::ISIG) == 0
            && self.vmin == 1
            && self.vtime == 0
    }
}

impl Default for FakeAttributes {
    /// A cooked terminal whose thresholds differ from the raw ones.
    fn default() -> Self {
        Self {
            local_flags: Self::ECHO | Self::ECHONL | Self::ICANON | Self::ISIG | Self::IEXTEN,
            other_flags: 0x0500,
            vmin: 0,
            vtime: 10,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    current: FakeAttributes,
    applied: Vec<FakeAttributes>,
    gets: usize,
    get_failure: Option<i32>,
    set_failure: Option<i32>,
}

/// Fake terminal. Clones share state, so a test can keep a handle while the
/// reader owns another.
#[derive(Clone, Debug, Default)]
pub struct FakeModeControl {
    state: Rc<RefCell<State>>,
}

impl FakeModeControl {
    /// A cooked terminal with [`FakeAttributes::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A terminal starting with `attributes`.
    pub fn with_attributes(attributes: FakeAttributes) -> Self {
        let control = Self::default();
        control.state.borrow_mut().current = attributes;
        control
    }

    /// Attributes currently "applied" to the terminal.
    pub fn current(&self) -> FakeAttributes {
        self.state.borrow().current
    }

    /// Every mode passed to a successful `set_mode`, in order.
    pub fn applied(&self) -> Vec<FakeAttributes> {
        self.state.borrow().applied.clone()
    }

    /// Number of successful `set_mode` calls.
    pub fn set_count(&self) -> usize {
        self.state.borrow().applied.len()
    }

    /// Number of `get_mode` calls, failed ones included.
    pub fn get_count(&self) -> usize {
        self.state.borrow().gets
    }

    /// Number of successful `set_mode` calls that left raw mode.
    pub fn restore_count(&self) -> usize {
        self.state
            .borrow()
            .applied
            .iter()
            .filter(|mode| !mode.is_raw())
            .count()
    }

    /// Make every subsequent `get_mode` fail with `code`.
    pub fn fail_gets(&self, code: i32) {
        self.state.borrow_mut().get_failure = Some(code);
    }

    /// Make every subsequent `set_mode` fail with `code`.
    pub fn fail_sets(&self, code: i32) {
        self.state.borrow_mut().set_failure = Some(code);
    }

    /// Stop injecting failures.
    pub fn clear_failures(&self) {
        let mut state = self.state.borrow_mut();
        state.get_failure = None;
        state.set_failure = None;
    }
}

impl ModeControl for FakeModeControl {
    type Mode = FakeAttributes;

    fn get_mode(&self) -> Result<FakeAttributes> {
        let mut state = self.state.borrow_mut();
        state.gets += 1;
        match state.get_failure {
            Some(code) => Err(Error::ModeControl {
                operation: ModeOperation::Get,
                code,
            }),
            None => Ok(state.current),
        }
    }

    fn set_mode(&self, mode: &FakeAttributes) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if let Some(code) = state.set_failure {
            return Err(Error::ModeControl {
                operation: ModeOperation::Set,
                code,
            });
        }
        state.current = *mode;
        state.applied.push(*mode);
        Ok(())
    }

    fn derive_raw_mode(&self, mode: &FakeAttributes) -> FakeAttributes {
        FakeAttributes {
            local_flags: mode.local_flags
                & !(FakeAttributes::ECHO
                    | FakeAttributes::ECHONL
                    | FakeAttributes::ICANON
                    | FakeAttributes::ISIG),
            vmin: 1,
            vtime: 0,
            ..*mode
        }
    }
}
