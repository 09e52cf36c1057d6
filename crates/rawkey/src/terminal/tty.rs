use super::ModeControl;
use crate::error::{Error, ModeOperation, Result};
use nix::sys::termios::{
    tcgetattr, tcsetattr, LocalFlags, SetArg, SpecialCharacterIndices, Termios,
};
use std::os::fd::AsFd;
use tracing::debug;

/// Mode controller for a terminal file descriptor.
///
/// Holds anything that owns or borrows the descriptor: `std::io::Stdin`,
/// an `OwnedFd`, a `File` opened on `/dev/tty`.
#[derive(Debug)]
pub struct TtyControl<F> {
    fd: F,
}

impl<F: AsFd> TtyControl<F> {
    /// Control the terminal behind `fd`.
    pub fn new(fd: F) -> Self {
        Self { fd }
    }

    /// The wrapped descriptor.
    pub fn get_ref(&self) -> &F {
        &self.fd
    }
}

impl<F: AsFd> ModeControl for TtyControl<F> {
    type Mode = Termios;

    fn get_mode(&self) -> Result<Termios> {
        tcgetattr(self.fd.as_fd()).map_err(|errno| {
            debug!(%errno, "tcgetattr failed");
            Error::mode_control(ModeOperation::Get, errno as i32)
        })
    }

    fn set_mode(&self, mode: &Termios) -> Result<()> {
        tcsetattr(self.fd.as_fd(), SetArg::TCSANOW, mode).map_err(|errno| {
            debug!(%errno, "tcsetattr failed");
            Error::mode_control(ModeOperation::Set, errno as i32)
        })
    }

    fn derive_raw_mode(&self, mode: &Termios) -> Termios {
        derive_raw_termios(mode)
    }
}

/// Raw-input copy of `mode`: no canonical processing, echo or signal
/// characters; reads return as soon as one byte is available.
pub fn derive_raw_termios(mode: &Termios) -> Termios {
    let mut raw = mode.clone();
    raw.local_flags
        .remove(LocalFlags::ECHO | LocalFlags::ECHONL | LocalFlags::ICANON | LocalFlags::ISIG);
    if let Some(min) = raw
        .control_chars
        .get_mut(SpecialCharacterIndices::VMIN as usize)
    {
        *min = 1;
    }
    if let Some(time) = raw
        .control_chars
        .get_mut(SpecialCharacterIndices::VTIME as usize)
    {
        *time = 0;
    }
    raw
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use nix::pty::openpty;
    use std::os::fd::OwnedFd;

    const RAW_FLAGS: [LocalFlags; 4] = [
        LocalFlags::ECHO,
        LocalFlags::ECHONL,
        LocalFlags::ICANON,
        LocalFlags::ISIG,
    ];

    fn pty_slave() -> (OwnedFd, OwnedFd) {
        let pty = openpty(None, None).unwrap();
        (pty.master, pty.slave)
    }

    fn cc(mode: &Termios, index: SpecialCharacterIndices) -> u8 {
        mode.control_chars[index as usize]
    }

    #[test]
    fn derive_clears_local_flags_and_sets_thresholds() {
        let (_master, slave) = pty_slave();
        let control = TtyControl::new(slave);
        let mut original = control.get_mode().unwrap();
        original.local_flags.insert(LocalFlags::ECHONL);

        let raw = control.derive_raw_mode(&original);

        for flag in RAW_FLAGS {
            assert!(!raw.local_flags.contains(flag), "{flag:?} still set");
        }
        assert_eq!(cc(&raw, SpecialCharacterIndices::VMIN), 1);
        assert_eq!(cc(&raw, SpecialCharacterIndices::VTIME), 0);
        assert!(original.local_flags.contains(LocalFlags::ECHONL));
        assert_eq!(raw.input_flags, original.input_flags);
        assert_eq!(raw.output_flags, original.output_flags);
    }

    #[test]
    fn set_then_get_round_trips_on_a_pty() {
        let (_master, slave) = pty_slave();
        let control = TtyControl::new(slave);
        let original = control.get_mode().unwrap();

        control.set_mode(&control.derive_raw_mode(&original)).unwrap();
        let applied = control.get_mode().unwrap();
        assert!(!applied.local_flags.contains(LocalFlags::ICANON));
        assert!(!applied.local_flags.contains(LocalFlags::ECHO));

        control.set_mode(&original).unwrap();
        let restored = control.get_mode().unwrap();
        assert_eq!(restored.local_flags, original.local_flags);
        assert_eq!(restored.control_chars, original.control_chars);
    }

    #[test]
    fn non_terminal_reports_get_failure() {
        let file = std::fs::File::open("/dev/null").unwrap();
        let control = TtyControl::new(file);
        let err = control.get_mode().unwrap_err();
        assert!(matches!(
            err,
            Error::ModeControl {
                operation: ModeOperation::Get,
                code,
            } if code == nix::errno::Errno::ENOTTY as i32
        ));
    }
}
