//! Trivial immutable value wrappers
//!
//! Identities and result pairs passed between the wrapping layer and its
//! callers: a typed file descriptor, a terminal dimension pair, and opaque
//! platform records forwarded without interpretation.

use std::os::fd::{AsRawFd, RawFd};

/// An immutable wrapper distinguishing an OS file descriptor from an
/// arbitrary integer at the type level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileDescriptor(RawFd);

impl FileDescriptor {
    /// Standard input.
    pub const STDIN: FileDescriptor = FileDescriptor(0);
    /// Standard output.
    pub const STDOUT: FileDescriptor = FileDescriptor(1);
    /// Standard error.
    pub const STDERR: FileDescriptor = FileDescriptor(2);

    /// Wraps a raw descriptor. Ownership is not taken; the descriptor is
    /// neither duplicated nor closed.
    pub const fn new(raw: RawFd) -> Self {
        FileDescriptor(raw)
    }

    /// Returns the raw descriptor integer.
    pub const fn raw(self) -> RawFd {
        self.0
    }
}

impl From<RawFd> for FileDescriptor {
    fn from(raw: RawFd) -> Self {
        FileDescriptor(raw)
    }
}

impl From<FileDescriptor> for RawFd {
    fn from(fd: FileDescriptor) -> Self {
        fd.0
    }
}

impl AsRawFd for FileDescriptor {
    fn as_raw_fd(&self) -> RawFd {
        self.0
    }
}

/// A terminal dimension pair, as queried from a tty handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WinSize {
    pub width: i32,
    pub height: i32,
}

impl From<WinSize> for (i32, i32) {
    fn from(size: WinSize) -> Self {
        (size.width, size.height)
    }
}

/// Opaque time specification, forwarded from the platform layer unmodified.
pub type TimeSpec = libc::timespec;

/// Opaque file-stat record, forwarded from the platform layer unmodified.
pub type Stat = libc::stat;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_streams() {
        assert_eq!(FileDescriptor::STDIN.raw(), 0);
        assert_eq!(FileDescriptor::STDOUT.raw(), 1);
        assert_eq!(FileDescriptor::STDERR.raw(), 2);
    }

    #[test]
    fn test_fd_round_trip() {
        let fd = FileDescriptor::new(42);
        let raw: RawFd = fd.into();
        assert_eq!(raw, 42);
        assert_eq!(FileDescriptor::from(raw), fd);
        assert_eq!(fd.as_raw_fd(), 42);
    }

    #[test]
    fn test_winsize_into_pair() {
        let size = WinSize {
            width: 80,
            height: 24,
        };
        let (w, h): (i32, i32) = size.into();
        assert_eq!((w, h), (80, 24));
    }
}
