//! Raw descriptor plumbing: pipe creation, close-on-exec control and checked close

use std::io;
use std::os::fd::{FromRawFd, IntoRawFd, OwnedFd, RawFd};

/// One freshly created pipe; both ends are close-on-exec
#[derive(Debug)]
pub(super) struct Pipe {
    pub(super) read: OwnedFd,
    pub(super) write: OwnedFd,
}

/// Create a pipe whose two ends are close-on-exec
///
/// Creating them close-on-exec means a process spawned concurrently from
/// another thread never picks up our ends; the `pre_exec` hook clears the
/// flag on exactly the descriptors our own child should keep.
pub(super) fn pipe_cloexec() -> io::Result<Pipe> {
    let mut fds: [libc::c_int; 2] = [-1, -1];

    #[cfg(any(target_os = "linux", target_os = "android"))]
    // SAFETY: fds points to two writable c_ints
    let rc = unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) };
    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    // SAFETY: fds points to two writable c_ints
    let rc = unsafe { libc::pipe(fds.as_mut_ptr()) };

    if rc == -1 {
        return Err(io::Error::last_os_error());
    }

    // SAFETY: pipe returned two open descriptors that nothing else owns
    let pipe = unsafe {
        Pipe {
            read: OwnedFd::from_raw_fd(fds[0]),
            write: OwnedFd::from_raw_fd(fds[1]),
        }
    };

    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    {
        use std::os::fd::AsRawFd;
        set_cloexec(pipe.read.as_raw_fd(), true)?;
        set_cloexec(pipe.write.as_raw_fd(), true)?;
    }

    Ok(pipe)
}

/// Set or clear `FD_CLOEXEC` on a descriptor
///
/// Only calls `fcntl` and does not allocate, so it is safe to use between
/// `fork` and `exec`.
pub(super) fn set_cloexec(fd: RawFd, on: bool) -> io::Result<()> {
    // SAFETY: fcntl with F_GETFD/F_SETFD has no memory-safety preconditions
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFD) };
    if flags == -1 {
        return Err(io::Error::last_os_error());
    }
    let wanted = if on {
        flags | libc::FD_CLOEXEC
    } else {
        flags & !libc::FD_CLOEXEC
    };
    if wanted != flags {
        // SAFETY: as above
        if unsafe { libc::fcntl(fd, libc::F_SETFD, wanted) } == -1 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

/// Close a descriptor and report the outcome
///
/// Dropping an `OwnedFd` swallows close errors; teardown needs to see them.
pub(super) fn close_checked(fd: impl IntoRawFd) -> (RawFd, io::Result<()>) {
    let raw = fd.into_raw_fd();
    // SAFETY: into_raw_fd handed us sole ownership of `raw`
    let rc = unsafe { libc::close(raw) };
    if rc == -1 {
        (raw, Err(io::Error::last_os_error()))
    } else {
        (raw, Ok(()))
    }
}
