//! The OS seam of a stream.

use std::fs::File;
use std::io;

/// An open file descriptor as seen by a [`Stream`](crate::Stream).
///
/// Each method is a single system call; the stream decides what a short
/// transfer means.
pub trait Handle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Force written data to durable storage.
    fn sync(&mut self) -> io::Result<()>;

    /// Release the handle, reporting errors the OS raises on close.
    fn close(self) -> io::Result<()>
    where
        Self: Sized;

    /// Hint that the handle will be accessed sequentially.
    fn advise_sequential(&self) -> io::Result<()> {
        Ok(())
    }
}

impl Handle for File {
    #[inline(always)]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(self, buf)
    }

    #[inline(always)]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::Write::write(self, buf)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_all()
    }

    #[cfg(unix)]
    fn close(self) -> io::Result<()> {
        use std::os::unix::io::IntoRawFd;

        // Dropping a File ignores close(2) errors.
        let fd = self.into_raw_fd();
        if unsafe { libc::close(fd) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn close(self) -> io::Result<()> {
        drop(self);
        Ok(())
    }

    #[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
    fn advise_sequential(&self) -> io::Result<()> {
        use std::os::unix::io::AsRawFd;

        let ret =
            unsafe { libc::posix_fadvise(self.as_raw_fd(), 0, 0, libc::POSIX_FADV_SEQUENTIAL) };
        if ret != 0 {
            return Err(io::Error::from_raw_os_error(ret));
        }
        Ok(())
    }
}
