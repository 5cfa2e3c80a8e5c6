use std::cmp::Ordering;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

/// Longest accepted path in bytes, counting one byte for a terminator.
pub const PATH_MAX: usize = 4096;

/// Names a stream source or destination.
///
/// The content is opaque platform path syntax; the stream only opens what it
/// is given. A path that would not fit in [`PATH_MAX`] is a fatal error: the
/// process exits instead of returning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct StreamPath(PathBuf);

#[cold]
fn path_too_long(path: &OsStr) -> ! {
    tracing::error!(len = path.len(), max = PATH_MAX, "path too long");
    eprintln!("Path too long");
    std::process::exit(1)
}

fn checked(path: OsString) -> Option<StreamPath> {
    if path.len() + 1 > PATH_MAX {
        None
    } else {
        Some(StreamPath(path.into()))
    }
}

impl StreamPath {
    /// Copies `path`, or returns `None` if it exceeds [`PATH_MAX`].
    pub fn try_new<P: AsRef<Path>>(path: P) -> Option<StreamPath> {
        checked(path.as_ref().as_os_str().to_owned())
    }

    pub fn new<P: AsRef<Path>>(path: P) -> StreamPath {
        let path = path.as_ref();
        match Self::try_new(path) {
            Some(v) => v,
            None => path_too_long(path.as_os_str()),
        }
    }

    /// Copies a user supplied path, turning Windows `\` separators into `/`.
    pub fn import<P: AsRef<Path>>(path: P) -> StreamPath {
        #[cfg(windows)]
        {
            let path = path.as_ref().to_string_lossy().replace('\\', "/");
            Self::new(path)
        }
        #[cfg(not(windows))]
        {
            Self::new(path)
        }
    }

    /// Builds a path from `format_args!` output.
    pub fn format(args: fmt::Arguments<'_>) -> StreamPath {
        Self::new(fmt::format(args))
    }

    /// Appends `tail` verbatim, with no separator.
    pub fn push_str(&mut self, tail: &str) {
        let mut path = self.0.as_os_str().to_owned();
        path.push(tail);
        match checked(path) {
            Some(v) => *self = v,
            None => path_too_long(self.0.as_os_str()),
        }
    }

    /// Appends a trailing `/` unless the path is empty or already ends with one.
    pub fn ensure_slash(&mut self) {
        let path = self.0.as_os_str();
        if path.is_empty() || path.to_string_lossy().ends_with('/') {
            return;
        }
        self.push_str("/");
    }

    /// Orders paths the way the platform's filesystem would match them:
    /// case-insensitively after import on Windows, byte-wise elsewhere.
    pub fn compare(&self, other: &StreamPath) -> Ordering {
        #[cfg(windows)]
        {
            let a = self.0.to_string_lossy().replace('\\', "/").to_lowercase();
            let b = other.0.to_string_lossy().replace('\\', "/").to_lowercase();
            a.cmp(&b)
        }
        #[cfg(not(windows))]
        {
            self.0.as_os_str().cmp(other.0.as_os_str())
        }
    }

    #[inline(always)]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.as_os_str().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.as_os_str().is_empty()
    }
}

impl AsRef<Path> for StreamPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for StreamPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}
