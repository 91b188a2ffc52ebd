mod bin;
pub mod ext;
mod reader;
mod writer;

pub use bin::*;
pub use reader::*;
pub use writer::*;

pub use wpress_core::{Entry, Header, HEADER_SIZE};

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

const READ_WRITE_BUF_SIZE: usize = 4 * 1024 * 1024;

/// The broad class of an [`Error`], for callers that need to branch on what
/// went wrong rather than on the exact variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A name, path or metadata value does not fit its header field
    FieldOverflow,
    /// A header read from the archive could not be decoded
    MalformedHeader,
    /// The archive ended before a header or payload was complete
    TruncatedArchive,
    /// An operation on the filesystem or the archive stream failed
    Filesystem,
    /// An entry path cannot be stored or would escape the extraction directory
    InvalidPath,
}

#[derive(thiserror::Error)]
pub enum Error {
    #[error("Entry {}: {source}", .path.display())]
    Entry {
        path: PathBuf,
        source: wpress_core::Error,
    },

    #[error("Malformed header at offset {offset}: {source}")]
    Header {
        offset: u64,
        source: wpress_core::Error,
    },

    #[error("Archive truncated at offset {offset}: expected {expected} bytes, found {actual}")]
    Truncated {
        offset: u64,
        expected: u64,
        actual: u64,
    },

    #[error("{context}{}", display_path(.path))]
    Io {
        source: io::Error,
        path: Option<PathBuf>,
        context: &'static str,
    },

    #[error("Invalid path component {} in {}", .component.display(), .entry.display())]
    InvalidPath { entry: PathBuf, component: PathBuf },

    #[error("Path is not valid UTF-8: {}", .path.display())]
    NonUtf8Path { path: PathBuf },

    #[error("Not a regular file or directory: {}", .path.display())]
    Unsupported { path: PathBuf },

    #[error("Modification time out of range: {}", .path.display())]
    MtimeOutOfRange { path: PathBuf },

    #[error("Entry {} changed while archiving: expected {expected} bytes, found {actual}", .entry.display())]
    LengthMismatch {
        entry: PathBuf,
        actual: u64,
        expected: u64,
    },
}

fn display_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!(": {}", path.display()),
        None => String::new(),
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Entry { source, .. } if source.is_overflow() => ErrorKind::FieldOverflow,
            Error::MtimeOutOfRange { .. } => ErrorKind::FieldOverflow,
            Error::Header { .. } => ErrorKind::MalformedHeader,
            Error::Truncated { .. } => ErrorKind::TruncatedArchive,
            Error::Io { .. } | Error::LengthMismatch { .. } => ErrorKind::Filesystem,
            Error::Entry { .. }
            | Error::InvalidPath { .. }
            | Error::NonUtf8Path { .. }
            | Error::Unsupported { .. } => ErrorKind::InvalidPath,
        }
    }

    /// The file or entry path this error refers to, if known
    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::Entry { path, .. }
            | Error::NonUtf8Path { path }
            | Error::Unsupported { path }
            | Error::MtimeOutOfRange { path } => Some(path.as_path()),
            Error::Io { path, .. } => path.as_deref(),
            Error::InvalidPath { entry, .. } | Error::LengthMismatch { entry, .. } => {
                Some(entry.as_path())
            }
            Error::Header { .. } | Error::Truncated { .. } => None,
        }
    }

    /// Byte offset into the archive at which this error was detected
    pub fn offset(&self) -> Option<u64> {
        match self {
            Error::Header { offset, .. } | Error::Truncated { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{self}")?;

        let mut source = self.source();
        while let Some(err) = source {
            writeln!(f, "\tCaused by: {err}")?;
            source = err.source();
        }

        Ok(())
    }
}

/// Build a closure that wraps an `io::Error` into [`Error::Io`], with an
/// optional path.
#[macro_export]
macro_rules! wrap_io_err {
    ($path:expr, $context:expr) => {
        |source| $crate::Error::Io {
            source,
            path: Some(::std::convert::AsRef::<::std::path::Path>::as_ref(&$path).to_path_buf()),
            context: $context,
        }
    };
    ($context:expr) => {
        |source| $crate::Error::Io {
            source,
            path: None,
            context: $context,
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use wpress_core::Field;

    #[test]
    fn kinds() {
        let overflow = Entry::new("x".repeat(300), 0, 0).header().unwrap_err();
        let err = Error::Entry {
            path: PathBuf::from("long"),
            source: overflow,
        };
        assert_eq!(err.kind(), ErrorKind::FieldOverflow);
        assert_eq!(err.path(), Some(Path::new("long")));

        let err = Error::Entry {
            path: PathBuf::from("dir/"),
            source: wpress_core::Error::EmptyField(Field::Name),
        };
        assert_eq!(err.kind(), ErrorKind::InvalidPath);

        let err = Error::Truncated {
            offset: 4377,
            expected: 5,
            actual: 2,
        };
        assert_eq!(err.kind(), ErrorKind::TruncatedArchive);
        assert_eq!(err.offset(), Some(4377));
    }

    #[test]
    fn io_error_display() {
        let wrap = wrap_io_err!("some/file", "Open");
        let err = wrap(io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(err.to_string(), "Open: some/file");
        assert_eq!(err.kind(), ErrorKind::Filesystem);
        assert!(format!("{:?}", err).contains("Caused by"));

        let wrap = wrap_io_err!("Read header");
        let err = wrap(io::Error::from(io::ErrorKind::Other));
        assert_eq!(err.to_string(), "Read header");
    }
}
