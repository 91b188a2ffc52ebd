//! Extension traits for base types defined in `wpress-core`, and the I/O
//! helpers shared by the reader and writer.
use std::io::{self, Read, Write};
use std::path::{Component, Path};

use wpress_core::Entry;

use crate::Error;

pub trait EntryExt {
    fn check_path(&self) -> Result<&Path, Error>;
}

impl EntryExt for Entry {
    /// Iterate the components of the path and ensure that it stays beneath
    /// the directory it is extracted into.
    fn check_path(&self) -> Result<&Path, Error> {
        let path = Path::new(&self.path);
        for component in path.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                invalid => {
                    let bad_component: &Path = invalid.as_ref();
                    return Err(Error::InvalidPath {
                        entry: path.to_path_buf(),
                        component: bad_component.to_path_buf(),
                    });
                }
            }
        }
        Ok(path)
    }
}

/// Copy `read` to `write` through `buf` until `read` is exhausted, returning
/// the number of bytes copied.
pub(crate) fn copy_buf<R: Read, W: Write>(
    mut read: R,
    mut write: W,
    buf: &mut [u8],
) -> io::Result<u64> {
    let mut total = 0;
    loop {
        let count = match read.read(buf) {
            Ok(0) => break,
            Ok(count) => count,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        write.write_all(&buf[..count])?;
        total += count as u64;
    }
    Ok(total)
}

/// Copy at most `len` bytes of `read` to `write`. Returns the length of
/// `read` as observed: less than `len` if it ended early, `len + 1` if bytes
/// remain past `len`. Nothing past `len` is written.
pub(crate) fn copy_exact<R: Read, W: Write>(
    mut read: R,
    write: W,
    buf: &mut [u8],
    len: u64,
) -> io::Result<u64> {
    let copied = copy_buf((&mut read).take(len), write, buf)?;
    if copied < len {
        return Ok(copied);
    }
    let extra = read_full(&mut read, &mut [0u8; 1])?;
    Ok(copied + extra as u64)
}

/// Like `read_exact`, but a short read at end of stream is reported as the
/// number of bytes filled instead of an error.
pub(crate) fn read_full<R: Read>(read: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match read.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(count) => filled += count,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}
