use std::fmt;
use std::fs::{DirBuilder, FileTimes, OpenOptions, Permissions};
use std::io::{self, Read, Write};
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt, PermissionsExt};
use std::path::Path;
use std::time::{Duration, UNIX_EPOCH};

use log::{debug, info};
use wpress_core::{Entry, HEADER_SIZE};

use crate::ext::{copy_buf, read_full, EntryExt};
use crate::{wrap_io_err, Error, READ_WRITE_BUF_SIZE};

const DIR_MODE: u32 = 0o755;
const FILE_MODE: u32 = 0o644;

/// Reads an archive one entry at a time.
///
/// [`ArchiveReader::next_entry`] yields each header in order and returns
/// `None` once the end of archive block is reached. The payload of the
/// current entry can be consumed with [`ArchiveReader::copy_payload`]; it is
/// skipped automatically otherwise.
pub struct ArchiveReader<R: Read> {
    reader: R,
    /// Bytes consumed from `reader`
    offset: u64,
    /// Payload bytes of the current entry not yet consumed
    pending: u64,
    done: bool,
    buf: Vec<u8>,
}

impl<R: Read> ArchiveReader<R> {
    pub fn new(reader: R) -> ArchiveReader<R> {
        ArchiveReader {
            reader,
            offset: 0,
            pending: 0,
            done: false,
            buf: vec![0; READ_WRITE_BUF_SIZE],
        }
    }

    /// Position in the archive stream
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Read the next header. Returns `Ok(None)` at the end of the archive,
    /// and on every call after that.
    pub fn next_entry(&mut self) -> Result<Option<Entry>, Error> {
        if self.done {
            return Ok(None);
        }
        if self.pending > 0 {
            self.skip_payload()?;
        }

        let offset = self.offset;
        let mut block = [0; HEADER_SIZE];
        let count = read_full(&mut self.reader, &mut block).map_err(wrap_io_err!("Read header"))?;
        self.offset += count as u64;

        if count != HEADER_SIZE {
            return Err(Error::Truncated {
                offset,
                expected: HEADER_SIZE as u64,
                actual: count as u64,
            });
        }

        if wpress_core::is_eof(&block) {
            debug!("End of archive at offset {}", offset);
            self.done = true;
            return Ok(None);
        }

        let entry =
            wpress_core::decode(&block).map_err(|source| Error::Header { offset, source })?;

        self.pending = entry.size;
        Ok(Some(entry))
    }

    /// Copy the payload of the current entry to `writer`, in chunks.
    pub fn copy_payload<W: Write>(&mut self, writer: W) -> Result<u64, Error> {
        let offset = self.offset;
        let expected = self.pending;
        self.pending = 0;

        let copied = copy_buf((&mut self.reader).take(expected), writer, &mut self.buf)
            .map_err(wrap_io_err!("Copy payload"))?;
        self.offset += copied;

        if copied != expected {
            return Err(Error::Truncated {
                offset,
                expected,
                actual: copied,
            });
        }
        Ok(copied)
    }

    /// Discard the payload of the current entry
    pub fn skip_payload(&mut self) -> Result<u64, Error> {
        self.copy_payload(io::sink())
    }

    /// Extract every remaining entry beneath `base_dir`, returning the number
    /// of files written.
    pub fn unpack(&mut self, base_dir: impl AsRef<Path>) -> Result<usize, Error> {
        let base_dir = base_dir.as_ref();
        let mut count = 0;
        while let Some(entry) = self.next_entry()? {
            self.unpack_entry(&entry, base_dir)?;
            count += 1;
        }
        info!("Extracted {} entries to {}", count, base_dir.display());
        Ok(count)
    }

    fn unpack_entry(&mut self, entry: &Entry, base_dir: &Path) -> Result<(), Error> {
        let relative_path = entry.check_path()?;
        let target_path = base_dir.join(relative_path);

        if let Some(parent) = target_path.parent() {
            if !parent.as_os_str().is_empty() {
                DirBuilder::new()
                    .recursive(true)
                    .mode(DIR_MODE)
                    .create(parent)
                    .map_err(wrap_io_err!(parent, "Create directory"))?;
            }
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(FILE_MODE)
            .open(&target_path)
            .map_err(wrap_io_err!(target_path, "Create file"))?;

        self.copy_payload(&mut file)?;

        // The mode passed to open is masked by the umask and ignored for
        // files that already existed
        file.set_permissions(Permissions::from_mode(FILE_MODE))
            .map_err(wrap_io_err!(target_path, "Set permissions"))?;

        let mtime = UNIX_EPOCH
            .checked_add(Duration::from_secs(entry.mtime))
            .ok_or_else(|| Error::MtimeOutOfRange {
                path: relative_path.to_path_buf(),
            })?;
        file.set_times(FileTimes::new().set_accessed(mtime).set_modified(mtime))
            .map_err(wrap_io_err!(target_path, "Set modification time"))?;

        debug!("Extracted {}", entry);
        Ok(())
    }
}

impl<R: Read> fmt::Debug for ArchiveReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ArchiveReader")
            .field("offset", &self.offset)
            .field("pending", &self.pending)
            .field("done", &self.done)
            .finish()
    }
}
