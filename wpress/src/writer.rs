use std::fmt;
use std::fs::{self, File, Metadata};
use std::io::Write;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use log::{debug, info, warn};
use wpress_core::{Entry, Header, EOF_BLOCK};

use crate::ext::copy_exact;
use crate::{wrap_io_err, Error, READ_WRITE_BUF_SIZE};

/// Describe the file at `source`, to be stored in the archive as `path`
fn file_entry(path: &Path, source: &Path, metadata: &Metadata) -> Result<Entry, Error> {
    let stored = path.to_str().ok_or_else(|| Error::NonUtf8Path {
        path: path.to_path_buf(),
    })?;

    let mtime = metadata
        .modified()
        .map_err(wrap_io_err!(source, "Read modification time"))?
        .duration_since(UNIX_EPOCH)
        .map_err(|_| Error::MtimeOutOfRange {
            path: path.to_path_buf(),
        })?
        .as_secs();

    Ok(Entry::new(stored, metadata.len(), mtime))
}

/// Reject a path that could not be stored in a header before anything is
/// read from it.
fn check_fits(path: &Path) -> Result<(), Error> {
    let stored = path.to_str().ok_or_else(|| Error::NonUtf8Path {
        path: path.to_path_buf(),
    })?;
    match Entry::new(stored, 0, 0).header() {
        Err(source) if source.is_overflow() => Err(Error::Entry {
            path: path.to_path_buf(),
            source,
        }),
        _ => Ok(()),
    }
}

/// Build the header for the regular file at `path`, from its size and
/// modification time. `path` is stored as given.
pub fn encode(path: impl AsRef<Path>) -> Result<Header, Error> {
    let path = path.as_ref();
    let metadata = fs::metadata(path).map_err(wrap_io_err!(path, "Stat"))?;
    if !metadata.is_file() {
        return Err(Error::Unsupported {
            path: path.to_path_buf(),
        });
    }

    file_entry(path, path, &metadata)?
        .header()
        .map_err(|source| Error::Entry {
            path: path.to_path_buf(),
            source,
        })
}

/// Streams files into an archive. Each appended file is written as a header
/// followed by its content; [`ArchiveWriter::finish`] terminates the archive.
///
/// Paths given to the `append_*` methods are stored in the archive exactly as
/// given, and are read from beneath the writer's base directory.
///
/// # Example
/// ```no_run
/// use std::fs::File;
///
/// use wpress::ArchiveWriter;
///
/// let archive = File::create("site.wpress")?;
///
/// let mut writer = ArchiveWriter::new(archive);
/// writer.append_path("wp-content")?
///     .append_file("package.json")?;
/// writer.finish()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct ArchiveWriter<W: Write> {
    writer: W,
    base: PathBuf,
    buf: Vec<u8>,
    count: usize,
    /// Device and inode of a file never to be appended
    exclude: Option<(u64, u64)>,
}

impl<W: Write> ArchiveWriter<W> {
    /// Write to `writer`, reading files relative to the working directory
    pub fn new(writer: W) -> ArchiveWriter<W> {
        ArchiveWriter::with_base(writer, PathBuf::new())
    }

    /// Write to `writer`, reading files relative to `base`
    pub fn with_base(writer: W, base: impl AsRef<Path>) -> ArchiveWriter<W> {
        ArchiveWriter {
            writer,
            base: base.as_ref().to_path_buf(),
            buf: vec![0; READ_WRITE_BUF_SIZE],
            count: 0,
            exclude: None,
        }
    }

    /// Skip the file described by `metadata` wherever it is found, typically
    /// the archive being written.
    pub fn exclude(&mut self, metadata: &Metadata) -> &mut ArchiveWriter<W> {
        self.exclude = Some((metadata.dev(), metadata.ino()));
        self
    }

    /// Number of entries written so far
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Append a regular file, or every regular file beneath a directory.
    pub fn append_path(&mut self, path: impl AsRef<Path>) -> Result<&mut ArchiveWriter<W>, Error> {
        let path = path.as_ref();
        check_fits(path)?;
        let source = self.base.join(path);
        let metadata = fs::metadata(&source).map_err(wrap_io_err!(source, "Stat"))?;

        if metadata.is_dir() {
            self.append_dir(path)?;
        } else if metadata.is_file() {
            self.append_entry(path, &source, &metadata)?;
        } else {
            return Err(Error::Unsupported {
                path: path.to_path_buf(),
            });
        }
        Ok(self)
    }

    /// Append a single regular file.
    pub fn append_file(&mut self, path: impl AsRef<Path>) -> Result<&mut ArchiveWriter<W>, Error> {
        let path = path.as_ref();
        check_fits(path)?;
        let source = self.base.join(path);
        let metadata = fs::metadata(&source).map_err(wrap_io_err!(source, "Stat"))?;

        if !metadata.is_file() {
            return Err(Error::Unsupported {
                path: path.to_path_buf(),
            });
        }
        self.append_entry(path, &source, &metadata)?;
        Ok(self)
    }

    /// Recursive helper to walk a directory. Children are visited in file
    /// name order so the same tree always produces the same archive.
    fn append_dir(&mut self, dir: &Path) -> Result<(), Error> {
        let current = self.base.join(dir);

        let mut read_dir = Vec::new();
        for entry_res in fs::read_dir(&current).map_err(wrap_io_err!(current, "Read directory"))? {
            read_dir.push(entry_res.map_err(wrap_io_err!(current, "Read directory"))?);
        }
        read_dir.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        for dir_entry in read_dir {
            let path = dir.join(dir_entry.file_name());
            let source = dir_entry.path();
            let file_type = dir_entry
                .file_type()
                .map_err(wrap_io_err!(source, "Stat"))?;

            if file_type.is_dir() {
                self.append_dir(&path)?;
                continue;
            }

            // Symlinks are followed, but only to regular files
            let metadata = fs::metadata(&source).map_err(wrap_io_err!(source, "Stat"))?;
            if metadata.is_file() {
                self.append_entry(&path, &source, &metadata)?;
            } else {
                warn!("Skipping {}: not a regular file", source.display());
            }
        }
        Ok(())
    }

    fn append_entry(&mut self, path: &Path, source: &Path, metadata: &Metadata) -> Result<(), Error> {
        if self.exclude == Some((metadata.dev(), metadata.ino())) {
            warn!("Skipping {}: excluded from the archive", source.display());
            return Ok(());
        }

        let entry = file_entry(path, source, metadata)?;
        let header = entry.header().map_err(|source| Error::Entry {
            path: path.to_path_buf(),
            source,
        })?;

        // Open before writing anything so an unreadable file leaves no header
        let file = File::open(source).map_err(wrap_io_err!(source, "Open source file"))?;

        self.writer
            .write_all(header.as_bytes())
            .map_err(wrap_io_err!("Write header"))?;
        // Never write more than the header declares, even if the file grows
        let actual = copy_exact(file, &mut self.writer, &mut self.buf, entry.size)
            .map_err(wrap_io_err!(source, "Copy source file"))?;

        if actual != entry.size {
            return Err(Error::LengthMismatch {
                entry: path.to_path_buf(),
                actual,
                expected: entry.size,
            });
        }

        debug!("Appended {}", entry);
        self.count += 1;
        Ok(())
    }

    /// Write the end of archive block and return the inner writer.
    pub fn finish(mut self) -> Result<W, Error> {
        self.writer
            .write_all(&EOF_BLOCK)
            .map_err(wrap_io_err!("Write end of archive"))?;
        self.writer.flush().map_err(wrap_io_err!("Flush archive"))?;

        info!("Wrote {} entries", self.count);
        Ok(self.writer)
    }
}

impl<W: Write> fmt::Debug for ArchiveWriter<W> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ArchiveWriter")
            .field("base", &self.base)
            .field("count", &self.count)
            .finish()
    }
}
