use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use wpress_core::Entry;

use crate::{wrap_io_err, ArchiveReader, ArchiveWriter, Error};

/// Create an archive at `archive_path` from files and directories named
/// relative to the working directory.
pub fn create<P>(archive_path: impl AsRef<Path>, entries: impl IntoIterator<Item = P>) -> Result<usize, Error>
where
    P: AsRef<Path>,
{
    create_in("", archive_path, entries)
}

/// Create an archive at `archive_path` from files and directories named
/// relative to `base_dir`. The names are stored as given.
pub fn create_in<P>(
    base_dir: impl AsRef<Path>,
    archive_path: impl AsRef<Path>,
    entries: impl IntoIterator<Item = P>,
) -> Result<usize, Error>
where
    P: AsRef<Path>,
{
    let archive_path = archive_path.as_ref();
    let archive_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(archive_path)
        .map_err(wrap_io_err!(archive_path, "Create archive"))?;

    let archive_metadata = archive_file
        .metadata()
        .map_err(wrap_io_err!(archive_path, "Stat archive"))?;

    let mut writer = ArchiveWriter::with_base(BufWriter::new(archive_file), base_dir);
    writer.exclude(&archive_metadata);
    for entry in entries {
        writer.append_path(entry)?;
    }
    let count = writer.count();

    writer
        .finish()?
        .into_inner()
        .map_err(|err| err.into_error())
        .map_err(wrap_io_err!(archive_path, "Write archive"))?
        .sync_all()
        .map_err(wrap_io_err!(archive_path, "Sync archive"))?;
    Ok(count)
}

/// Extract every entry of the archive at `archive_path` beneath `base_dir`.
pub fn extract(archive_path: impl AsRef<Path>, base_dir: impl AsRef<Path>) -> Result<usize, Error> {
    let archive_path = archive_path.as_ref();
    let archive_file = File::open(archive_path).map_err(wrap_io_err!(archive_path, "Open archive"))?;

    ArchiveReader::new(BufReader::new(archive_file)).unpack(base_dir)
}

/// Read the headers of the archive at `archive_path` without extracting.
pub fn list(archive_path: impl AsRef<Path>) -> Result<Vec<Entry>, Error> {
    let archive_path = archive_path.as_ref();
    let archive_file = File::open(archive_path).map_err(wrap_io_err!(archive_path, "Open archive"))?;

    let mut reader = ArchiveReader::new(BufReader::new(archive_file));
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry()? {
        entries.push(entry);
    }
    Ok(entries)
}
