use std::error::Error;
use std::ffi::OsStr;
use std::fs;
use std::io::Cursor;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};

use wpress::{ArchiveReader, ArchiveWriter, ErrorKind};

#[test]
fn writer_streams_to_memory() -> Result<(), Box<dyn Error>> {
    let tmp = tempfile::tempdir()?;
    fs::write(tmp.path().join("one"), b"1")?;
    fs::create_dir(tmp.path().join("dir"))?;
    fs::write(tmp.path().join("dir/two"), b"22")?;

    let mut writer = ArchiveWriter::with_base(Vec::new(), tmp.path());
    writer.append_file("one")?.append_path("dir")?;
    assert_eq!(writer.count(), 2);
    let archive = writer.finish()?;

    let mut reader = ArchiveReader::new(Cursor::new(archive));
    let mut found = Vec::new();
    while let Some(entry) = reader.next_entry()? {
        let mut contents = Vec::new();
        reader.copy_payload(&mut contents)?;
        assert_eq!(contents.len() as u64, entry.size);
        found.push((entry.path, contents));
    }
    assert_eq!(
        found,
        vec![
            ("one".to_string(), b"1".to_vec()),
            ("dir/two".to_string(), b"22".to_vec()),
        ]
    );
    Ok(())
}

#[test]
fn non_utf8_name_writes_nothing() -> Result<(), Box<dyn Error>> {
    let tmp = tempfile::tempdir()?;
    let name = OsStr::from_bytes(b"bad\xffname");
    fs::write(tmp.path().join(name), b"data")?;

    let mut writer = ArchiveWriter::with_base(Vec::new(), tmp.path());
    let err = writer.append_file(name).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPath);
    assert!(writer.get_ref().is_empty());
    Ok(())
}

#[test]
fn directories_are_not_files() -> Result<(), Box<dyn Error>> {
    let tmp = tempfile::tempdir()?;
    fs::create_dir(tmp.path().join("dir"))?;

    let mut writer = ArchiveWriter::with_base(Vec::new(), tmp.path());
    let err = writer.append_file("dir").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPath);
    assert!(writer.get_ref().is_empty());
    Ok(())
}

#[test]
fn symlinks_to_files_are_followed() -> Result<(), Box<dyn Error>> {
    let tmp = tempfile::tempdir()?;
    fs::create_dir(tmp.path().join("tree"))?;
    fs::create_dir(tmp.path().join("elsewhere"))?;
    fs::write(tmp.path().join("elsewhere/target"), b"target")?;
    std::os::unix::fs::symlink("../elsewhere/target", tmp.path().join("tree/link"))?;
    std::os::unix::fs::symlink("../elsewhere", tmp.path().join("tree/dirlink"))?;

    let mut writer = ArchiveWriter::with_base(Vec::new(), tmp.path());
    writer.append_path("tree")?;
    let archive = writer.finish()?;

    let mut reader = ArchiveReader::new(&archive[..]);
    let entry = reader.next_entry()?.expect("link entry");
    assert_eq!(entry.path, "tree/link");
    assert_eq!(entry.size, 6);
    assert!(reader.next_entry()?.is_none());
    Ok(())
}

#[test]
fn empty_archive_is_one_block() -> Result<(), Box<dyn Error>> {
    let archive = ArchiveWriter::new(Vec::new()).finish()?;
    assert_eq!(archive.len(), wpress::HEADER_SIZE);
    assert!(archive.iter().all(|&b| b == 0));

    let mut reader = ArchiveReader::new(&archive[..]);
    assert!(reader.next_entry()?.is_none());
    Ok(())
}

#[test]
fn encode_reads_metadata() -> Result<(), Box<dyn Error>> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("site.sql");
    let file = fs::File::create(&path)?;
    fs::write(&path, b"SELECT 1;")?;
    file.set_modified(UNIX_EPOCH + Duration::from_secs(1_700_000_000))?;

    let header = wpress::encode(&path)?;
    assert_eq!(header.as_bytes().len(), wpress::HEADER_SIZE);
    assert_eq!(header.name()?, "site.sql");
    assert_eq!(header.prefix()?, tmp.path().to_str().unwrap());
    assert_eq!(header.size()?, 9);
    assert_eq!(header.mtime()?, 1_700_000_000);

    let err = wpress::encode(tmp.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPath);
    Ok(())
}

#[test]
fn overlong_paths_write_nothing() -> Result<(), Box<dyn Error>> {
    let tmp = tempfile::tempdir()?;
    let deep: PathBuf = (0..15).map(|_| "d".repeat(200)).collect();
    fs::create_dir_all(tmp.path().join(&deep))?;
    fs::write(tmp.path().join(&deep).join("f"), b"data")?;

    let mut writer = ArchiveWriter::with_base(Vec::new(), tmp.path());
    writer.append_path(&deep)?;
    assert_eq!(writer.count(), 1);

    // The same directory, named so that its prefix exceeds 4096 bytes
    let padded = Path::new(&"./".repeat(700)).join(&deep);
    assert!(padded.to_str().unwrap().len() > 4096);

    let mut writer = ArchiveWriter::with_base(Vec::new(), tmp.path());
    let err = writer.append_path(&padded).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FieldOverflow);
    assert!(writer.get_ref().is_empty());

    let err = writer.append_path(padded.join("f")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FieldOverflow);

    // A name longer than the name field
    let err = writer.append_file("n".repeat(300)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FieldOverflow);
    assert!(writer.get_ref().is_empty());
    assert_eq!(writer.count(), 0);
    Ok(())
}
