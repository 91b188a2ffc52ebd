use core::fmt::{self, Display};

use alloc::string::String;

use crate::{Error, Header, NO_PREFIX};

/// Decoded metadata of one archive entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    /// Relative path of the file, `/` separated
    pub path: String,
    /// Size in bytes of the payload
    pub size: u64,
    /// Modification time in seconds since the Unix epoch
    pub mtime: u64,
}

impl Entry {
    pub fn new(path: impl Into<String>, size: u64, mtime: u64) -> Entry {
        Entry {
            path: path.into(),
            size,
            mtime,
        }
    }

    /// Split the path into the directory prefix and base name stored in the
    /// header. A path without a directory gets the prefix `.`. Trailing
    /// separators are dropped from the prefix unless it is made of nothing
    /// else, so `a//b` gives `a` while `//b` keeps `//`.
    pub fn split(&self) -> (&str, &str) {
        match self.path.rfind('/') {
            Some(index) => {
                let (dir, name) = self.path.split_at(index + 1);
                let trimmed = dir.trim_end_matches('/');
                let prefix = if trimmed.is_empty() { dir } else { trimmed };
                (prefix, name)
            }
            None => (NO_PREFIX, self.path.as_str()),
        }
    }

    /// Encode this entry as a header block
    pub fn header(&self) -> Result<Header, Error> {
        let (prefix, name) = self.split();
        Header::new(name, prefix, self.size, self.mtime)
    }
}

impl Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "path={:?} size={} mtime={}",
            self.path, self.size, self.mtime
        )
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;

    use super::*;
    use crate::{Field, HEADER_SIZE};

    #[test]
    fn split_paths() {
        assert_eq!(Entry::new("a.txt", 0, 0).split(), (".", "a.txt"));
        assert_eq!(Entry::new("sub/b.txt", 0, 0).split(), ("sub", "b.txt"));
        assert_eq!(Entry::new("x/y/z.rs", 0, 0).split(), ("x/y", "z.rs"));
        assert_eq!(Entry::new("./a.txt", 0, 0).split(), (".", "a.txt"));
        assert_eq!(Entry::new("a//b", 0, 0).split(), ("a", "b"));
        assert_eq!(Entry::new("/a", 0, 0).split(), ("/", "a"));
        assert_eq!(Entry::new("//a", 0, 0).split(), ("//", "a"));
        assert_eq!(Entry::new("///a/b", 0, 0).split(), ("///a", "b"));
        assert_eq!(Entry::new("dir/", 0, 0).split(), ("dir", ""));
    }

    #[test]
    fn header_round_trip() {
        for path in ["a.txt", "sub/b.txt", "deep/er/path/ünïcode.bin"] {
            let entry = Entry::new(path, 1234, 1_700_000_000);
            let header = entry.header().unwrap();
            assert_eq!(header.as_bytes().len(), HEADER_SIZE);
            assert_eq!(Header::parse(header.as_bytes()).unwrap().entry().unwrap(), entry);
        }
    }

    #[test]
    fn directory_only_path_has_no_name() {
        assert!(matches!(
            Entry::new("dir/", 0, 0).header(),
            Err(Error::EmptyField(Field::Name))
        ));
    }

    #[test]
    fn display() {
        let entry = Entry::new("sub/b.txt", 6, 1_700_000_100);
        assert_eq!(
            format!("{}", entry),
            "path=\"sub/b.txt\" size=6 mtime=1700000100"
        );
    }
}
