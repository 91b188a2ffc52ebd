//! The packed struct represents the on-disk format of a wpress header
use core::fmt;

use alloc::format;
use alloc::string::ToString;
use bytemuck::{Pod, Zeroable};

use crate::field::{read_decimal, read_text, write_bytes, write_decimal};
use crate::{Entry, Error, Field, CONTENT_SIZE, MTIME_SIZE, NAME_SIZE, NO_PREFIX, PREFIX_SIZE};

#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C, packed)]
pub struct Header {
    /// Base name of the file, UTF-8
    pub name: [u8; NAME_SIZE],
    /// Size in bytes of the payload following this header, ASCII decimal
    pub size: [u8; CONTENT_SIZE],
    /// Modification time in seconds since the Unix epoch, ASCII decimal
    pub mtime: [u8; MTIME_SIZE],
    /// Directory of the file, UTF-8, `.` when there is none
    pub prefix: [u8; PREFIX_SIZE],
}

impl Header {
    /// Build a header from its field values. Every field is NUL padded and
    /// values that do not fit are rejected.
    pub fn new(name: &str, prefix: &str, size: u64, mtime: u64) -> Result<Header, Error> {
        if name.is_empty() {
            return Err(Error::EmptyField(Field::Name));
        }
        let prefix = if prefix.is_empty() { NO_PREFIX } else { prefix };

        let mut header = Header::zeroed();
        write_bytes(Field::Name, &mut header.name, name.as_bytes())?;
        write_decimal(Field::Size, &mut header.size, size)?;
        write_decimal(Field::Mtime, &mut header.mtime, mtime)?;
        write_bytes(Field::Prefix, &mut header.prefix, prefix.as_bytes())?;
        Ok(header)
    }

    /// View a raw block as a header. Only the length is checked; the field
    /// accessors validate contents.
    pub fn parse(data: &[u8]) -> Result<&Header, Error> {
        Ok(bytemuck::try_from_bytes(data)?)
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    pub fn name(&self) -> Result<&str, Error> {
        read_text(Field::Name, &self.name)
    }

    pub fn prefix(&self) -> Result<&str, Error> {
        read_text(Field::Prefix, &self.prefix)
    }

    pub fn size(&self) -> Result<u64, Error> {
        read_decimal(Field::Size, &self.size)
    }

    pub fn mtime(&self) -> Result<u64, Error> {
        read_decimal(Field::Mtime, &self.mtime)
    }

    /// Decode all fields, joining prefix and name into the entry path
    pub fn entry(&self) -> Result<Entry, Error> {
        let name = self.name()?;
        if name.is_empty() {
            return Err(Error::EmptyField(Field::Name));
        }
        let prefix = self.prefix()?;
        if prefix.is_empty() {
            return Err(Error::EmptyField(Field::Prefix));
        }

        let path = if prefix == NO_PREFIX {
            name.to_string()
        } else if prefix.ends_with('/') {
            format!("{}{}", prefix, name)
        } else {
            format!("{}/{}", prefix, name)
        };

        Ok(Entry {
            path,
            size: self.size()?,
            mtime: self.mtime()?,
        })
    }
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Header")
            .field("name", &self.name())
            .field("size", &self.size())
            .field("mtime", &self.mtime())
            .field("prefix", &self.prefix())
            .finish()
    }
}
