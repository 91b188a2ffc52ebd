#![no_std]
extern crate alloc;

use core::mem;

pub use crate::entry::Entry;
pub use crate::error::Error;
pub use crate::field::Field;
pub use crate::header::Header;

mod entry;
mod error;
mod field;
mod header;

/// Width of the file name field
pub const NAME_SIZE: usize = 255;
/// Width of the content size field
pub const CONTENT_SIZE: usize = 14;
/// Width of the modification time field
pub const MTIME_SIZE: usize = 12;
/// Width of the directory prefix field
pub const PREFIX_SIZE: usize = 4096;

pub const HEADER_SIZE: usize = mem::size_of::<Header>();

/// Header-sized block of zeros that terminates every archive
pub const EOF_BLOCK: [u8; HEADER_SIZE] = [0; HEADER_SIZE];

/// Prefix stored for entries without a directory component
pub const NO_PREFIX: &str = ".";

/// Check whether `block` is the end of archive marker
pub fn is_eof(block: &[u8]) -> bool {
    block.len() == HEADER_SIZE && block.iter().all(|&b| b == 0)
}

/// Decode a header block into the entry it describes
pub fn decode(block: &[u8]) -> Result<Entry, Error> {
    Header::parse(block)?.entry()
}
