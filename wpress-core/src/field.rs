//! Bounds-checked access to the fixed-width, NUL-padded header fields
use core::fmt::{self, Display};
use core::str;

use crate::{Error, CONTENT_SIZE, MTIME_SIZE, NAME_SIZE, PREFIX_SIZE};

/// The four fields of a header, in on-disk order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Name,
    Size,
    Mtime,
    Prefix,
}

impl Field {
    pub const fn width(self) -> usize {
        match self {
            Field::Name => NAME_SIZE,
            Field::Size => CONTENT_SIZE,
            Field::Mtime => MTIME_SIZE,
            Field::Prefix => PREFIX_SIZE,
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Name => "filename",
            Field::Size => "content size",
            Field::Mtime => "modification time",
            Field::Prefix => "prefix",
        })
    }
}

/// Copy `value` into `dst` and zero the rest of the field
pub(crate) fn write_bytes(field: Field, dst: &mut [u8], value: &[u8]) -> Result<(), Error> {
    if value.len() > dst.len() {
        return Err(Error::FieldOverflow {
            field,
            len: value.len(),
        });
    }
    dst[..value.len()].copy_from_slice(value);
    dst[value.len()..].fill(0);
    Ok(())
}

/// Write `value` as ASCII decimal digits
pub(crate) fn write_decimal(field: Field, dst: &mut [u8], value: u64) -> Result<(), Error> {
    // u64::MAX is 20 digits
    let mut digits = [0u8; 20];
    let mut start = digits.len();
    let mut rest = value;
    loop {
        start -= 1;
        digits[start] = b'0' + (rest % 10) as u8;
        rest /= 10;
        if rest == 0 {
            break;
        }
    }
    write_bytes(field, dst, &digits[start..])
}

/// Field contents without the trailing NUL padding
pub(crate) fn trim_nul(src: &[u8]) -> &[u8] {
    let end = src.iter().rposition(|&b| b != 0).map_or(0, |last| last + 1);
    &src[..end]
}

pub(crate) fn read_text(field: Field, src: &[u8]) -> Result<&str, Error> {
    str::from_utf8(trim_nul(src)).map_err(|source| Error::InvalidUtf8 { field, source })
}

pub(crate) fn read_decimal(field: Field, src: &[u8]) -> Result<u64, Error> {
    let digits = trim_nul(src);
    if digits.is_empty() {
        return Err(Error::InvalidDigits(field));
    }
    digits.iter().try_fold(0u64, |acc, &b| {
        if !b.is_ascii_digit() {
            return Err(Error::InvalidDigits(field));
        }
        acc.checked_mul(10)
            .and_then(|acc| acc.checked_add(u64::from(b - b'0')))
            .ok_or(Error::InvalidDigits(field))
    })
}
