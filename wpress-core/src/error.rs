use alloc::format;
use core::error;
use core::fmt::{Display, Formatter, Result};
use core::str::Utf8Error;

use bytemuck::PodCastError;

use crate::Field;

#[derive(Debug)]
pub enum Error {
    Cast(PodCastError),
    EmptyField(Field),
    FieldOverflow { field: Field, len: usize },
    InvalidDigits(Field),
    InvalidUtf8 { field: Field, source: Utf8Error },
}

impl Error {
    /// True for values that did not fit their header field when encoding
    pub fn is_overflow(&self) -> bool {
        matches!(self, Error::FieldOverflow { .. })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> Result {
        use Error::*;

        let msg = match self {
            Cast(err) => format!("Cast: {:?}", err),
            EmptyField(field) => format!("Empty {} field", field),
            FieldOverflow { field, len } => format!(
                "Field overflow: {} needs {} bytes, field holds {}",
                field,
                len,
                field.width()
            ),
            InvalidDigits(field) => format!("Invalid decimal number in {} field", field),
            InvalidUtf8 { field, .. } => format!("Invalid UTF-8 in {} field", field),
        };
        write!(f, "{}", msg)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::InvalidUtf8 { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<PodCastError> for Error {
    fn from(err: PodCastError) -> Error {
        Error::Cast(err)
    }
}
