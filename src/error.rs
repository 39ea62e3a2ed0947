use std::fmt;
use std::io;

/// Where in the input an error was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// A named fixed field, e.g. a load option header field.
    Field(&'static str),
    /// Zero-based index of a device path record within its list. The
    /// end-of-path sentinel counts as a record.
    Node(usize),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Location::Field(name) => write!(f, "field {}", name),
            Location::Node(index) => write!(f, "node #{}", index),
        }
    }
}

#[derive(Debug)]
pub enum Error {
    /// The input ended before a declared length was satisfied.
    TruncatedInput {
        location:   Location,
        offset:     u64,
    },
    /// A registered decoder rejected the body of a record.
    UnsupportedVariantBody {
        location:   Location,
        device_type: u8,
        sub_type:   u8,
        message:    String,
    },
    /// A declared length does not match what was consumed or produced.
    LengthMismatch {
        location:   Location,
        declared:   u64,
        actual:     u64,
    },
    /// Underlying reader or writer failure.
    Io {
        location:   Location,
        source:     binrw::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn location(&self) -> Location {
        match self {
            Error::TruncatedInput { location, .. }
            | Error::UnsupportedVariantBody { location, .. }
            | Error::LengthMismatch { location, .. }
            | Error::Io { location, .. } => *location,
        }
    }

    /// Sorts a binrw failure into one of the codec error kinds. `offset` is
    /// the stream position the failed read started at.
    pub(crate) fn from_binrw(
        err: binrw::Error, location: Location, offset: u64, tag: (u8, u8),
    ) -> Self {
        if err.is_eof() {
            return Error::TruncatedInput { location, offset };
        }
        match err {
            binrw::Error::AssertFail { message, .. } => {
                Error::UnsupportedVariantBody {
                    location,
                    device_type: tag.0,
                    sub_type: tag.1,
                    message,
                }
            }
            source => Error::Io { location, source },
        }
    }

    pub(crate) fn io(err: io::Error, location: Location) -> Self {
        Error::Io { location, source: binrw::Error::Io(err) }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::TruncatedInput { location, offset } => {
                write!(f, "{}: input truncated at offset {:#x}",
                    location, offset)
            }
            Error::UnsupportedVariantBody {
                location, device_type, sub_type, message,
            } => {
                write!(f, "{}: unsupported body for device path {:#x}/{:#x}: {}",
                    location, device_type, sub_type, message)
            }
            Error::LengthMismatch { location, declared, actual } => {
                write!(f, "{}: declared length {} does not match actual \
                    length {}", location, declared, actual)
            }
            Error::Io { location, source } => {
                write!(f, "{}: {}", location, source)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
