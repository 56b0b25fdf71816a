//
// Copyright 2026 biplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

use std;
use std::fmt::{self, Display};

use serde::{de, ser};

pub type Result<T> = std::result::Result<T, Error>;

/// Binary property list serialization and deserialization error.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Constructed from serialization and deserialization errors.
    Message(String),
    /// The buffer does not begin with the `bplist0` signature.
    ///
    /// This is the only recoverable error: the data may well be a valid
    /// property list in another representation, and the caller is free to
    /// hand the same buffer to a text plist codec.
    NotBinaryPlist,
    /// A structural violation was found while decoding. Fatal to the call.
    Format(FormatError),
    /// A value presented for encoding has no binary plist representation.
    UnsupportedType(&'static str),
    /// An invariant the writer relies on was violated. This is a
    /// programming-error-class fault, not a data error.
    InternalInconsistency(&'static str),
}

/// The structural violations the reader can encounter.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FormatError {
    /// The buffer is too short to contain a header and trailer.
    Truncated,
    /// The trailer could not be parsed or describes impossible widths.
    InvalidTrailer,
    /// The offset table is missing, short, or overlaps the trailer.
    InvalidOffsetTable,
    /// Encountered a reference to an object not in the offset table.
    InvalidObjectReference,
    /// Encountered an offset to a point outside the object table.
    InvalidOffsetToObject,
    /// Encountered a marker byte or payload not valid for any object
    /// format, including malformed variable-length counts.
    InvalidObjectFormat,
    /// An ASCII string object contains non-ASCII bytes.
    InvalidAsciiString,
    /// A UTF-16 string object contains an invalid code unit sequence.
    InvalidUtf16String,
    /// A UID object is wider than the 8 bytes this library can represent.
    InvalidUid,
    /// Binary property lists are acyclic; an object reached itself.
    CycleDetected,
}

impl Error {
    /// Returns true when the caller may retry the same buffer with a
    /// different codec, which is the case only when the binary signature
    /// was absent.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::NotBinaryPlist => true,
            _ => false,
        }
    }
}

impl From<FormatError> for Error {
    fn from(e: FormatError) -> Self {
        Error::Format(e)
    }
}

impl ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Message(msg) =>
                formatter.write_str(msg),
            Error::NotBinaryPlist =>
                formatter.write_str("missing bplist signature"),
            Error::Format(e) =>
                write!(formatter, "invalid bplist: {}", e),
            Error::UnsupportedType(what) =>
                write!(formatter, "unsupported type: {}", what),
            Error::InternalInconsistency(what) =>
                write!(formatter, "internal inconsistency: {}", what),
        }
    }
}

impl Display for FormatError {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FormatError::Truncated =>
                formatter.write_str("buffer too short for header and trailer"),
            FormatError::InvalidTrailer =>
                formatter.write_str("missing or invalid trailer"),
            FormatError::InvalidOffsetTable =>
                formatter.write_str("missing or invalid offset table"),
            FormatError::InvalidObjectReference =>
                formatter.write_str("reference to object not in offset table"),
            FormatError::InvalidOffsetToObject =>
                formatter.write_str("offset to a point outside the object table"),
            FormatError::InvalidObjectFormat =>
                formatter.write_str("invalid or unsupported object format"),
            FormatError::InvalidAsciiString =>
                formatter.write_str("expected ASCII string"),
            FormatError::InvalidUtf16String =>
                formatter.write_str("expected UTF-16 string"),
            FormatError::InvalidUid =>
                formatter.write_str("UID wider than 8 bytes"),
            FormatError::CycleDetected =>
                formatter.write_str("cycle detected"),
        }
    }
}

impl std::error::Error for Error {}
