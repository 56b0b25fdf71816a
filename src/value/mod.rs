//
// Copyright 2026 biplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # The bplist value model.
//!
//! The bplist format version 00 supports the following object kinds:
//!
//! 1. Boolean.
//! 2. Integers, up to 64 bits long.
//! 3. Real, single- and double-precision.
//! 4. Data.
//! 5. Date.
//! 6. String, 7-bit ASCII or UTF-16.
//! 7. Uid.
//! 8. Array.
//! 9. Set.
//! 10. Dictionary.
//!
//! # References
//!
//! 1. https://github.com/opensource-apple/CF/blob/master/ForFoundationOnly.h
//! 2. https://opensource.apple.com/source/CF/CF-855.17/CFBinaryPList.c

use ascii::AsciiString;
use ordered_float::OrderedFloat;

use std::collections::{BTreeMap, BTreeSet};

use crate::document::APPLE_EPOCH_OFFSET_SECONDS;

mod de;
mod ser;

pub use self::de::from_value;
pub use self::ser::to_value;

/// A date structure roughly equivalent to an `NSDate`.
///
/// The timestamp is held as seconds relative to the Unix epoch. On the wire
/// a date is a `CFAbsoluteTime`, seconds relative to the Apple reference
/// date of 1 January 2001, 00:00:00 UTC; the two conversion points below
/// are the only places the epoch offset is applied.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Date {
    timestamp: OrderedFloat<f64>,
}

impl Date {
    /// Creates a date from seconds relative to the Unix epoch.
    pub fn from_unix_timestamp(seconds: f64) -> Date {
        Date { timestamp: OrderedFloat(seconds) }
    }

    /// Creates a date from a `CFAbsoluteTime`, seconds relative to the
    /// Apple reference date.
    pub fn from_absolute_time(seconds: f64) -> Date {
        Date::from_unix_timestamp(seconds + APPLE_EPOCH_OFFSET_SECONDS)
    }

    /// Seconds relative to the Unix epoch.
    pub fn unix_timestamp(&self) -> f64 {
        self.timestamp.into_inner()
    }

    /// Seconds relative to the Apple reference date, as encoded on the wire.
    ///
    /// Timestamps are not guaranteed to round-trip below double precision;
    /// for dates near the epoch this is roughly microsecond granularity.
    pub fn absolute_time(&self) -> f64 {
        self.timestamp.into_inner() - APPLE_EPOCH_OFFSET_SECONDS
    }
}

/// A tagged unsigned integer distinct from a plain integer.
///
/// Keyed archivers use these as object-table indices. This library treats
/// them as opaque and preserves them through a round trip.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Uid {
    /// The identifier value.
    pub value: u64,
}

impl Uid {
    /// Creates a UID wrapping the given value.
    pub fn new(value: u64) -> Uid {
        Uid { value }
    }
}

/// Represents any valid bplist object.
///
/// Unlike plain `f64` values, reals and dates have a defined order,
/// implementing `Ord`, `Eq` and `Hash` in addition to `PartialOrd` and
/// `PartialEq`. This allows any value to be used as a dictionary key or
/// set element, and lets the writer deduplicate scalars by value.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Value {
    /// The no-op filler marker. Decoded for completeness when a document
    /// references a fill byte; has no binary representation of its own,
    /// so encoding it fails with `Error::UnsupportedType`.
    Null,

    /// Represents a bplist boolean, like `NSNumber`.
    Boolean(bool),

    /// Represents a bplist integral value of up to 64 bits, like `NSNumber`.
    Integer(i64),

    /// Represents a bplist floating-point value, like `NSNumber`.
    Real(OrderedFloat<f64>),

    /// Represents a bplist date, like `NSDate`.
    Date(Date),

    /// Represents a bplist data instance, like `NSData`.
    Data(Vec<u8>),

    /// Represents a 7-bit ASCII string, like `NSString`.
    ///
    /// Non-ASCII content is unrepresentable in this variant by
    /// construction; use [`Value::string`] to pick the right variant for
    /// arbitrary text.
    AsciiString(AsciiString),

    /// Represents a string carried as UTF-16 code units, like `NSString`.
    Utf16String(String),

    /// Represents a bplist UID value.
    Uid(Uid),

    /// Represents a bplist array of objects, like `NSArray<id>`.
    Array(Vec<Value>),

    /// Represents a bplist set of objects, like `NSSet<id>`.
    ///
    /// The wire format does not define an element order; equality of the
    /// backing `BTreeSet` is content-based, which is what a round trip
    /// preserves.
    Set(BTreeSet<Value>),

    /// Represents a bplist dictionary, like `NSDictionary<id,id>`.
    ///
    /// The dictionary is backed by a `BTreeMap`, meaning entries have a
    /// defined order which is not necessarily the order in which they were
    /// encountered during parsing.
    Dictionary(BTreeMap<Value, Value>),
}

impl Value {
    /// Creates a string value, choosing the ASCII representation when the
    /// content permits and transparently falling back to UTF-16 otherwise.
    pub fn string<S: Into<String>>(value: S) -> Value {
        match AsciiString::from_ascii(value.into()) {
            Ok(ascii) => Value::AsciiString(ascii),
            Err(error) => Value::Utf16String(error.into_source()),
        }
    }

    /// Returns true for array, set and dictionary values.
    ///
    /// Containers are never deduplicated by the writer; every container
    /// instance occupies its own slot in the offset table even when it is
    /// structurally identical to another.
    pub fn is_container(&self) -> bool {
        match self {
            Value::Array(_) | Value::Set(_) | Value::Dictionary(_) => true,
            _ => false,
        }
    }

    /// If the value is a boolean, returns it.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// If the value is an integer, returns it.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// If the value is a real, returns it.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(value) => Some(value.into_inner()),
            _ => None,
        }
    }

    /// If the value is a date, returns it.
    pub fn as_date(&self) -> Option<Date> {
        match self {
            Value::Date(value) => Some(*value),
            _ => None,
        }
    }

    /// If the value is a data blob, returns a borrow of its bytes.
    pub fn as_data(&self) -> Option<&[u8]> {
        match self {
            Value::Data(value) => Some(value),
            _ => None,
        }
    }

    /// If the value is a string of either representation, returns it as `&str`.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Value::AsciiString(value) => Some(value.as_str()),
            Value::Utf16String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// If the value is a UID, returns it.
    pub fn as_uid(&self) -> Option<Uid> {
        match self {
            Value::Uid(value) => Some(*value),
            _ => None,
        }
    }

    /// If the value is an array, returns a borrow of its elements.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(value) => Some(value),
            _ => None,
        }
    }

    /// If the value is a set, returns a borrow of its elements.
    pub fn as_set(&self) -> Option<&BTreeSet<Value>> {
        match self {
            Value::Set(value) => Some(value),
            _ => None,
        }
    }

    /// If the value is a dictionary, returns a borrow of its entries.
    pub fn as_dictionary(&self) -> Option<&BTreeMap<Value, Value>> {
        match self {
            Value::Dictionary(value) => Some(value),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Value {
        Value::Boolean(value)
    }
}

macro_rules! impl_from_integer {
    ($($type:ty),*) => {
        $(
            impl From<$type> for Value {
                fn from(value: $type) -> Value {
                    Value::Integer(value as i64)
                }
            }
        )*
    };
}

impl_from_integer![i8, i16, i32, i64, u8, u16, u32];

impl From<f64> for Value {
    fn from(value: f64) -> Value {
        Value::Real(OrderedFloat(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Value {
        Value::string(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Value {
        Value::string(value)
    }
}

impl From<AsciiString> for Value {
    fn from(value: AsciiString) -> Value {
        Value::AsciiString(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Value {
        Value::Data(value)
    }
}

impl From<Date> for Value {
    fn from(value: Date) -> Value {
        Value::Date(value)
    }
}

impl From<Uid> for Value {
    fn from(value: Uid) -> Value {
        Value::Uid(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Value {
        Value::Array(value)
    }
}

impl From<BTreeSet<Value>> for Value {
    fn from(value: BTreeSet<Value>) -> Value {
        Value::Set(value)
    }
}

impl From<BTreeMap<Value, Value>> for Value {
    fn from(value: BTreeMap<Value, Value>) -> Value {
        Value::Dictionary(value)
    }
}
