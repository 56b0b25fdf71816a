//
// Copyright 2026 biplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # The bplist reader.
//!
//! Decoding is a pull-style recursive descent: the trailer describes an
//! offset table giving random access to every object by reference number,
//! and containers store their children as reference numbers rather than
//! inline values. The reader validates the signature, loads the trailer
//! and offset table, then resolves objects on demand starting from the
//! root reference.

pub(crate) mod date;
pub(crate) mod parser;
pub(crate) mod set;
pub(crate) mod uid;

use log::debug;
use ordered_float::OrderedFloat;

use std::collections::{BTreeMap, BTreeSet};

use crate::document::{
    HEADER_SIZE,
    TRAILER_SIZE,
    ObjectFormat,
    OffsetTable,
};
use crate::error::{Error, FormatError, Result};
use crate::value::{from_value, Date, Uid, Value};

/// Returns true when the buffer carries the seven-byte `bplist0`
/// signature and should be decoded by this library; false means the
/// caller may hand the same buffer to a text plist codec.
pub fn is_binary_plist(input: &[u8]) -> bool {
    parser::document::signature(input).is_ok()
}

/// Deserializes an instance of `T` from the bytes of a binary property
/// list document.
///
/// The document is decoded into a [`Value`] graph first and `T` is then
/// built from that graph, so `T` may borrow nothing from the input.
pub fn from_slice<T>(input: &[u8]) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    from_value(Value::from_slice(input)?)
}

impl Value {
    /// Decodes a complete binary property list document into a value graph.
    ///
    /// Fails with [`Error::NotBinaryPlist`] when the signature is absent
    /// (recoverable; the data may be a text plist) and with
    /// [`Error::Format`] for any structural violation thereafter.
    pub fn from_slice(input: &[u8]) -> Result<Value> {
        let metadata = Metadata::parse(input)?;
        let root_object = metadata.root_object;
        let mut reader = Reader {
            object_table: ObjectTable { input, metadata },
            collection_stack: BTreeSet::new(),
        };
        reader.read(root_object)
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
struct Metadata {
    /// The table of offsets from the start of the input to the location of a given object.
    offset_table: OffsetTable,
    /// The byte length of an object reference.
    object_reference_size: usize,
    /// The reference number of the root object.
    root_object: usize,
    /// The range of bytes of the input where objects may reside.
    object_table_range: std::ops::Range<usize>,
}

impl Metadata {

    /// Parses the metadata necessary to interpret the contents of the document.
    ///
    /// # Notes
    ///
    /// The smallest possible document consists of:
    ///   1. A fixed-sized header.
    ///   2. An object table with a single one-byte entry such as a zero-length array.
    ///   3. An offset table with a single one-byte entry for the root object.
    ///   4. A fixed-sized trailer.
    fn parse(input: &[u8]) -> Result<Metadata> {
        // The signature alone decides whether this codec applies.
        if !is_binary_plist(input) {
            return Err(Error::NotBinaryPlist);
        }
        if input.len() < HEADER_SIZE + 2 + TRAILER_SIZE {
            return Err(FormatError::Truncated.into());
        }

        // Parse the trailer from the end of the input and sanity check the fields.
        let trailer_slice = &input[input.len() - TRAILER_SIZE .. ];
        let (_, trailer) = parser::document::trailer(trailer_slice).map_err(|_| {
            FormatError::InvalidTrailer
        })?;
        debug!("parsed bplist trailer: {:?}", trailer);

        if trailer.offset_size < 1 || trailer.offset_size > 8 {
            return Err(FormatError::InvalidTrailer.into());
        }
        if trailer.object_reference_size < 1 || trailer.object_reference_size > 8 {
            return Err(FormatError::InvalidTrailer.into());
        }
        if trailer.root_object >= trailer.number_of_objects {
            return Err(FormatError::InvalidObjectReference.into());
        }

        // Compute the extent of the offset table, rejecting any description
        // which would overlap the trailer. The counts come from the wire,
        // so the arithmetic must not be allowed to wrap.
        let offset_table_start = trailer.offset_table_offset;
        let offset_table_end = trailer.number_of_objects
            .checked_mul(trailer.offset_size)
            .and_then(|length| offset_table_start.checked_add(length))
            .ok_or(FormatError::InvalidOffsetTable)?;
        if offset_table_end > input.len() - TRAILER_SIZE {
            return Err(FormatError::InvalidOffsetTable.into());
        }

        // Parse the offset table. Entry order is reference number order.
        let offset_table_slice = &input[offset_table_start .. offset_table_end];
        let (_, offset_table) = parser::document::offset_table(
            trailer.number_of_objects,
            trailer.offset_size
        )(offset_table_slice).map_err(|_| {
            FormatError::InvalidOffsetTable
        })?;

        Ok(Metadata {
            offset_table,
            object_reference_size: trailer.object_reference_size,
            root_object: trailer.root_object,
            object_table_range: (HEADER_SIZE .. offset_table_start),
        })
    }

    /// Utilizes the offset table to compute the offset of the given object.
    fn offset_of(&self, object: usize) -> Result<usize> {
        if object >= self.offset_table.len() {
            Err(FormatError::InvalidObjectReference.into())
        } else {
            Ok(self.offset_table[object])
        }
    }

}

/// Provides access to objects within the object table.
#[derive(Debug)]
struct ObjectTable<'a> {
    input: &'a [u8],
    metadata: Metadata,
}

/// Defines a basic object parser with the failure mapped to a format error.
macro_rules! define_parser {
    ($name:ident, $parser:expr, $type:ty, $format_error:expr) => {
        fn $name(&self, object: usize) -> Result<$type> {
            let data = self.data_for(object)?;
            $parser(data)
                .map(|(_, value)| value)
                .map_err(|_| Error::from($format_error))
        }
    };
}

impl<'a> ObjectTable<'a> {

    /// Returns the slice of the input corresponding to the object.
    fn data_for(&self, object: usize) -> Result<&'a [u8]> {
        let offset = self.metadata.offset_of(object)?;

        // Make sure the offset is to a point within the object table.
        if !self.metadata.object_table_range.contains(&offset) {
            return Err(FormatError::InvalidOffsetToObject.into());
        }

        Ok(&self.input[offset .. ])
    }

    /// Parses the marker byte for the specified object and returns the format.
    fn kind_of(&self, object: usize) -> Result<ObjectFormat> {
        let data = self.data_for(object)?;
        parser::object::any_marker(data)
            .map(|(_, (format, _))| format)
            .map_err(|_| FormatError::InvalidObjectFormat.into())
    }

    define_parser![
        parse_boolean,
        parser::object::boolean,
        bool,
        FormatError::InvalidObjectFormat
    ];
    define_parser![
        parse_fill,
        parser::object::fill,
        (),
        FormatError::InvalidObjectFormat
    ];
    define_parser![
        parse_uint8,
        parser::object::uint8,
        u8,
        FormatError::InvalidObjectFormat
    ];
    define_parser![
        parse_uint16,
        parser::object::uint16,
        u16,
        FormatError::InvalidObjectFormat
    ];
    define_parser![
        parse_uint32,
        parser::object::uint32,
        u32,
        FormatError::InvalidObjectFormat
    ];
    define_parser![
        parse_sint64,
        parser::object::sint64,
        i64,
        FormatError::InvalidObjectFormat
    ];
    define_parser![
        parse_float32,
        parser::object::float32,
        f32,
        FormatError::InvalidObjectFormat
    ];
    define_parser![
        parse_float64,
        parser::object::float64,
        f64,
        FormatError::InvalidObjectFormat
    ];
    define_parser![
        parse_date,
        parser::object::date,
        f64,
        FormatError::InvalidObjectFormat
    ];
    define_parser![
        parse_data,
        parser::object::data,
        &'a [u8],
        FormatError::InvalidObjectFormat
    ];
    define_parser![
        parse_ascii_string,
        parser::object::ascii_string,
        &'a ascii::AsciiStr,
        FormatError::InvalidAsciiString
    ];
    define_parser![
        parse_utf16_string,
        parser::object::utf16_string,
        String,
        FormatError::InvalidUtf16String
    ];
    define_parser![
        parse_uid,
        parser::object::uid,
        u64,
        FormatError::InvalidUid
    ];

    /// Parses an array of element references whose width is determined in metadata.
    fn parse_array(&self, object: usize) -> Result<Vec<usize>> {
        let data = self.data_for(object)?;
        parser::object::array(self.metadata.object_reference_size)(data)
            .map(|(_, objects)| objects)
            .map_err(|_| FormatError::InvalidObjectFormat.into())
    }

    /// Parses a set of element references whose width is determined in metadata.
    fn parse_set(&self, object: usize) -> Result<Vec<usize>> {
        let data = self.data_for(object)?;
        parser::object::set(self.metadata.object_reference_size)(data)
            .map(|(_, objects)| objects)
            .map_err(|_| FormatError::InvalidObjectFormat.into())
    }

    /// Parses a dictionary of key and value references whose width is determined in metadata.
    fn parse_dictionary(&self, object: usize) -> Result<Vec<(usize, usize)>> {
        let data = self.data_for(object)?;
        parser::object::dictionary(self.metadata.object_reference_size)(data)
            .map(|(_, pairs)| pairs)
            .map_err(|_| FormatError::InvalidObjectFormat.into())
    }

}

/// Resolves reference numbers into values, object by object.
struct Reader<'a> {
    object_table: ObjectTable<'a>,
    /// The collections currently being decoded, to detect reference cycles.
    collection_stack: BTreeSet<usize>,
}

impl<'a> Reader<'a> {

    /// Pushes a container onto the collection stack to ensure no cycles can occur.
    fn enter_collection(&mut self, object: usize) -> Result<()> {
        if self.collection_stack.insert(object) {
            Ok(())
        } else {
            Err(FormatError::CycleDetected.into())
        }
    }

    /// Pops a container from the collection stack.
    fn exit_collection(&mut self, object: usize) {
        self.collection_stack.remove(&object);
    }

    /// Decodes the object with the given reference number, recursing into
    /// container children.
    fn read(&mut self, object: usize) -> Result<Value> {
        let format = self.object_table.kind_of(object)?;

        let value = match format {
            ObjectFormat::Boolean =>
                Value::Boolean(self.object_table.parse_boolean(object)?),
            ObjectFormat::UInt8 =>
                Value::Integer(i64::from(self.object_table.parse_uint8(object)?)),
            ObjectFormat::UInt16 =>
                Value::Integer(i64::from(self.object_table.parse_uint16(object)?)),
            ObjectFormat::UInt32 =>
                Value::Integer(i64::from(self.object_table.parse_uint32(object)?)),
            ObjectFormat::SInt64 =>
                Value::Integer(self.object_table.parse_sint64(object)?),
            ObjectFormat::Float32 =>
                Value::Real(OrderedFloat(f64::from(self.object_table.parse_float32(object)?))),
            ObjectFormat::Float64 =>
                Value::Real(OrderedFloat(self.object_table.parse_float64(object)?)),
            ObjectFormat::Data =>
                Value::Data(self.object_table.parse_data(object)?.to_vec()),
            ObjectFormat::AsciiString =>
                Value::AsciiString(self.object_table.parse_ascii_string(object)?.to_ascii_string()),
            ObjectFormat::Utf16String =>
                Value::Utf16String(self.object_table.parse_utf16_string(object)?),
            ObjectFormat::Uid =>
                Value::Uid(Uid::new(self.object_table.parse_uid(object)?)),

            // Fill bytes decode as the null marker value.
            ObjectFormat::Fill => {
                self.object_table.parse_fill(object)?;
                Value::Null
            }

            // The wire holds seconds relative to the Apple reference date.
            ObjectFormat::Date => {
                let absolute_time = self.object_table.parse_date(object)?;
                Value::Date(Date::from_absolute_time(absolute_time))
            }

            ObjectFormat::Array => {
                let references = self.object_table.parse_array(object)?;
                self.enter_collection(object)?;
                let mut elements = Vec::with_capacity(references.len());
                for reference in references {
                    elements.push(self.read(reference)?);
                }
                self.exit_collection(object);
                Value::Array(elements)
            }

            ObjectFormat::Set => {
                let references = self.object_table.parse_set(object)?;
                self.enter_collection(object)?;
                let mut elements = BTreeSet::new();
                for reference in references {
                    elements.insert(self.read(reference)?);
                }
                self.exit_collection(object);
                Value::Set(elements)
            }

            ObjectFormat::Dictionary => {
                let pairs = self.object_table.parse_dictionary(object)?;
                self.enter_collection(object)?;
                let mut entries = BTreeMap::new();
                for (key_reference, value_reference) in pairs {
                    let key = self.read(key_reference)?;
                    let value = self.read(value_reference)?;
                    entries.insert(key, value);
                }
                self.exit_collection(object);
                Value::Dictionary(entries)
            }
        };

        Ok(value)
    }

}
