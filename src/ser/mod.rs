//
// Copyright 2026 biplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # The bplist writer.
//!
//! Writing is two sequential passes over the same flattened graph. The
//! first pass (`graph`) counts objects and references so the reference
//! index width is known; the second pass emits each distinct object's
//! bytes exactly once, records its offset, and finishes with the offset
//! table and trailer.

mod graph;

use log::debug;

use crate::document::{
    ObjectFormat,
    TRAILER_PREAMBLE_UNUSED_SIZE,
    WRITER_HEADER,
};
use crate::error::{Error, Result};
use crate::value::{to_value, Value};
use self::graph::{ObjectGraph, WrappedValue};

/// Serializes any serializable Rust data structure as the bytes of a
/// binary property list document.
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: serde::Serialize + ?Sized,
{
    to_value(value)?.to_vec()
}

impl Value {
    /// Encodes the value graph as a complete binary property list document.
    ///
    /// Fails with [`Error::UnsupportedType`] when the graph contains a
    /// value with no binary representation.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        let serializer = Serializer::new(ObjectGraph::build(self)?);
        serializer.write_document()
    }
}

/// The smallest byte width of {1, 2, 4, 8} able to hold the given value.
fn int_size(value: u64) -> usize {
    if value <= 0xFF {
        1
    } else if value <= 0xFFFF {
        2
    } else if value <= 0xFFFF_FFFF {
        4
    } else {
        8
    }
}

/// Emits the bytes of a flattened object graph.
struct Serializer<'a> {
    graph: ObjectGraph<'a>,
    object_reference_size: usize,
    output: Vec<u8>,
    /// Byte position of each object's body, indexed by reference number
    /// and recorded at the moment the body is emitted.
    offsets: Vec<Option<usize>>,
}

impl<'a> Serializer<'a> {

    fn new(graph: ObjectGraph<'a>) -> Serializer<'a> {
        let object_reference_size = graph.object_reference_size();
        let offsets = vec![None; graph.len()];
        Serializer {
            graph,
            object_reference_size,
            output: Vec::new(),
            offsets,
        }
    }

    fn write_document(mut self) -> Result<Vec<u8>> {
        self.output.extend_from_slice(WRITER_HEADER);

        // The root's reference index precedes its body, by convention.
        self.write_reference(0);
        self.write_object(0)?;

        // With every body emitted, the largest offset determines the width
        // of the offset table entries.
        let offset_table_offset = self.output.len();
        let largest_offset = self.offsets
            .iter()
            .filter_map(|offset| *offset)
            .max()
            .unwrap_or(0);
        let offset_size = int_size(largest_offset as u64);

        for index in 0 .. self.graph.len() {
            let offset = self.offsets[index].ok_or(
                Error::InternalInconsistency("referenced object was never written")
            )?;
            self.write_sized_int(offset as u64, offset_size);
        }

        // Trailer: reserved bytes, the two widths, then the object count,
        // root reference number and offset table position.
        self.output.extend_from_slice(&[0u8; TRAILER_PREAMBLE_UNUSED_SIZE]);
        self.output.push(offset_size as u8);
        self.output.push(self.object_reference_size as u8);
        self.output.extend_from_slice(&(self.graph.len() as u64).to_be_bytes());
        self.output.extend_from_slice(&0u64.to_be_bytes());
        self.output.extend_from_slice(&(offset_table_offset as u64).to_be_bytes());

        debug!(
            "wrote bplist document: {} objects, {} references, {} byte offsets, {} bytes total",
            self.graph.len(),
            self.graph.reference_slots(),
            offset_size,
            self.output.len(),
        );

        Ok(self.output)
    }

    /// Emits the body of the object with the given reference number,
    /// followed by the bodies of any children not yet written.
    fn write_object(&mut self, index: usize) -> Result<()> {
        self.offsets[index] = Some(self.output.len());

        match self.graph.object(index).clone() {
            WrappedValue::Scalar(value) =>
                self.write_scalar(value),

            WrappedValue::Array(references) => {
                self.write_marker_with_count(ObjectFormat::Array, references.len());
                self.write_container_bodies(references)
            }

            WrappedValue::Set(references) => {
                self.write_marker_with_count(ObjectFormat::Set, references.len());
                self.write_container_bodies(references)
            }

            WrappedValue::Dictionary(pairs) => {
                self.write_marker_with_count(ObjectFormat::Dictionary, pairs.len());
                let references = pairs.iter()
                    .map(|&(key, _)| key)
                    .chain(pairs.iter().map(|&(_, value)| value))
                    .collect::<Vec<usize>>();
                self.write_container_bodies(references)
            }
        }
    }

    /// Emits a container's reference list, then the bodies of newly
    /// referenced children.
    fn write_container_bodies(&mut self, references: Vec<usize>) -> Result<()> {
        for &reference in &references {
            self.write_reference(reference);
        }
        for reference in references {
            if self.offsets[reference].is_none() {
                self.write_object(reference)?;
            }
        }
        Ok(())
    }

    fn write_scalar(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Boolean(false) =>
                self.output.push(0b0000_1000),
            Value::Boolean(true) =>
                self.output.push(0b0000_1001),

            Value::Integer(value) =>
                self.write_integer_object(*value),

            // Reals always use the full double-precision width.
            Value::Real(value) => {
                self.output.push(ObjectFormat::Float64.tag_bits());
                self.output.extend_from_slice(&value.into_inner().to_be_bytes());
            }

            // The wire holds seconds relative to the Apple reference date.
            Value::Date(date) => {
                self.output.push(ObjectFormat::Date.tag_bits());
                self.output.extend_from_slice(&date.absolute_time().to_be_bytes());
            }

            Value::Data(bytes) => {
                self.write_marker_with_count(ObjectFormat::Data, bytes.len());
                self.output.extend_from_slice(bytes);
            }

            Value::AsciiString(text) => {
                self.write_marker_with_count(ObjectFormat::AsciiString, text.len());
                self.output.extend_from_slice(text.as_bytes());
            }

            // The count is the number of UTF-16 code units, not characters.
            Value::Utf16String(text) => {
                let code_units = text.encode_utf16().collect::<Vec<u16>>();
                self.write_marker_with_count(ObjectFormat::Utf16String, code_units.len());
                for code_unit in code_units {
                    self.output.extend_from_slice(&code_unit.to_be_bytes());
                }
            }

            Value::Uid(uid) => {
                let size = int_size(uid.value);
                self.output.push(ObjectFormat::Uid.tag_bits() | (size as u8 - 1));
                self.write_sized_int(uid.value, size);
            }

            Value::Null | Value::Array(_) | Value::Set(_) | Value::Dictionary(_) =>
                return Err(Error::InternalInconsistency("non-scalar in a scalar arena slot")),
        }

        Ok(())
    }

    /// Emits an integer object using the smallest sufficient width:
    /// 1, 2 or 4 bytes unsigned, or 8 bytes signed two's-complement.
    /// Negative values always occupy the full signed width.
    fn write_integer_object(&mut self, value: i64) {
        if value < 0 {
            self.output.push(ObjectFormat::SInt64.tag_bits());
            self.output.extend_from_slice(&value.to_be_bytes());
        } else {
            let size = int_size(value as u64);
            let exponent = size.trailing_zeros() as u8;
            self.output.push(ObjectFormat::UInt8.tag_bits() | exponent);
            self.write_sized_int(value as u64, size);
        }
    }

    /// Emits a marker byte for the format, with the count inline in the
    /// low nibble when it fits and as a trailing integer object otherwise.
    fn write_marker_with_count(&mut self, format: ObjectFormat, count: usize) {
        if count <= 0b0000_1110 {
            self.output.push(format.tag_bits() | count as u8);
        } else {
            self.output.push(format.tag_bits() | 0b0000_1111);
            self.write_integer_object(count as i64);
        }
    }

    fn write_reference(&mut self, index: usize) {
        self.write_sized_int(index as u64, self.object_reference_size);
    }

    /// Emits a big-endian unsigned integer using exactly `size` bytes.
    fn write_sized_int(&mut self, value: u64, size: usize) {
        let bytes = value.to_be_bytes();
        self.output.extend_from_slice(&bytes[8 - size ..]);
    }

}

#[cfg(test)]
mod tests {
    use super::int_size;
    use crate::value::Value;

    #[test]
    fn test_int_size_boundaries() {
        assert_eq!(int_size(0), 1);
        assert_eq!(int_size(0xFF), 1);
        assert_eq!(int_size(0x100), 2);
        assert_eq!(int_size(0xFFFF), 2);
        assert_eq!(int_size(0x1_0000), 4);
        assert_eq!(int_size(0xFFFF_FFFF), 4);
        assert_eq!(int_size(0x1_0000_0000), 8);
        assert_eq!(int_size(u64::max_value()), 8);
    }

    #[test]
    fn test_scalar_root_document_layout() {
        let output = Value::Boolean(true).to_vec().unwrap();

        // Header, one-byte root reference, one-byte body, one-byte offset
        // table entry, 32-byte trailer.
        assert_eq!(output.len(), 20 + 1 + 1 + 1 + 32);
        assert_eq!(&output[.. 20], b"bplist00bybiplist1.0");
        assert_eq!(output[20], 0x00);
        assert_eq!(output[21], 0b0000_1001);
        assert_eq!(output[22], 21);

        // Trailer fields: widths, count, root, table offset.
        let trailer = &output[output.len() - 32 ..];
        assert_eq!(&trailer[.. 6], &[0u8; 6]);
        assert_eq!(trailer[6], 1);
        assert_eq!(trailer[7], 1);
        assert_eq!(&trailer[8 .. 16], &1u64.to_be_bytes());
        assert_eq!(&trailer[16 .. 24], &0u64.to_be_bytes());
        assert_eq!(&trailer[24 .. 32], &22u64.to_be_bytes());
    }

    #[test]
    fn test_integer_objects_use_minimal_widths() {
        let bodies: Vec<(i64, Vec<u8>)> = vec![
            (0, vec![0x10, 0x00]),
            (255, vec![0x10, 0xFF]),
            (256, vec![0x11, 0x01, 0x00]),
            (70_000, vec![0x12, 0x00, 0x01, 0x11, 0x70]),
            (0x1_0000_0000, vec![0x13, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00]),
            (-1, vec![0x13, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]),
        ];
        for (value, body) in bodies {
            let output = Value::Integer(value).to_vec().unwrap();
            assert_eq!(&output[21 .. 21 + body.len()], &body[..], "value {}", value);
        }
    }

    #[test]
    fn test_long_ascii_string_uses_trailing_count() {
        let text = "abcdefghijklmnop"; // 16 characters
        let output = Value::string(text).to_vec().unwrap();
        assert_eq!(output[21], 0b0101_1111);
        assert_eq!(&output[22 .. 24], &[0x10, 0x10]);
        assert_eq!(&output[24 .. 40], text.as_bytes());
    }

    #[test]
    fn test_uid_width_is_minimal() {
        let output = Value::Uid(crate::value::Uid::new(0x0102)).to_vec().unwrap();
        assert_eq!(&output[21 .. 24], &[0b1000_0001, 0x01, 0x02]);
    }
}
