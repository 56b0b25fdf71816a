//
// Copyright 2026 biplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! Serialization of bplist values into any serde format, and construction
//! of a value graph from arbitrary Rust types.
//!
//! `Date`, `Uid` and `Set` values serialize as single-field structures
//! with magic names, mirroring the deserialization side, so they pass
//! through [`to_value`] unchanged.

use serde::ser::{self, Serialize};

use std::collections::BTreeMap;

use crate::de::{date, set, uid};
use crate::error::{Error, Result};
use crate::value::{Date, Uid, Value};

/// Renders any serializable Rust data structure as a value graph.
///
/// Unsigned integers above the signed 64-bit range have no plist
/// representation and fail with `Error::UnsupportedType`.
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: Serialize + ?Sized,
{
    value.serialize(ValueSerializer)
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        match self {
            Value::Null =>
                serializer.serialize_unit(),
            Value::Boolean(value) =>
                serializer.serialize_bool(*value),
            Value::Integer(value) =>
                serializer.serialize_i64(*value),
            Value::Real(value) =>
                serializer.serialize_f64(value.into_inner()),
            Value::Date(value) =>
                value.serialize(serializer),
            Value::Uid(value) =>
                value.serialize(serializer),
            Value::Data(value) =>
                serializer.serialize_bytes(value),
            Value::AsciiString(value) =>
                serializer.serialize_str(value.as_str()),
            Value::Utf16String(value) =>
                serializer.serialize_str(value),
            Value::Array(elements) =>
                elements.serialize(serializer),
            Value::Set(elements) => {
                use serde::ser::SerializeStruct;
                let mut structure = serializer.serialize_struct(set::STRUCT_NAME, 1)?;
                structure.serialize_field(set::STRUCT_FIELD, elements)?;
                structure.end()
            }
            Value::Dictionary(entries) =>
                entries.serialize(serializer),
        }
    }
}

impl Serialize for Date {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut structure = serializer.serialize_struct(date::STRUCT_NAME, 1)?;
        structure.serialize_field(date::STRUCT_FIELD, &self.unix_timestamp())?;
        structure.end()
    }
}

impl Serialize for Uid {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut structure = serializer.serialize_struct(uid::STRUCT_NAME, 1)?;
        structure.serialize_field(uid::STRUCT_FIELD, &self.value)?;
        structure.end()
    }
}

/// Builds a `Value` out of any serializable data structure.
struct ValueSerializer;

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeStruct;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, value: bool) -> Result<Value> {
        Ok(Value::Boolean(value))
    }

    fn serialize_i8(self, value: i8) -> Result<Value> {
        self.serialize_i64(i64::from(value))
    }

    fn serialize_i16(self, value: i16) -> Result<Value> {
        self.serialize_i64(i64::from(value))
    }

    fn serialize_i32(self, value: i32) -> Result<Value> {
        self.serialize_i64(i64::from(value))
    }

    fn serialize_i64(self, value: i64) -> Result<Value> {
        Ok(Value::Integer(value))
    }

    fn serialize_u8(self, value: u8) -> Result<Value> {
        self.serialize_i64(i64::from(value))
    }

    fn serialize_u16(self, value: u16) -> Result<Value> {
        self.serialize_i64(i64::from(value))
    }

    fn serialize_u32(self, value: u32) -> Result<Value> {
        self.serialize_i64(i64::from(value))
    }

    fn serialize_u64(self, value: u64) -> Result<Value> {
        if value <= i64::max_value() as u64 {
            self.serialize_i64(value as i64)
        } else {
            Err(Error::UnsupportedType("unsigned integer above the signed 64-bit range"))
        }
    }

    fn serialize_f32(self, value: f32) -> Result<Value> {
        self.serialize_f64(f64::from(value))
    }

    fn serialize_f64(self, value: f64) -> Result<Value> {
        Ok(Value::Real(value.into()))
    }

    fn serialize_char(self, value: char) -> Result<Value> {
        Ok(Value::string(value.to_string()))
    }

    fn serialize_str(self, value: &str) -> Result<Value> {
        Ok(Value::string(value))
    }

    fn serialize_bytes(self, value: &[u8]) -> Result<Value> {
        Ok(Value::Data(value.to_vec()))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::string(variant))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: Serialize + ?Sized,
    {
        let mut entries = BTreeMap::new();
        entries.insert(Value::string(variant), to_value(value)?);
        Ok(Value::Dictionary(entries))
    }

    fn serialize_seq(self, length: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(SerializeVec {
            elements: Vec::with_capacity(length.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, length: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(length))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        length: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(length))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        length: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Ok(SerializeTupleVariant {
            variant,
            elements: Vec::with_capacity(length),
        })
    }

    fn serialize_map(self, _length: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(SerializeMap {
            entries: BTreeMap::new(),
            pending_key: None,
        })
    }

    fn serialize_struct(
        self,
        name: &'static str,
        _length: usize,
    ) -> Result<Self::SerializeStruct> {
        Ok(SerializeStruct {
            name,
            entries: BTreeMap::new(),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _length: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(SerializeStructVariant {
            variant,
            entries: BTreeMap::new(),
        })
    }
}

struct SerializeVec {
    elements: Vec<Value>,
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, element: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.elements.push(to_value(element)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Array(self.elements))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, element: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        ser::SerializeSeq::serialize_element(self, element)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, field: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        ser::SerializeSeq::serialize_element(self, field)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

struct SerializeTupleVariant {
    variant: &'static str,
    elements: Vec<Value>,
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, field: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.elements.push(to_value(field)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let mut entries = BTreeMap::new();
        entries.insert(Value::string(self.variant), Value::Array(self.elements));
        Ok(Value::Dictionary(entries))
    }
}

struct SerializeMap {
    entries: BTreeMap<Value, Value>,
    pending_key: Option<Value>,
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.pending_key = Some(to_value(key)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        match self.pending_key.take() {
            Some(key) => {
                self.entries.insert(key, to_value(value)?);
                Ok(())
            }
            None => Err(ser::Error::custom("map value serialized before key")),
        }
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Dictionary(self.entries))
    }
}

struct SerializeStruct {
    name: &'static str,
    entries: BTreeMap<Value, Value>,
}

impl ser::SerializeStruct for SerializeStruct {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.entries.insert(Value::string(key), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let mut entries = self.entries;

        // Structures with the private magic names fold back into the value
        // kinds serde has no analog for.
        match self.name {
            date::STRUCT_NAME => {
                match entries.remove(&Value::string(date::STRUCT_FIELD)) {
                    Some(Value::Real(timestamp)) =>
                        Ok(Value::Date(Date::from_unix_timestamp(timestamp.into_inner()))),
                    _ => Err(ser::Error::custom("malformed date structure")),
                }
            }
            uid::STRUCT_NAME => {
                match entries.remove(&Value::string(uid::STRUCT_FIELD)) {
                    Some(Value::Integer(value)) if value >= 0 =>
                        Ok(Value::Uid(Uid::new(value as u64))),
                    _ => Err(ser::Error::custom("malformed uid structure")),
                }
            }
            set::STRUCT_NAME => {
                match entries.remove(&Value::string(set::STRUCT_FIELD)) {
                    Some(Value::Array(elements)) =>
                        Ok(Value::Set(elements.into_iter().collect())),
                    _ => Err(ser::Error::custom("malformed set structure")),
                }
            }
            _ => Ok(Value::Dictionary(entries)),
        }
    }
}

struct SerializeStructVariant {
    variant: &'static str,
    entries: BTreeMap<Value, Value>,
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.entries.insert(Value::string(key), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let mut wrapper = BTreeMap::new();
        wrapper.insert(Value::string(self.variant), Value::Dictionary(self.entries));
        Ok(Value::Dictionary(wrapper))
    }
}
