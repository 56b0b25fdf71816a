//
// Copyright 2026 biplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! Deserialization of bplist values from any self-describing serde format,
//! and interpretation of a decoded value graph as arbitrary Rust types.
//!
//! The `Date`, `Uid` and `Set` kinds have no counterpart in the serde data
//! model. They are carried as single-entry maps with magic keys, so they
//! survive a trip through this module but will only be produced from a
//! bplist value. Because serde cannot distinguish the two string
//! representations either, text passing through here is normalized by
//! content: ASCII text becomes `Value::AsciiString`. The wire codec in
//! `Value::from_slice` and `Value::to_vec` never normalizes.

use serde::de::{
    self,
    Deserialize,
    DeserializeOwned,
    DeserializeSeed,
    IntoDeserializer,
    MapAccess,
    SeqAccess,
    Visitor,
};

use std::collections::btree_map;
use std::fmt;
use std::vec;

use crate::de::{date, set, uid};
use crate::error::{Error, Result};
use crate::value::{Date, Uid, Value};

/// Interprets a decoded value graph as an instance of type `T`.
pub fn from_value<T>(value: Value) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(value)
}

/// Deserialization of bplist values from an object model which supports
/// all values that can be losslessly read from and written into a bplist
/// document. This is implemented generically, meaning that substantially
/// any serde format will be able to deserialize into a bplist value, with
/// the pseudo-structure exceptions described in the module documentation.
impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Value, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid bplist value")
            }

            #[inline]
            fn visit_bool<E>(self, value: bool) -> std::result::Result<Value, E> {
                Ok(Value::Boolean(value))
            }

            #[inline]
            fn visit_i64<E>(self, value: i64) -> std::result::Result<Value, E> {
                Ok(Value::Integer(value))
            }

            #[inline]
            fn visit_u64<E>(self, value: u64) -> std::result::Result<Value, E>
            where
                E: de::Error,
            {
                if value <= i64::max_value() as u64 {
                    Ok(Value::Integer(value as i64))
                } else {
                    Err(de::Error::custom("u64 value was too large"))
                }
            }

            #[inline]
            fn visit_f64<E>(self, value: f64) -> std::result::Result<Value, E> {
                Ok(Value::Real(value.into()))
            }

            #[inline]
            fn visit_str<E>(self, value: &str) -> std::result::Result<Value, E> {
                Ok(Value::string(value))
            }

            #[inline]
            fn visit_string<E>(self, value: String) -> std::result::Result<Value, E> {
                Ok(Value::string(value))
            }

            #[inline]
            fn visit_bytes<E>(self, value: &[u8]) -> std::result::Result<Value, E> {
                Ok(Value::Data(value.into()))
            }

            #[inline]
            fn visit_byte_buf<E>(self, value: Vec<u8>) -> std::result::Result<Value, E> {
                Ok(Value::Data(value))
            }

            #[inline]
            fn visit_unit<E>(self) -> std::result::Result<Value, E> {
                Ok(Value::Null)
            }

            #[inline]
            fn visit_none<E>(self) -> std::result::Result<Value, E> {
                Ok(Value::Null)
            }

            #[inline]
            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Value, D::Error>
            where
                D: de::Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            #[inline]
            fn visit_seq<V>(self, mut visitor: V) -> std::result::Result<Value, V::Error>
            where
                V: SeqAccess<'de>,
            {
                let mut elements = Vec::new();
                while let Some(element) = visitor.next_element()? {
                    elements.push(element);
                }
                Ok(Value::Array(elements))
            }

            fn visit_map<V>(self, mut visitor: V) -> std::result::Result<Value, V::Error>
            where
                V: MapAccess<'de>,
            {
                let mut key = visitor.next_key::<Value>()?;

                // Re-mapped types without a serde analog are identified by
                // a special key and do not produce Dictionaries.
                if let Some(ref candidate) = key {
                    match candidate.as_string() {
                        Some(name) if name == date::STRUCT_FIELD => {
                            let timestamp: f64 = visitor.next_value()?;
                            return Ok(Value::Date(Date::from_unix_timestamp(timestamp)));
                        }
                        Some(name) if name == uid::STRUCT_FIELD => {
                            let value: u64 = visitor.next_value()?;
                            return Ok(Value::Uid(Uid::new(value)));
                        }
                        Some(name) if name == set::STRUCT_FIELD => {
                            let elements: Vec<Value> = visitor.next_value()?;
                            return Ok(Value::Set(elements.into_iter().collect()));
                        }
                        _ => {}
                    }
                }

                // Process all key-value pairs checking for duplicates.
                let mut entries = std::collections::BTreeMap::new();
                while let Some(k) = key {
                    if entries.contains_key(&k) {
                        let msg = format!("duplicate key: `{:?}`", k);
                        return Err(de::Error::custom(msg));
                    }
                    let v = visitor.next_value()?;
                    entries.insert(k, v);
                    key = visitor.next_key()?;
                }

                Ok(Value::Dictionary(entries))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl<'de> IntoDeserializer<'de, Error> for Value {
    type Deserializer = Value;

    fn into_deserializer(self) -> Value {
        self
    }
}

/// A decoded value graph acts as its own deserializer, letting arbitrary
/// `Deserialize` types be built from it without another pass over the
/// document bytes.
impl<'de> de::Deserializer<'de> for Value {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::Null =>
                visitor.visit_unit(),
            Value::Boolean(value) =>
                visitor.visit_bool(value),
            Value::Integer(value) =>
                visitor.visit_i64(value),
            Value::Real(value) =>
                visitor.visit_f64(value.into_inner()),
            Value::Data(value) =>
                visitor.visit_byte_buf(value),
            Value::AsciiString(value) =>
                visitor.visit_string(value.into()),
            Value::Utf16String(value) =>
                visitor.visit_string(value),

            // Pseudo-structures are presented as single-entry maps.
            Value::Date(value) =>
                visitor.visit_map(DateAccess::new(value)),
            Value::Uid(value) =>
                visitor.visit_map(UidAccess::new(value)),
            Value::Set(elements) =>
                visitor.visit_map(SetAccess::new(elements.into_iter().collect())),

            Value::Array(elements) =>
                visitor.visit_seq(ArraySequence::new(elements)),
            Value::Dictionary(entries) =>
                visitor.visit_map(DictionarySequence::new(entries)),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    /// Sequence extraction is deliberately lenient: a set yields its
    /// elements, so collection types like `HashSet<T>` and `Vec<T>` can be
    /// read from either container kind.
    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::Array(elements) =>
                visitor.visit_seq(ArraySequence::new(elements)),
            Value::Set(elements) =>
                visitor.visit_seq(ArraySequence::new(elements.into_iter().collect())),
            other =>
                other.deserialize_any(visitor),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    serde::forward_to_deserialize_any! {
        bool
        u8 u16 u32 u64 u128
        i8 i16 i32 i64 i128
        f32 f64
        char str string
        map
        bytes byte_buf
        enum
        struct
        unit unit_struct
        tuple tuple_struct
        ignored_any
        identifier
    }
}

/// Access object to process the elements of an Array.
struct ArraySequence {
    elements: vec::IntoIter<Value>,
}

impl ArraySequence {
    fn new(elements: Vec<Value>) -> Self {
        ArraySequence {
            elements: elements.into_iter(),
        }
    }
}

impl<'de> SeqAccess<'de> for ArraySequence {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: DeserializeSeed<'de>,
    {
        match self.elements.next() {
            Some(element) => seed.deserialize(element).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.elements.len())
    }
}

/// Access object used to process the entries of a Dictionary.
struct DictionarySequence {
    entries: btree_map::IntoIter<Value, Value>,
    pending_value: Option<Value>,
}

impl DictionarySequence {
    fn new(entries: std::collections::BTreeMap<Value, Value>) -> Self {
        DictionarySequence {
            entries: entries.into_iter(),
            pending_value: None,
        }
    }
}

impl<'de> MapAccess<'de> for DictionarySequence {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: DeserializeSeed<'de>,
    {
        match self.entries.next() {
            Some((key, value)) => {
                self.pending_value = Some(value);
                seed.deserialize(key).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: DeserializeSeed<'de>,
    {
        match self.pending_value.take() {
            Some(value) => seed.deserialize(value),
            None => Err(de::Error::custom("dictionary value requested before key")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}

/// Access object providing a map view of a Date pseudo-structure.
struct DateAccess {
    date: Date,
    visited: bool,
}

impl DateAccess {
    fn new(date: Date) -> Self {
        DateAccess {
            date,
            visited: false,
        }
    }
}

impl<'de> MapAccess<'de> for DateAccess {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: DeserializeSeed<'de>,
    {
        if self.visited {
            Ok(None)
        } else {
            self.visited = true;
            seed.deserialize(date::STRUCT_FIELD.into_deserializer()).map(Some)
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: DeserializeSeed<'de>,
    {
        seed.deserialize(self.date.unix_timestamp().into_deserializer())
    }
}

/// Access object providing a map view of a UID pseudo-structure.
struct UidAccess {
    uid: Uid,
    visited: bool,
}

impl UidAccess {
    fn new(uid: Uid) -> Self {
        UidAccess {
            uid,
            visited: false,
        }
    }
}

impl<'de> MapAccess<'de> for UidAccess {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: DeserializeSeed<'de>,
    {
        if self.visited {
            Ok(None)
        } else {
            self.visited = true;
            seed.deserialize(uid::STRUCT_FIELD.into_deserializer()).map(Some)
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: DeserializeSeed<'de>,
    {
        seed.deserialize(self.uid.value.into_deserializer())
    }
}

/// Access object providing a map view of a Set pseudo-structure.
struct SetAccess {
    elements: Option<Vec<Value>>,
}

impl SetAccess {
    fn new(elements: Vec<Value>) -> Self {
        SetAccess {
            elements: Some(elements),
        }
    }
}

impl<'de> MapAccess<'de> for SetAccess {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: DeserializeSeed<'de>,
    {
        if self.elements.is_none() {
            Ok(None)
        } else {
            seed.deserialize(set::STRUCT_FIELD.into_deserializer()).map(Some)
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: DeserializeSeed<'de>,
    {
        match self.elements.take() {
            Some(elements) => {
                let sequence = ArraySequence::new(elements);
                seed.deserialize(de::value::SeqAccessDeserializer::new(sequence))
            }
            None => Err(de::Error::custom("set elements requested twice")),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashSet};

    use crate::value::{from_value, Date, Uid, Value};

    #[test]
    fn test_from_value_scalar_extraction() {
        assert_eq!(from_value::<i64>(Value::Integer(-5)), Ok(-5));
        assert_eq!(from_value::<u16>(Value::Integer(512)), Ok(512));
        assert_eq!(from_value::<bool>(Value::Boolean(true)), Ok(true));
        assert_eq!(from_value::<String>(Value::string("plist")), Ok(String::from("plist")));
        assert_eq!(from_value::<Option<i64>>(Value::Null), Ok(None));
        assert_eq!(from_value::<Option<i64>>(Value::Integer(3)), Ok(Some(3)));
    }

    #[test]
    fn test_pseudo_structures_survive_a_serde_round_trip() {
        let date = Value::Date(Date::from_unix_timestamp(978_307_240.5));
        assert_eq!(from_value::<Value>(date.clone()), Ok(date));

        let uid = Value::Uid(Uid::new(42));
        assert_eq!(from_value::<Value>(uid.clone()), Ok(uid));

        let elements: BTreeSet<Value> =
            vec![Value::Integer(1), Value::Integer(2)].into_iter().collect();
        let set = Value::Set(elements);
        assert_eq!(from_value::<Value>(set.clone()), Ok(set));
    }

    #[test]
    fn test_typed_date_extraction() {
        let value = Value::Date(Date::from_unix_timestamp(1_000.25));
        assert_eq!(
            from_value::<Date>(value),
            Ok(Date::from_unix_timestamp(1_000.25))
        );
    }

    #[test]
    fn test_sets_extract_into_collection_types() {
        let elements: BTreeSet<Value> =
            vec![Value::Integer(3), Value::Integer(1)].into_iter().collect();
        let decoded: HashSet<i64> = from_value(Value::Set(elements)).unwrap();
        let expected: HashSet<i64> = vec![1, 3].into_iter().collect();
        assert_eq!(decoded, expected);
    }
}
