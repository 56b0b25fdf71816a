//
// Copyright 2026 biplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! Serde does not provide a Date or Time type.
//! As such, the bplist Date type is mapped onto a custom Date structure.
//! This is achieved by representing it as a structure with a special name
//! and field, similar to the way the TOML crate approaches it.

use serde::de;

use std::fmt;

use crate::value::Date;

/// Name of the Date pseudo-structure.
pub const STRUCT_NAME: &str = "$__biplist_private_Date";

/// Name of the field in the structure, holding seconds relative to the
/// Unix epoch as a double.
pub const STRUCT_FIELD: &str = "$__biplist_private_Date_unix_timestamp";

/// Custom deserializer for the Date pseudo-structure.
impl<'de> de::Deserialize<'de> for Date {
    fn deserialize<D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct DateVisitor;

        // Process the structure as a map.
        impl<'de> de::Visitor<'de> for DateVisitor {
            type Value = Date;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a date")
            }

            fn visit_map<V>(self, mut visitor: V) -> Result<Date, V::Error>
            where
                V: de::MapAccess<'de>,
            {
                if visitor.next_key::<DateKey>()?.is_none() {
                    return Err(de::Error::custom("date key not found"));
                }
                let timestamp: f64 = visitor.next_value()?;
                Ok(Date::from_unix_timestamp(timestamp))
            }
        }

        // Deserialize the Date structure with the special name and field.
        deserializer.deserialize_struct(
            STRUCT_NAME,
            &[STRUCT_FIELD],
            DateVisitor
        )
    }
}

struct DateKey;

/// Deserializes and validates the custom date struct field name.
impl<'de> de::Deserialize<'de> for DateKey {
    fn deserialize<D>(deserializer: D) -> Result<DateKey, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct FieldVisitor;

        impl<'de> de::Visitor<'de> for FieldVisitor {
            type Value = ();

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a valid date field")
            }

            fn visit_str<E>(self, s: &str) -> Result<(), E>
            where
                E: de::Error,
            {
                if s == STRUCT_FIELD {
                    Ok(())
                } else {
                    Err(de::Error::custom("expected field with custom name"))
                }
            }
        }

        deserializer.deserialize_identifier(FieldVisitor)?;
        Ok(DateKey)
    }
}
