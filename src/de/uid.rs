//
// Copyright 2026 biplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! Serde does not provide a data type analogous to a UID.
//! As such, the bplist UID type is mapped onto a custom Uid structure.
//! This is achieved by representing it as a structure with a special name
//! and field, similar to the way Dates are handled.

use serde::de;

use std::fmt;

use crate::value::Uid;

/// Name of the UID pseudo-structure.
pub const STRUCT_NAME: &str = "$__biplist_private_Uid";

/// Name of the field in the structure, holding the identifier value.
pub const STRUCT_FIELD: &str = "$__biplist_private_Uid_value";

/// Custom deserializer for the UID pseudo-structure.
impl<'de> de::Deserialize<'de> for Uid {
    fn deserialize<D>(deserializer: D) -> Result<Uid, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct UidVisitor;

        // Process the structure as a map.
        impl<'de> de::Visitor<'de> for UidVisitor {
            type Value = Uid;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a UID")
            }

            fn visit_map<V>(self, mut visitor: V) -> Result<Uid, V::Error>
            where
                V: de::MapAccess<'de>,
            {
                if visitor.next_key::<UidKey>()?.is_none() {
                    return Err(de::Error::custom("uid key not found"));
                }
                let value: u64 = visitor.next_value()?;
                Ok(Uid::new(value))
            }
        }

        // Deserialize the UID structure with the special name and field.
        deserializer.deserialize_struct(
            STRUCT_NAME,
            &[STRUCT_FIELD],
            UidVisitor
        )
    }
}

struct UidKey;

/// Deserializes and validates the custom UID struct field name.
impl<'de> de::Deserialize<'de> for UidKey {
    fn deserialize<D>(deserializer: D) -> Result<UidKey, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct FieldVisitor;

        impl<'de> de::Visitor<'de> for FieldVisitor {
            type Value = ();

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a valid UID field")
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
        Ok(UidKey)
    }
}
