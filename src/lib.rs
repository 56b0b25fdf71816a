//
// Copyright 2026 biplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! A native Rust encoder and decoder for Apple binary property lists
//! (bplist00).
//!
//! The exact codec operates on the dynamic [`Value`] model:
//!
//! ```
//! use biplist::Value;
//!
//! let document = Value::Array(vec![
//!     Value::from(1i64),
//!     Value::from("one"),
//! ]).to_vec().unwrap();
//!
//! assert_eq!(
//!     Value::from_slice(&document).unwrap(),
//!     Value::Array(vec![Value::from(1i64), Value::from("one")]),
//! );
//! ```
//!
//! A serde layer on top of the value model converts typed Rust data to and
//! from documents via [`to_vec`], [`from_slice`], [`to_value`] and
//! [`from_value`].
//!
//! Decoding a buffer without the `bplist0` signature fails with the
//! recoverable [`Error::NotBinaryPlist`], leaving the caller free to hand
//! the same bytes to a text plist codec; every other decoding failure is a
//! fatal [`Error::Format`].

mod de;
mod document;
mod error;
mod ser;

pub mod value;
pub use value::{from_value, to_value, Date, Uid, Value};

pub use de::{from_slice, is_binary_plist};
pub use error::{Error, FormatError, Result};
pub use ser::to_vec;
