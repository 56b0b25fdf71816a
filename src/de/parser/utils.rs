//
// Copyright 2026 biplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

use nom::{
    IResult,
    bytes::complete::take,
    combinator::map_res,
};

use std::convert::TryFrom;

/// Returns a parser which recognizes a variable-length big-endian unsigned
/// number between 1 and 8 bytes long, inclusive.
///
/// Offsets, reference indices and trailer fields are all stored this way,
/// with the width determined elsewhere in the document.
pub fn be_u64_n(
    n: usize
) -> impl Fn(&[u8]) -> IResult<&[u8], u64> {
    assert!(n >= 1 && n <= 8, "number must be between 1 and 8 bytes, inclusive");
    move |input: &[u8]| {
        let (input, bytes) = take(n)(input)?;
        let mut value = 0u64;
        for byte in bytes {
            value = (value << 8) | u64::from(*byte);
        }
        Ok((input, value))
    }
}

/// Returns a parser which recognizes a variable-length big-endian unsigned
/// number between 1 and 8 bytes long, inclusive, converted safely into a
/// `usize`.
///
/// # Notes
///
/// 1. `n` may be up to 8 even on platforms with smaller word sizes.
/// 2. The value is range-checked before the cast.
pub fn be_usize_n(
    n: usize
) -> impl Fn(&[u8]) -> IResult<&[u8], usize> {
    move |input: &[u8]| {
        map_res(
            be_u64_n(n),
            usize::try_from
        )(input)
    }
}
