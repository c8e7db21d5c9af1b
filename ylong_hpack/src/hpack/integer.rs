// Copyright (c) 2023 Huawei Device Co., Ltd.
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! [Integer Representation] implementation of [HPACK].
//!
//! [Integer Representation]: https://httpwg.org/specs/rfc7541.html#integer.representation
//! [HPACK]: https://httpwg.org/specs/rfc7541.html
//!
//! # Introduction
//! Integers are used to represent name indexes, header field indexes, or
//! string lengths. An integer representation can start anywhere within an
//! octet. To allow for optimized processing, an integer representation always
//! finishes at the end of an octet.

use core::cmp::Ordering;

/// Possible errors of integer decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IntegerError {
    /// The input ended before the last continuation octet.
    #[error("integer representation is truncated")]
    Truncated,
    /// The value does not fit in `usize`.
    #[error("integer representation overflows")]
    Overflow,
}

/// `IntegerDecoder` implementation according to `Pseudocode to decode an
/// integer I` in `RFC7541 section-5.1`.
///
/// # Pseudocode
/// ```text
/// decode I from the next N bits
/// if I < 2^N - 1, return I
/// else
///     M = 0
///     repeat
///         B = next octet
///         I = I + (B & 127) * 2^M
///         M = M + 7
///     while B & 128 == 128
///     return I
/// ```
pub(crate) struct IntegerDecoder {
    index: usize,
    shift: u32,
}

impl IntegerDecoder {
    /// Calculates an integer based on the incoming first byte and mask.
    /// If no subsequent bytes exist, return the result directly, otherwise
    /// return the decoder itself.
    pub(crate) fn first_byte(byte: u8, mask: u8) -> Result<usize, Self> {
        let index = byte & mask;
        match index.cmp(&mask) {
            Ordering::Less => Ok(index as usize),
            _ => Err(Self {
                index: index as usize,
                shift: 0,
            }),
        }
    }

    /// Continues computing the integer based on the next byte of the input.
    /// Returns `Ok(Some(index))` if the result is obtained, otherwise returns
    /// `Ok(None)`, and returns `Err` in case of overflow.
    pub(crate) fn next_byte(&mut self, byte: u8) -> Result<Option<usize>, IntegerError> {
        let part = ((byte & 0x7f) as usize)
            .checked_shl(self.shift)
            .filter(|part| (part >> self.shift) == (byte & 0x7f) as usize)
            .ok_or(IntegerError::Overflow)?;
        self.index = self
            .index
            .checked_add(part)
            .ok_or(IntegerError::Overflow)?;
        self.shift += 7;
        match (byte & 0x80) == 0x00 {
            true => Ok(Some(self.index)),
            false => Ok(None),
        }
    }
}

/// Decodes an integer with an N-bit prefix from the front of `buf`, where
/// `mask` is `2^N - 1`. Returns the value and the number of octets consumed.
pub(crate) fn decode_uint(buf: &[u8], mask: u8) -> Result<(usize, usize), IntegerError> {
    let first = *buf.first().ok_or(IntegerError::Truncated)?;
    let mut decoder = match IntegerDecoder::first_byte(first, mask) {
        Ok(value) => return Ok((value, 1)),
        Err(decoder) => decoder,
    };
    for (pos, byte) in buf.iter().enumerate().skip(1) {
        if let Some(value) = decoder.next_byte(*byte)? {
            return Ok((value, pos + 1));
        }
    }
    Err(IntegerError::Truncated)
}

/// `IntegerEncoder` implementation according to `Pseudocode to represent an
/// integer I` in `RFC7541 section-5.1`.
///
/// # Pseudocode
/// ```text
/// if I < 2^N - 1, encode I on N bits
/// else
///     encode (2^N - 1) on N bits
///     I = I - (2^N - 1)
///     while I >= 128
///          encode (I % 128 + 128) on 8 bits
///          I = I / 128
///     encode I on 8 bits
/// ```
pub(crate) struct IntegerEncoder {
    i: usize,
    mask: u8,
    pre: u8,
    state: IntegerEncodeState,
}

/// Enumeration of states that the `IntegerEncoder` needs to use.
enum IntegerEncodeState {
    First,
    Other,
    Finish,
}

impl IntegerEncoder {
    /// Creates a new `IntegerEncoder`.
    pub(crate) fn new(i: usize, mask: u8, pre: u8) -> Self {
        Self {
            i,
            mask,
            pre,
            state: IntegerEncodeState::First,
        }
    }

    /// Gets the next byte of the integer. If no remaining bytes are calculated,
    /// return `None`.
    pub(crate) fn next_byte(&mut self) -> Option<u8> {
        match self.state {
            IntegerEncodeState::First => {
                if self.i < self.mask as usize {
                    self.state = IntegerEncodeState::Finish;
                    return Some(self.pre | (self.i as u8));
                }
                self.i -= self.mask as usize;
                self.state = IntegerEncodeState::Other;
                Some(self.pre | self.mask)
            }
            IntegerEncodeState::Other => Some(if self.i >= 128 {
                let res = (self.i & 0x7f) as u8;
                self.i >>= 7;
                res | 0x80
            } else {
                self.state = IntegerEncodeState::Finish;
                (self.i & 0x7f) as u8
            }),
            IntegerEncodeState::Finish => None,
        }
    }
}

/// Appends `value` to `dst` with an N-bit prefix, `mask` being `2^N - 1`.
/// `pre` holds the representation bits above the prefix.
pub(crate) fn encode_uint(dst: &mut Vec<u8>, value: usize, mask: u8, pre: u8) {
    let mut encoder = IntegerEncoder::new(value, mask, pre);
    while let Some(byte) = encoder.next_byte() {
        dst.push(byte);
    }
}

#[cfg(test)]
mod ut_integer {
    use super::{decode_uint, encode_uint, IntegerDecoder, IntegerEncoder, IntegerError};

    /// UT test cases for `IntegerDecoder`.
    ///
    /// # Brief
    /// 1. Creates an `IntegerDecoder`.
    /// 2. Calls `IntegerDecoder::first_byte()` and
    ///    `IntegerDecoder::next_byte()`, passing in the specified parameters.
    /// 3. Checks if the test results are correct.
    #[test]
    fn ut_integer_decode() {
        rfc7541_test_cases();

        macro_rules! integer_test_case {
            ($fb: literal, $mask: literal => $fb_res: expr) => {
                match IntegerDecoder::first_byte($fb, $mask) {
                    Ok(idx) => assert_eq!(idx, $fb_res),
                    _ => panic!("IntegerDecoder::first_byte() failed!"),
                }
            };
            ($fb: literal, $mask: literal $(, $nb: literal => $nb_res: expr)* $(,)?) => {
                match IntegerDecoder::first_byte($fb, $mask) {
                    Err(mut int) => {
                        $(match int.next_byte($nb) {
                            Ok(v) => assert_eq!(v, $nb_res),
                            _ => panic!("IntegerDecoder::next_byte() failed!"),
                        })*
                    }
                    _ => panic!("IntegerDecoder::first_byte() failed!"),
                }
            };
        }

        /// The following test cases are from RFC7541.
        fn rfc7541_test_cases() {
            // C.1.1. Example 1: Encoding 10 Using a 5-Bit Prefix
            integer_test_case!(0x0a, 0x1f => 10);

            // C.1.2.  Example 2: Encoding 1337 Using a 5-Bit Prefix
            integer_test_case!(
                0x1f, 0x1f,
                0x9a => None,
                0x0a => Some(1337),
            );

            // C.1.3.  Example 3: Encoding 42 Starting at an Octet Boundary
            integer_test_case!(0x2a, 0xff => 42);
        }
    }

    /// UT test cases for `decode_uint`.
    ///
    /// # Brief
    /// 1. Calls `decode_uint` on complete, truncated and oversized inputs.
    /// 2. Checks the value, the consumed length and the errors.
    #[test]
    fn ut_decode_uint() {
        assert_eq!(decode_uint(&[0x0a, 0xff], 0x1f), Ok((10, 1)));
        assert_eq!(decode_uint(&[0x1f, 0x9a, 0x0a, 0x00], 0x1f), Ok((1337, 3)));
        // The high bits above the prefix are ignored.
        assert_eq!(decode_uint(&[0xea], 0x1f), Ok((10, 1)));

        assert_eq!(decode_uint(&[], 0x7f), Err(IntegerError::Truncated));
        assert_eq!(decode_uint(&[0x1f, 0x9a], 0x1f), Err(IntegerError::Truncated));
        assert_eq!(decode_uint(&[0x7f, 0x80, 0x80], 0x7f), Err(IntegerError::Truncated));

        let mut overflow = vec![0x7f];
        overflow.extend_from_slice(&[0xff; 10]);
        overflow.push(0x01);
        assert_eq!(decode_uint(&overflow, 0x7f), Err(IntegerError::Overflow));

        // `usize::MAX` itself still decodes.
        let mut max = Vec::new();
        encode_uint(&mut max, usize::MAX, 0x7f, 0x00);
        assert_eq!(decode_uint(&max, 0x7f), Ok((usize::MAX, max.len())));
    }

    /// UT test cases for `IntegerEncoder`.
    ///
    /// # Brief
    /// 1. Creates an `IntegerEncoder`.
    /// 2. Calls `IntegerEncoder::next_byte()` until it returns `None`.
    /// 3. Checks if the test results are correct.
    #[test]
    fn ut_integer_encode() {
        rfc7541_test_cases();

        macro_rules! integer_test_case {
            ($int: expr, $mask: expr, $pre: expr $(, $byte: expr)* $(,)? ) => {
                let mut integer = IntegerEncoder::new($int, $mask, $pre);
                $(
                    assert_eq!(integer.next_byte(), Some($byte));
                )*
                assert_eq!(integer.next_byte(), None);
            }
        }

        /// The following test cases are from RFC7541.
        fn rfc7541_test_cases() {
            // C.1.1. Example 1: Encoding 10 Using a 5-Bit Prefix
            integer_test_case!(10, 0x1f, 0x00, 0x0a);

            // C.1.2. Example 2: Encoding 1337 Using a 5-Bit Prefix
            integer_test_case!(1337, 0x1f, 0x00, 0x1f, 0x9a, 0x0a);

            // C.1.3. Example 3: Encoding 42 Starting at an Octet Boundary
            integer_test_case!(42, 0xff, 0x00, 0x2a);
        }
    }

    /// UT test cases for `encode_uint`.
    ///
    /// # Brief
    /// 1. Calls `encode_uint` with a prefix that carries representation bits.
    /// 2. Checks the bytes written.
    #[test]
    fn ut_encode_uint() {
        let mut dst = vec![0xaa];
        encode_uint(&mut dst, 62, 0x7f, 0x80);
        assert_eq!(dst, [0xaa, 0xbe]);

        let mut dst = Vec::new();
        encode_uint(&mut dst, 127, 0x7f, 0x80);
        assert_eq!(dst, [0xff, 0x00]);

        let mut dst = Vec::new();
        encode_uint(&mut dst, 1337, 0x1f, 0x20);
        assert_eq!(dst, [0x3f, 0x9a, 0x0a]);
    }

    proptest::proptest! {
        /// `decode_uint` gives back what `encode_uint` wrote, for every prefix
        /// length from 1 to 8 bits and any representation bits above it.
        #[test]
        fn ut_integer_round_trip(
            value in proptest::prelude::any::<usize>(),
            bits in 1u32..=8,
            pre in proptest::prelude::any::<u8>(),
        ) {
            let mask = ((1u16 << bits) - 1) as u8;
            let mut buf = Vec::new();
            encode_uint(&mut buf, value, mask, pre & !mask);
            buf.push(0xff);
            proptest::prop_assert_eq!(decode_uint(&buf, mask), Ok((value, buf.len() - 1)));
        }
    }
}
