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

//! [Huffman coding] of HPACK string literals.
//!
//! [Huffman coding]: https://www.rfc-editor.org/rfc/rfc7541.html#section-5.2
//!
//! # Huffman code in HTTP/2
//! There is a table of Huffman code in `RFC7541` Appendix B. This code was
//! generated from statistics obtained on a large sample of HTTP headers. It is
//! a canonical Huffman code with some tweaking to ensure that no symbol has a
//! unique code length.
//!
//! Decoding walks a precomputed automaton four bits at a time. Every state is
//! an internal node of the Huffman tree, so each input byte costs exactly two
//! table lookups and emits at most two symbols.

mod consts;

use core::cmp::Ordering;

use consts::{HUFFMAN_DECODE, HUFFMAN_ENCODE};

/// The state may legally end the string: only EOS-prefix padding (at most
/// seven `1` bits) has been consumed since the last symbol.
const MAYBE_EOS: u8 = 0x1;
/// The lookup emitted a symbol.
const DECODED: u8 = 0x2;
/// The input contains an invalid sequence, either the EOS symbol itself or
/// bits that lead outside the tree.
const ERROR: u8 = 0x4;

/// Converts a string to a Huffman code, and then put it into the
/// specified `Vec<u8>`.
pub fn huffman_encode(src: &[u8], dst: &mut Vec<u8>) {
    // `state` holds up to 64 pending output bits, most significant first.
    // `unfilled` is the number of low bits of `state` still free.
    //
    // `state`:
    // +----------+----------+----------------------------+
    // | Result A | Result B |          Unfilled          |
    // +----------+----------+----------------------------+
    // |<-------------------  64 bits  ------------------->
    //
    // A code that does not fit is split: its high part completes `state`,
    // which is flushed, and its low part starts the next `state`.
    let mut state = 0u64;
    let mut unfilled = 64;

    for byte in src.iter() {
        let (nbits, code) = HUFFMAN_ENCODE[*byte as usize];
        match unfilled.cmp(&nbits) {
            Ordering::Greater => {
                state |= code << (unfilled - nbits);
                unfilled -= nbits;
            }
            Ordering::Equal => {
                state |= code;
                dst.extend_from_slice(&state.to_be_bytes());
                state = 0;
                unfilled = 64;
            }
            // `rotate`:
            // +---------+-----------------+----------+
            // | Parts A |                 |  Parts B |
            // +---------+-----------------+----------+
            // `rotate & mask` keeps Parts B, `rotate & !mask` keeps Parts A.
            Ordering::Less => {
                let rotate = code.rotate_right((nbits - unfilled) as u32);
                let mask = u64::MAX >> (64 - unfilled);
                state |= rotate & mask;
                dst.extend_from_slice(&state.to_be_bytes());
                state = rotate & !mask;
                unfilled = 64 - (nbits - unfilled);
            }
        }
    }

    // The last partial octet is padded with the most significant bits of
    // EOS, which are all `1`.
    if unfilled != 64 {
        state |= u64::MAX >> (64 - unfilled);
        let bytes = &state.to_be_bytes();
        let len = (8 - (unfilled >> 3)) as usize;
        dst.extend_from_slice(&bytes.as_slice()[..len]);
    }
}

/// Returns the number of octets `huffman_encode` produces for `src`.
pub fn huffman_encoded_len(src: &[u8]) -> usize {
    let bits: u64 = src
        .iter()
        .map(|byte| HUFFMAN_ENCODE[*byte as usize].0)
        .sum();
    ((bits + 7) >> 3) as usize
}

/// Converts a Huffman code into a literal string at one time, and then put it
/// into the specified `Vec<u8>`.
///
/// The longest code of the table is 30 bits and the shortest is 5 bits, so one
/// input octet never yields more than two output octets. `dst` reserves
/// twice the input length up front.
pub fn huffman_decode(src: &[u8], dst: &mut Vec<u8>) -> Result<(), HuffmanDecodeError> {
    dst.reserve(src.len() * 2);
    let (state, flags) = huffman_decode_inner(src, dst, 0, 0)?;

    // The decoding succeeds in two cases:
    // 1. `state` is 0, all bits were consumed by complete symbols.
    // 2. `state` is not 0 but `MAYBE_EOS` is set, the remaining bits are valid
    // padding.
    if state != 0 && (flags & MAYBE_EOS) == 0 {
        return Err(HuffmanDecodeError::InvalidHuffmanCode);
    }
    Ok(())
}

fn huffman_decode_inner(
    src: &[u8],
    dst: &mut Vec<u8>,
    state: u8,
    flags: u8,
) -> Result<(u8, u8), HuffmanDecodeError> {
    let (mut state, mut flags) = (state, flags);

    for byte in src.iter() {
        for nibble in [byte >> 4, byte & 0xf] {
            let (next, sym, f) = HUFFMAN_DECODE[state as usize][nibble as usize];
            if (f & ERROR) == ERROR {
                return Err(HuffmanDecodeError::InvalidHuffmanCode);
            }
            if (f & DECODED) == DECODED {
                dst.push(sym);
            }
            (state, flags) = (next, f);
        }
    }
    Ok((state, flags))
}

/// Converts a Huffman code into a literal string, and then put it into the
/// specified `Vec<u8>`. Users can split the string into multiple slices and
/// then pass them into `HuffmanDecoder` to get the result.
pub struct HuffmanDecoder {
    state: u8,
    flags: u8,
    vec: Vec<u8>,
}

impl HuffmanDecoder {
    /// Creates a new, empty `HuffmanDecoder`.
    pub fn new() -> Self {
        Self {
            state: 0,
            flags: 0,
            vec: Vec::new(),
        }
    }

    /// Decodes input string. Stop when the `src` is used up.
    pub fn decode(&mut self, src: &[u8]) -> Result<(), HuffmanDecodeError> {
        self.vec.reserve(src.len() * 2);
        (self.state, self.flags) =
            huffman_decode_inner(src, &mut self.vec, self.state, self.flags)?;
        Ok(())
    }

    /// Finishes decoding and get the decoded result.
    pub fn finish(self) -> Result<Vec<u8>, HuffmanDecodeError> {
        if self.state != 0 && (self.flags & MAYBE_EOS) == 0 {
            return Err(HuffmanDecodeError::InvalidHuffmanCode);
        }
        Ok(self.vec)
    }
}

impl Default for HuffmanDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Possible errors in Huffman decoding operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HuffmanDecodeError {
    /// The input holds the EOS symbol, a sequence outside the code or
    /// padding that is not a prefix of EOS.
    #[error("invalid huffman code")]
    InvalidHuffmanCode,
}

#[cfg(test)]
mod ut_huffman {
    use super::{huffman_decode, huffman_encode, huffman_encoded_len, HuffmanDecoder};
    use crate::util::test_util::decode;

    /// UT test cases for `huffman_encode`.
    ///
    /// # Brief
    /// 1. Calls `huffman_encode` function, passing in the specified parameters.
    /// 2. Checks if the test results are correct.
    #[test]
    fn ut_huffman_encode() {
        rfc7541_test_cases();

        macro_rules! huffman_test_case {
            ($ctn: expr, $res: expr $(,)?) => {
                let mut vec = Vec::new();
                huffman_encode($ctn.as_bytes(), &mut vec);
                assert_eq!(vec, decode($res).unwrap());
                assert_eq!(huffman_encoded_len($ctn.as_bytes()), vec.len());
            };
        }

        /// The following test cases are from RFC7541.
        fn rfc7541_test_cases() {
            // C.4.1 First Request
            huffman_test_case!("www.example.com", "f1e3c2e5f23a6ba0ab90f4ff");

            // C.4.2 Second Request
            huffman_test_case!("no-cache", "a8eb10649cbf");

            // C.4.3 Third Request
            huffman_test_case!("custom-key", "25a849e95ba97d7f");
            huffman_test_case!("custom-value", "25a849e95bb8e8b4bf");

            // C.6.1 First Response
            huffman_test_case!("302", "6402");
            huffman_test_case!("private", "aec3771a4b");
            huffman_test_case!(
                "Mon, 21 Oct 2013 20:13:21 GMT",
                "d07abe941054d444a8200595040b8166e082a62d1bff"
            );
            huffman_test_case!(
                "https://www.example.com",
                "9d29ad171863c78f0b97c8e9ae82ae43d3"
            );

            // C.6.2 Second Response
            huffman_test_case!("307", "640eff");

            // C.6.3 Third Response
            huffman_test_case!("gzip", "9bd9ab");
            huffman_test_case!(
                "foo=ASDJKHQKBZXOQWEOPIUAXQWEOIU; max-age=3600; version=1",
                "94e7821dd7f2e6c7b335dfdfcd5b3960d5af27087f3672c1ab270fb5291f9587316065c003ed4ee5b1063d5007",
            );
        }
    }

    /// UT test cases for `huffman_decode`.
    ///
    /// # Brief
    /// 1. Calls `huffman_decode` function, passing in the specified parameters.
    /// 2. Checks if the test results are correct.
    #[test]
    fn ut_huffman_decode() {
        rfc7541_test_cases();

        macro_rules! huffman_test_case {
            ($ctn: expr, $res: expr $(,)?) => {
                let mut vec = Vec::new();
                huffman_decode(decode($ctn).unwrap().as_slice(), &mut vec).unwrap();
                assert_eq!(vec.as_slice(), $res.as_bytes())
            };
        }

        /// The following test cases are from RFC7541.
        fn rfc7541_test_cases() {
            // C.4.1 First Request
            huffman_test_case!("f1e3c2e5f23a6ba0ab90f4ff", "www.example.com");

            // C.4.2 Second Request
            huffman_test_case!("a8eb10649cbf", "no-cache");

            // C.4.3 Third Request
            huffman_test_case!("25a849e95bb8e8b4bf", "custom-value");

            // C.6.1 First Response
            huffman_test_case!("6402", "302");
            huffman_test_case!("aec3771a4b", "private");
            huffman_test_case!(
                "d07abe941054d444a8200595040b8166e082a62d1bff",
                "Mon, 21 Oct 2013 20:13:21 GMT"
            );

            // C.6.3 Third Response
            huffman_test_case!("9bd9ab", "gzip");
            huffman_test_case!(
                "94e7821dd7f2e6c7b335dfdfcd5b3960d5af27087f3672c1ab270fb5291f9587316065c003ed4ee5b1063d5007",
                "foo=ASDJKHQKBZXOQWEOPIUAXQWEOIU; max-age=3600; version=1"
            );
        }
    }

    /// UT test cases for invalid inputs of `huffman_decode`.
    ///
    /// # Brief
    /// 1. Calls `huffman_decode` with padding longer than 7 bits, with padding
    ///    that contains a `0` bit and with an encoded EOS symbol.
    /// 2. Checks that every call fails.
    #[test]
    fn ut_huffman_decode_invalid() {
        let mut vec = Vec::new();
        // Eight bits of padding.
        assert!(huffman_decode(&[0xff], &mut vec).is_err());
        assert!(huffman_decode(&decode("a8eb10649cbfff").unwrap(), &mut vec).is_err());
        // "0" (00000) followed by padding "010".
        vec.clear();
        assert!(huffman_decode(&[0x02], &mut vec).is_err());
        // EOS is 30 `1` bits.
        assert!(huffman_decode(&[0xff, 0xff, 0xff, 0xfc], &mut vec).is_err());
    }

    /// UT test cases for `huffman_encode` and `huffman_decode` over every
    /// octet value.
    ///
    /// # Brief
    /// 1. Encodes all 256 octets.
    /// 2. Decodes the result.
    /// 3. Checks that the input octets come back.
    #[test]
    fn ut_huffman_all_octets() {
        let src = (0..=255u8).collect::<Vec<u8>>();
        let mut encoded = Vec::new();
        huffman_encode(&src, &mut encoded);
        let mut decoded = Vec::new();
        huffman_decode(&encoded, &mut decoded).unwrap();
        assert_eq!(decoded, src);
    }

    /// UT test cases for `HuffmanDecoder::decode`.
    ///
    /// # Brief
    /// 1. Creates a `HuffmanDecoder`.
    /// 2. Calls `decode` and `finish` function, passing in the specified
    ///    parameters.
    /// 3. Checks if the test results are correct.
    #[test]
    fn ut_huffman_decoder() {
        macro_rules! huffman_test_case {
            ($content: expr, $result: expr) => {{
                let mut decoder = HuffmanDecoder::new();
                for cont in $content.as_slice().iter() {
                    let bytes = decode(cont).unwrap();
                    assert!(decoder.decode(&bytes).is_ok());
                }
                match decoder.finish() {
                    Ok(vec) => assert_eq!(vec, $result.as_bytes()),
                    _ => panic!("HuffmanDecoder::finish() failed!"),
                }
            }};
        }

        huffman_test_case!(["f1e3c2e5f23a6ba0ab90f4ff"], "www.example.com");
        huffman_test_case!(["640eff"], "307");

        // Fragmentation
        huffman_test_case!(["a8", "eb", "10", "64", "9c", "bf"], "no-cache");

        // Fragmentation + Blank
        huffman_test_case!(
            ["", "", "", "", "a8", "", "eb", "10", "", "64", "9c", "", "bf", "", ""],
            "no-cache"
        );
    }
}
