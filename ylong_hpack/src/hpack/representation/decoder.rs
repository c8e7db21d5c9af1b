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

use tracing::debug;

use crate::error::{ErrorCode, H2Error};
use crate::hpack::integer::decode_uint;
use crate::hpack::representation::{Name, PrefixBit, PrefixIndexMask, Representation};
use crate::huffman::huffman_decode;

/// Splits a complete header block into `Representation`s.
///
/// The decoder borrows the whole block. Every truncated integer or string,
/// and every Huffman code that cannot be decoded, is a `CompressionError`.
pub(crate) struct ReprDecoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ReprDecoder<'a> {
    /// Creates a `ReprDecoder` positioned at the start of `buf`.
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Gets the number of octets consumed so far.
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// Decodes the next `Representation`, or returns `Ok(None)` when the block
    /// is used up.
    pub(crate) fn next_repr(&mut self) -> Result<Option<Representation>, H2Error> {
        let byte = match self.remaining().first() {
            Some(byte) => *byte,
            None => return Ok(None),
        };
        let prefix = PrefixBit::from_u8(byte);
        let index = self.decode_integer(prefix.prefix_index_mask())?;

        let repr = match prefix {
            PrefixBit::INDEXED => Representation::Indexed { index },
            PrefixBit::SIZE_UPDATE => Representation::SizeUpdate { max_size: index },
            _ => {
                let name = match index {
                    0 => Name::Literal(self.decode_name()?),
                    index => Name::Index(index),
                };
                let value = self.decode_string()?;
                match prefix {
                    PrefixBit::LITERAL_WITH_INDEXING => {
                        Representation::LiteralWithIndexing { name, value }
                    }
                    PrefixBit::LITERAL_NEVER_INDEXED => {
                        Representation::LiteralNeverIndexed { name, value }
                    }
                    _ => Representation::LiteralWithoutIndexing { name, value },
                }
            }
        };
        Ok(Some(repr))
    }

    fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    fn decode_integer(&mut self, mask: PrefixIndexMask) -> Result<usize, H2Error> {
        let (value, used) = decode_uint(self.remaining(), mask.as_u8()).map_err(|e| {
            debug!(position = self.pos, "HPACK integer decoding failed: {e}");
            H2Error::from(e)
        })?;
        self.pos += used;
        Ok(value)
    }

    /// Decodes a literal header field name. Names sent without Huffman coding
    /// must be lowercase, and no name may be empty.
    fn decode_name(&mut self) -> Result<Vec<u8>, H2Error> {
        let (huffman, octets) = self.decode_octets()?;
        let name = match huffman {
            true => Self::decode_huffman(octets)?,
            false if octets.iter().any(u8::is_ascii_uppercase) => {
                debug!("HPACK literal header name contains uppercase characters");
                return Err(H2Error::ConnectionError(ErrorCode::ProtocolError));
            }
            false => octets.to_vec(),
        };
        if name.is_empty() {
            debug!("HPACK literal header name is empty");
            return Err(H2Error::ConnectionError(ErrorCode::ProtocolError));
        }
        Ok(name)
    }

    /// Decodes a [String Literal Representation].
    ///
    /// [String Literal Representation]: https://www.rfc-editor.org/rfc/rfc7541.html#section-5.2
    ///
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | H |    String Length (7+)     |
    /// +---+---------------------------+
    /// |  String Data (Length octets)  |
    /// +-------------------------------+
    /// ```
    fn decode_string(&mut self) -> Result<Vec<u8>, H2Error> {
        match self.decode_octets()? {
            (true, octets) => Self::decode_huffman(octets),
            (false, octets) => Ok(octets.to_vec()),
        }
    }

    /// Reads the Huffman flag, the length and the raw octets of a string.
    fn decode_octets(&mut self) -> Result<(bool, &'a [u8]), H2Error> {
        let huffman = self
            .remaining()
            .first()
            .map(|byte| byte & 0x80 == 0x80)
            .unwrap_or(false);
        let len = self.decode_integer(PrefixIndexMask::STRING_LENGTH)?;
        let octets = self
            .remaining()
            .get(..len)
            .ok_or_else(|| {
                debug!(
                    position = self.pos,
                    len, "HPACK string literal exceeds the header block"
                );
                H2Error::ConnectionError(ErrorCode::CompressionError)
            })?;
        self.pos += len;
        Ok((huffman, octets))
    }

    fn decode_huffman(octets: &[u8]) -> Result<Vec<u8>, H2Error> {
        let mut dst = Vec::new();
        huffman_decode(octets, &mut dst).map_err(|e| {
            debug!("HPACK string literal: {e}");
            H2Error::from(e)
        })?;
        Ok(dst)
    }
}

#[cfg(test)]
mod ut_repr_decoder {
    use crate::error::{ErrorCode, H2Error};
    use crate::hpack::representation::{Name, ReprDecoder, Representation};
    use crate::util::test_util::decode;

    macro_rules! repr_test_case {
        ($hex: expr, $($repr: expr),* $(,)?) => {
            let bytes = decode($hex).unwrap();
            let mut decoder = ReprDecoder::new(&bytes);
            $(
                assert_eq!(decoder.next_repr(), Ok(Some($repr)));
            )*
            assert_eq!(decoder.next_repr(), Ok(None));
            assert_eq!(decoder.position(), bytes.len());
        };
    }

    macro_rules! repr_error_case {
        ($hex: expr, $code: expr) => {
            let bytes = decode($hex).unwrap();
            let mut decoder = ReprDecoder::new(&bytes);
            assert_eq!(decoder.next_repr(), Err(H2Error::ConnectionError($code)));
        };
    }

    /// UT test cases for `ReprDecoder::next_repr`.
    ///
    /// # Brief
    /// 1. Creates a `ReprDecoder` over each example of RFC7541 C.2 and C.4.1.
    /// 2. Calls `ReprDecoder::next_repr` until the block is used up.
    /// 3. Checks the representations and the consumed length.
    #[test]
    fn ut_repr_decoder_next_repr() {
        // C.2.1. Literal Header Field with Indexing
        repr_test_case!(
            "400a637573746f6d2d6b65790d637573746f6d2d686561646572",
            Representation::LiteralWithIndexing {
                name: Name::Literal(b"custom-key".to_vec()),
                value: b"custom-header".to_vec(),
            }
        );
        // C.2.2. Literal Header Field without Indexing
        repr_test_case!(
            "040c2f73616d706c652f70617468",
            Representation::LiteralWithoutIndexing {
                name: Name::Index(4),
                value: b"/sample/path".to_vec(),
            }
        );
        // C.2.3. Literal Header Field Never Indexed
        repr_test_case!(
            "100870617373776f726406736563726574",
            Representation::LiteralNeverIndexed {
                name: Name::Literal(b"password".to_vec()),
                value: b"secret".to_vec(),
            }
        );
        // C.2.4. Indexed Header Field
        repr_test_case!("82", Representation::Indexed { index: 2 });
        // C.4.1. First Request, with Huffman coding
        repr_test_case!(
            "828684418cf1e3c2e5f23a6ba0ab90f4ff",
            Representation::Indexed { index: 2 },
            Representation::Indexed { index: 6 },
            Representation::Indexed { index: 4 },
            Representation::LiteralWithIndexing {
                name: Name::Index(1),
                value: b"www.example.com".to_vec(),
            },
        );
        // Size updates chained in front of a field.
        repr_test_case!(
            "203fe11f82",
            Representation::SizeUpdate { max_size: 0 },
            Representation::SizeUpdate { max_size: 4096 },
            Representation::Indexed { index: 2 },
        );
    }

    /// UT test cases for malformed input of `ReprDecoder::next_repr`.
    ///
    /// # Brief
    /// 1. Creates a `ReprDecoder` over truncated or invalid blocks.
    /// 2. Checks the error code of each.
    #[test]
    fn ut_repr_decoder_errors() {
        // Truncated integer.
        repr_error_case!("ff", ErrorCode::CompressionError);
        // String length beyond the block.
        repr_error_case!("400a637573746f6d", ErrorCode::CompressionError);
        // Missing value.
        repr_error_case!("44", ErrorCode::CompressionError);
        // Invalid Huffman padding.
        repr_error_case!("4481ff", ErrorCode::CompressionError);
        // Raw name with uppercase letters.
        repr_error_case!("4003466f6f0162", ErrorCode::ProtocolError);
        // Empty name.
        repr_error_case!("00000162", ErrorCode::ProtocolError);
    }

    /// UT test cases for Huffman coded names of `ReprDecoder::next_repr`.
    ///
    /// # Brief
    /// 1. Decodes a literal whose name is Huffman coded.
    /// 2. Checks the name is returned as decoded.
    #[test]
    fn ut_repr_decoder_huffman_name() {
        // C.4.3 "custom-key: custom-value", both Huffman coded.
        repr_test_case!(
            "408825a849e95ba97d7f8925a849e95bb8e8b4bf",
            Representation::LiteralWithIndexing {
                name: Name::Literal(b"custom-key".to_vec()),
                value: b"custom-value".to_vec(),
            }
        );
    }
}
