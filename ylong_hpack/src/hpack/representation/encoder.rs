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

use crate::hpack::integer::encode_uint;
use crate::hpack::representation::{PrefixBit, PrefixIndexMask};
use crate::huffman::{huffman_encode, huffman_encoded_len};

/// Writes representations into a growable buffer. None of them adds entries
/// to a dynamic table.
pub(crate) struct ReprEncoder<'a> {
    dst: &'a mut Vec<u8>,
    use_huffman: bool,
}

impl<'a> ReprEncoder<'a> {
    /// Creates a `ReprEncoder` appending to `dst`. With `use_huffman` set,
    /// string literals are Huffman coded whenever that makes them shorter.
    pub(crate) fn new(dst: &'a mut Vec<u8>, use_huffman: bool) -> Self {
        Self { dst, use_huffman }
    }

    /// Writes an indexed header field.
    pub(crate) fn encode_indexed(&mut self, index: usize) {
        encode_uint(
            self.dst,
            index,
            PrefixIndexMask::INDEXED.as_u8(),
            PrefixBit::INDEXED.as_u8(),
        );
    }

    /// Writes a literal header field without indexing whose name is the
    /// table entry `index`.
    pub(crate) fn encode_indexed_name(&mut self, index: usize, value: &[u8]) {
        encode_uint(
            self.dst,
            index,
            PrefixIndexMask::LITERAL_WITHOUT_INDEXING.as_u8(),
            PrefixBit::LITERAL_WITHOUT_INDEXING.as_u8(),
        );
        self.encode_string(value);
    }

    /// Writes a literal header field without indexing whose name octets were
    /// computed ahead of time.
    pub(crate) fn encode_name_code(&mut self, code: &[u8], value: &[u8]) {
        self.dst.extend_from_slice(code);
        self.encode_string(value);
    }

    /// Writes a literal header field without indexing with a literal name.
    pub(crate) fn encode_literal(&mut self, name: &[u8], value: &[u8]) {
        self.dst.push(PrefixBit::LITERAL_WITHOUT_INDEXING.as_u8());
        self.encode_string(name);
        self.encode_string(value);
    }

    /// Writes raw octets that already form complete representations.
    pub(crate) fn encode_raw(&mut self, octets: &[u8]) {
        self.dst.extend_from_slice(octets);
    }

    /// Writes a string literal.
    pub(crate) fn encode_string(&mut self, src: &[u8]) {
        let mask = PrefixIndexMask::STRING_LENGTH.as_u8();
        if self.use_huffman {
            let len = huffman_encoded_len(src);
            if len < src.len() {
                encode_uint(self.dst, len, mask, 0x80);
                huffman_encode(src, self.dst);
                return;
            }
        }
        encode_uint(self.dst, src.len(), mask, 0x00);
        self.dst.extend_from_slice(src);
    }
}

#[cfg(test)]
mod ut_repr_encoder {
    use crate::hpack::representation::ReprEncoder;
    use crate::util::test_util::decode;

    /// UT test cases for `ReprEncoder`.
    ///
    /// # Brief
    /// 1. Creates a `ReprEncoder` without Huffman coding.
    /// 2. Writes each kind of representation.
    /// 3. Checks the octets against RFC7541 C.2.2 and C.2.4.
    #[test]
    fn ut_repr_encoder_plain() {
        let mut buf = Vec::new();
        let mut encoder = ReprEncoder::new(&mut buf, false);
        encoder.encode_indexed(2);
        encoder.encode_indexed_name(4, b"/sample/path");
        assert_eq!(buf, decode("82040c2f73616d706c652f70617468").unwrap());

        let mut buf = Vec::new();
        let mut encoder = ReprEncoder::new(&mut buf, false);
        encoder.encode_literal(b"x-a", b"b");
        encoder.encode_name_code(&[0x0f, 0x12], b"c");
        encoder.encode_raw(&[0x88]);
        assert_eq!(buf, decode("0003782d6101620f12016388").unwrap());

        // A name index of 15 or more needs a continuation octet.
        let mut buf = Vec::new();
        ReprEncoder::new(&mut buf, false).encode_indexed_name(33, b"");
        assert_eq!(buf, [0x0f, 0x12, 0x00]);
    }

    /// UT test cases for `ReprEncoder::encode_string` with Huffman coding.
    ///
    /// # Brief
    /// 1. Creates a `ReprEncoder` with Huffman coding.
    /// 2. Writes a string that shrinks and one that does not.
    /// 3. Checks that only the first is Huffman coded.
    #[test]
    fn ut_repr_encoder_huffman() {
        let mut buf = Vec::new();
        let mut encoder = ReprEncoder::new(&mut buf, true);
        encoder.encode_string(b"www.example.com");
        assert_eq!(buf, decode("8cf1e3c2e5f23a6ba0ab90f4ff").unwrap());

        // "{" has a 15-bit code.
        let mut buf = Vec::new();
        ReprEncoder::new(&mut buf, true).encode_string(b"{");
        assert_eq!(buf, [0x01, b'{']);
    }
}
