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

//! [Header Field Representation] implementation of [HPACK].
//!
//! [Header Field Representation]: https://www.rfc-editor.org/rfc/rfc7541.html#section-2.4
//! [HPACK]: https://httpwg.org/specs/rfc7541.html
//!
//! # Description from RFC7541
//! An encoded header field can be represented either as an index or as a
//! literal.
//!
//! An [indexed representation] defines a header field as a reference to an
//! entry in either the static table or the dynamic table.
//!
//! A [literal representation] defines a header field by specifying its
//! name and value. The header field name can be represented literally or as a
//! reference to an entry in either the static table or the dynamic table.
//! The header field value is represented literally.
//!
//! The first octet of every representation selects its type:
//!
//! ```text
//! 1xxxxxxx  Indexed Header Field
//! 01xxxxxx  Literal Header Field with Incremental Indexing
//! 001xxxxx  Dynamic Table Size Update
//! 0001xxxx  Literal Header Field Never Indexed
//! 0000xxxx  Literal Header Field without Indexing
//! ```
//!
//! [indexed representation]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6.1
//! [literal representation]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6.2

mod decoder;
mod encoder;

pub(crate) use decoder::ReprDecoder;
pub(crate) use encoder::ReprEncoder;

/// One decoded field representation.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Representation {
    /// [Indexed Header Field Representation].
    ///
    /// [Indexed Header Field Representation]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6.1
    ///
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 1 |        Index (7+)         |
    /// +---+---------------------------+
    /// ```
    Indexed { index: usize },

    /// [Literal Header Field with Incremental Indexing].
    ///
    /// [Literal Header Field with Incremental Indexing]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6.2.1
    ///
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 0 | 1 |      Index (6+)       |
    /// +---+---+-----------------------+
    /// | H |     Value Length (7+)     |
    /// +---+---------------------------+
    /// | Value String (Length octets)  |
    /// +-------------------------------+
    /// ```
    ///
    /// An index of 0 is followed by the name as a string literal.
    LiteralWithIndexing { name: Name, value: Vec<u8> },

    /// [Literal Header Field without Indexing], `0000` and a 4-bit prefix.
    ///
    /// [Literal Header Field without Indexing]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6.2.2
    LiteralWithoutIndexing { name: Name, value: Vec<u8> },

    /// [Literal Header Field Never Indexed], `0001` and a 4-bit prefix.
    ///
    /// [Literal Header Field Never Indexed]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6.2.3
    LiteralNeverIndexed { name: Name, value: Vec<u8> },

    /// [Dynamic Table Size Update].
    ///
    /// [Dynamic Table Size Update]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6.3
    ///
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 0 | 0 | 1 |   Max size (5+)   |
    /// +---+---------------------------+
    /// ```
    SizeUpdate { max_size: usize },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct PrefixBit(u8);

impl PrefixBit {
    pub(crate) const INDEXED: Self = Self(0x80);
    pub(crate) const LITERAL_WITH_INDEXING: Self = Self(0x40);
    pub(crate) const SIZE_UPDATE: Self = Self(0x20);
    pub(crate) const LITERAL_NEVER_INDEXED: Self = Self(0x10);
    pub(crate) const LITERAL_WITHOUT_INDEXING: Self = Self(0x00);

    pub(crate) fn from_u8(byte: u8) -> Self {
        match byte {
            x if x >= 0x80 => Self::INDEXED,
            x if x >= 0x40 => Self::LITERAL_WITH_INDEXING,
            x if x >= 0x20 => Self::SIZE_UPDATE,
            x if x >= 0x10 => Self::LITERAL_NEVER_INDEXED,
            _ => Self::LITERAL_WITHOUT_INDEXING,
        }
    }

    pub(crate) fn as_u8(&self) -> u8 {
        self.0
    }

    pub(crate) fn prefix_index_mask(&self) -> PrefixIndexMask {
        match self.0 {
            0x80 => PrefixIndexMask::INDEXED,
            0x40 => PrefixIndexMask::LITERAL_WITH_INDEXING,
            0x20 => PrefixIndexMask::SIZE_UPDATE,
            0x10 => PrefixIndexMask::LITERAL_NEVER_INDEXED,
            _ => PrefixIndexMask::LITERAL_WITHOUT_INDEXING,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct PrefixIndexMask(u8);

impl PrefixIndexMask {
    pub(crate) const INDEXED: Self = Self(0x7f);
    pub(crate) const LITERAL_WITH_INDEXING: Self = Self(0x3f);
    pub(crate) const SIZE_UPDATE: Self = Self(0x1f);
    pub(crate) const LITERAL_NEVER_INDEXED: Self = Self(0x0f);
    pub(crate) const LITERAL_WITHOUT_INDEXING: Self = Self(0x0f);
    /// Mask of a string length, the high bit being the Huffman flag.
    pub(crate) const STRING_LENGTH: Self = Self(0x7f);

    pub(crate) fn as_u8(&self) -> u8 {
        self.0
    }
}

/// The name part of a literal representation.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Name {
    /// Index into the static or dynamic table, never 0.
    Index(usize),
    Literal(Vec<u8>),
}

#[cfg(test)]
mod ut_representation {
    use super::{PrefixBit, PrefixIndexMask};

    /// UT test cases for `PrefixBit::from_u8`.
    ///
    /// # Brief
    /// 1. Classifies the first octet of every representation type.
    /// 2. Checks the type and the prefix mask.
    #[test]
    fn ut_prefix_bit_from_u8() {
        macro_rules! prefix_test_case {
            ($byte: expr, $prefix: expr, $mask: expr) => {
                let prefix = PrefixBit::from_u8($byte);
                assert_eq!(prefix, $prefix);
                assert_eq!(prefix.prefix_index_mask(), $mask);
            };
        }

        prefix_test_case!(0x82, PrefixBit::INDEXED, PrefixIndexMask::INDEXED);
        prefix_test_case!(0xff, PrefixBit::INDEXED, PrefixIndexMask::INDEXED);
        prefix_test_case!(
            0x41,
            PrefixBit::LITERAL_WITH_INDEXING,
            PrefixIndexMask::LITERAL_WITH_INDEXING
        );
        prefix_test_case!(0x3f, PrefixBit::SIZE_UPDATE, PrefixIndexMask::SIZE_UPDATE);
        prefix_test_case!(
            0x10,
            PrefixBit::LITERAL_NEVER_INDEXED,
            PrefixIndexMask::LITERAL_NEVER_INDEXED
        );
        prefix_test_case!(
            0x0f,
            PrefixBit::LITERAL_WITHOUT_INDEXING,
            PrefixIndexMask::LITERAL_WITHOUT_INDEXING
        );
        assert_eq!(PrefixBit::LITERAL_WITH_INDEXING.as_u8(), 0x40);
    }
}
