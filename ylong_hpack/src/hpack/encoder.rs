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

use tracing::trace;

use crate::date::DateProvider;
use crate::headers::Headers;
use crate::hpack::representation::ReprEncoder;
use crate::hpack::table::{StaticTable, TableIndex};

/// Index of `:status` in the static table.
const STATUS_INDEX: usize = 8;

/// Literal without indexing, name `date` (static index 33), raw value of
/// 29 octets.
const DATE_PREFIX: &[u8] = b"\x0f\x12\x1d";

/// Encoder implementation of [`HPACK`] for response headers.
///
/// [`HPACK`]: https://httpwg.org/specs/rfc7541.html
///
/// The encoder keeps no dynamic table: every field is either an indexed
/// static entry or a literal without indexing.
pub(crate) struct HpackEncoder {
    use_huffman: bool,
}

impl HpackEncoder {
    /// Create a `HpackEncoder` with the given huffman usage.
    pub(crate) fn new(use_huffman: bool) -> Self {
        Self { use_huffman }
    }

    /// Appends the header block of a response to `dst`.
    pub(crate) fn encode<D>(&self, status: u16, headers: &Headers, dst: &mut Vec<u8>, date: &D)
    where
        D: DateProvider + ?Sized,
    {
        let start = dst.len();
        let mut encoder = ReprEncoder::new(dst, self.use_huffman);

        let status = status.to_string();
        match StaticTable::index(b":status", status.as_bytes()) {
            Some(TableIndex::Header(index)) => encoder.encode_indexed(index),
            _ => encoder.encode_indexed_name(STATUS_INDEX, status.as_bytes()),
        }

        let mut has_date = false;
        let mut h2_name = Vec::new();
        for (name, value) in headers {
            if !has_date && name.eq_ignore_ascii_case(b"date") {
                has_date = true;
            }

            h2_case(name, &mut h2_name);
            match StaticTable::header_code(&h2_name) {
                Some(code) => encoder.encode_name_code(&code, value),
                None => encoder.encode_literal(&h2_name, value),
            }
        }

        if !has_date {
            encoder.encode_raw(DATE_PREFIX);
            encoder.encode_raw(date.http_date().as_bytes());
        }
        trace!(
            len = dst.len() - start,
            fields = headers.len(),
            "HPACK header block encoded"
        );
    }
}

/// Converts a header name to the form HTTP/2 requires: ASCII letters are
/// lowercased and `_` becomes `-`.
pub(crate) fn h2_case(name: &[u8], dst: &mut Vec<u8>) {
    dst.clear();
    dst.extend(name.iter().map(|byte| match byte {
        b'_' => b'-',
        other => other.to_ascii_lowercase(),
    }));
}
