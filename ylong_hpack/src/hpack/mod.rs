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

//! [HPACK] implementation of the [HTTP/2 protocol].
//!
//! [HPACK]: https://httpwg.org/specs/rfc7541.html
//! [HTTP/2 protocol]: https://httpwg.org/specs/rfc9113.html
//!
//! # Introduction
//! HPACK compresses the header fields of HTTP/2 with a static table of
//! common fields, a dynamic table filled as blocks are decoded, and a static
//! Huffman code for string literals.
//!
//! The HPACK format is intentionally simple and inflexible. Both
//! characteristics reduce the risk of interoperability or security issues due
//! to implementation error.
//!
//! One [`HPack`] belongs to one connection. Header blocks must be decoded in
//! the order they arrive, as each of them may change the dynamic table that
//! the next one refers to.

mod decoder;
mod encoder;
mod integer;
mod representation;
pub(crate) mod table;

pub use integer::IntegerError;

pub(crate) use decoder::HpackDecoder;
pub(crate) use encoder::HpackEncoder;

use crate::config::HpackConfig;
use crate::date::DateProvider;
use crate::error::H2Error;
use crate::headers::Headers;
use crate::stream::StreamState;

/// The HPACK codec of one HTTP/2 connection.
///
/// Decoding maintains a dynamic table bounded by SETTINGS_HEADER_TABLE_SIZE.
/// Encoding uses the static table and literals only.
///
/// # Examples
///
/// ```
/// use ylong_hpack::{H2Stream, HPack, Headers, HttpDate};
///
/// let mut hpack = HPack::new(4096);
///
/// // RFC7541 C.3.1: GET http://www.example.com/
/// let block = [
///     0x82, 0x86, 0x84, 0x41, 0x0f, 0x77, 0x77, 0x77, 0x2e, 0x65, 0x78, 0x61,
///     0x6d, 0x70, 0x6c, 0x65, 0x2e, 0x63, 0x6f, 0x6d,
/// ];
/// let mut stream = H2Stream::new();
/// hpack.decode(&block, &mut stream).unwrap();
/// assert_eq!(stream.path(), Some(&b""[..]));
/// assert_eq!(hpack.table_size(), 57);
///
/// let mut headers = Headers::new();
/// headers.append("content-type", "text/plain");
/// let mut buf = Vec::new();
/// hpack.encode_headers(200, &headers, &mut buf, &HttpDate::UNIX_EPOCH);
/// assert_eq!(buf[0], 0x88);
/// ```
pub struct HPack {
    decoder: HpackDecoder,
    encoder: HpackEncoder,
}

impl HPack {
    /// Creates an `HPack` whose decoding dynamic table is bounded by
    /// `max_table_size`, with the other settings at their defaults.
    pub fn new(max_table_size: usize) -> Self {
        let mut config = HpackConfig::new();
        config.set_header_table_size(max_table_size);
        Self::with_config(&config)
    }

    /// Creates an `HPack` from an `HpackConfig`.
    pub fn with_config(config: &HpackConfig) -> Self {
        Self {
            decoder: HpackDecoder::with_max_size(
                config.header_table_size(),
                config.max_header_list_size(),
            ),
            encoder: HpackEncoder::new(config.use_huffman_coding()),
        }
    }

    /// Appends the header block of a response to `buf`.
    ///
    /// The status goes first, then `headers` in order. A `date` field is
    /// appended from `date` unless `headers` already has one.
    pub fn encode_headers<D>(&self, status: u16, headers: &Headers, buf: &mut Vec<u8>, date: &D)
    where
        D: DateProvider + ?Sized,
    {
        self.encoder.encode(status, headers, buf, date)
    }

    /// Decodes one complete header block of a request into `stream`.
    ///
    /// Any error leaves the compression context unusable, and the connection
    /// has to be closed with the returned code.
    pub fn decode<S>(&mut self, block: &[u8], stream: &mut S) -> Result<(), H2Error>
    where
        S: StreamState + ?Sized,
    {
        self.decoder.decode(block, stream)
    }

    /// Applies a new SETTINGS_HEADER_TABLE_SIZE. If the size currently chosen
    /// by the peer is larger, it is lowered and entries are evicted.
    pub fn set_max_table_size(&mut self, size: usize) {
        self.decoder.table_mut().set_max_size(size);
    }

    /// Applies a new SETTINGS_MAX_HEADER_LIST_SIZE.
    pub fn set_max_header_list_size(&mut self, size: usize) {
        self.decoder.update_header_list_size(size);
    }

    /// Gets the size of the dynamic table, in the sense of RFC7541 4.1.
    pub fn table_size(&self) -> usize {
        self.decoder.table().curr_size()
    }

    /// Gets the number of entries of the dynamic table.
    pub fn table_len(&self) -> usize {
        self.decoder.table().len()
    }

    /// Gets the SETTINGS_HEADER_TABLE_SIZE.
    pub fn max_table_size(&self) -> usize {
        self.decoder.table().max_size()
    }

    /// Gets the dynamic table size last chosen by the peer.
    pub fn current_max_table_size(&self) -> usize {
        self.decoder.table().curr_max_size()
    }

    /// Gets the entry of the dynamic table at `index`, 0 being the newest.
    pub fn table_entry(&self, index: usize) -> Option<(&[u8], &[u8])> {
        self.decoder.table().entry(index)
    }
}
