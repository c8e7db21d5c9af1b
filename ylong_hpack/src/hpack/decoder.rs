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

use tracing::{debug, trace};

use crate::error::{ErrorCode, H2Error};
use crate::hpack::representation::{Name, ReprDecoder, Representation};
use crate::hpack::table::{DynamicTable, Header, TableSearcher, ENTRY_OVERHEAD};
use crate::stream::StreamState;

/// Decoder implementation of [`HPACK`].
///
/// [`HPACK`]: https://httpwg.org/specs/rfc7541.html
pub(crate) struct HpackDecoder {
    header_list_size: usize,
    table: DynamicTable,
}

impl HpackDecoder {
    /// Creates a `HpackDecoder` with the given max size.
    pub(crate) fn with_max_size(header_table_size: usize, max_header_list_size: usize) -> Self {
        Self {
            header_list_size: max_header_list_size,
            table: DynamicTable::with_max_size(header_table_size),
        }
    }

    pub(crate) fn table(&self) -> &DynamicTable {
        &self.table
    }

    pub(crate) fn table_mut(&mut self) -> &mut DynamicTable {
        &mut self.table
    }

    /// Decodes one complete header block into `stream`.
    pub(crate) fn decode<S>(&mut self, buf: &[u8], stream: &mut S) -> Result<(), H2Error>
    where
        S: StreamState + ?Sized,
    {
        let mut decoder = ReprDecoder::new(buf);
        let mut updater = Updater::new(&mut self.table, stream, self.header_list_size);
        while let Some(repr) = decoder.next_repr()? {
            updater.update(repr)?;
        }
        updater.finish()?;
        trace!(
            len = decoder.position(),
            table_size = self.table.curr_size(),
            "HPACK header block decoded"
        );
        Ok(())
    }

    /// Update the SETTING_HEADER_LIST_SIZE
    pub(crate) fn update_header_list_size(&mut self, size: usize) {
        self.header_list_size = size
    }
}

/// `Updater` applies the representations of one block to the `DynamicTable`
/// and the `StreamState`.
struct Updater<'a, S: ?Sized> {
    header_list_size: usize,
    header_size: usize,
    pseudo_allowed: bool,
    update_allowed: bool,
    table: &'a mut DynamicTable,
    stream: &'a mut S,
}

impl<'a, S> Updater<'a, S>
where
    S: StreamState + ?Sized,
{
    /// Creates a new `Updater`.
    fn new(table: &'a mut DynamicTable, stream: &'a mut S, header_list_size: usize) -> Self {
        Self {
            header_list_size,
            header_size: 0,
            pseudo_allowed: true,
            update_allowed: true,
            table,
            stream,
        }
    }

    /// Updates the `DynamicTable` and the `StreamState`.
    fn update(&mut self, repr: Representation) -> Result<(), H2Error> {
        if let Representation::SizeUpdate { max_size } = repr {
            return self.update_size(max_size);
        }
        // Size updates are only allowed at the beginning of a block.
        self.update_allowed = false;

        match repr {
            Representation::Indexed { index } => self.update_indexed(index),
            Representation::LiteralWithIndexing { name, value } => {
                self.update_literal_with_indexing(name, value)
            }
            Representation::LiteralWithoutIndexing { name, value }
            | Representation::LiteralNeverIndexed { name, value } => {
                self.update_literal_without_indexing(name, value)
            }
            Representation::SizeUpdate { .. } => Ok(()),
        }
    }

    fn update_size(&mut self, max_size: usize) -> Result<(), H2Error> {
        if !self.update_allowed {
            debug!("HPACK dynamic table size update after a header field");
            return Err(H2Error::ConnectionError(ErrorCode::CompressionError));
        }
        self.table.update_size(max_size)
    }

    fn update_indexed(&mut self, index: usize) -> Result<(), H2Error> {
        let searcher = TableSearcher::new(self.table);
        let (h, v) = searcher.search_header(index).ok_or_else(|| {
            debug!(index, "HPACK indexed header field out of range");
            H2Error::ConnectionError(ErrorCode::CompressionError)
        })?;
        self.accept(h, v)
    }

    fn update_literal_with_indexing(&mut self, name: Name, value: Vec<u8>) -> Result<(), H2Error> {
        let h = self.header_name(name)?;
        self.table.update(h.clone(), value.clone());
        self.accept(h, value)
    }

    fn update_literal_without_indexing(
        &mut self,
        name: Name,
        value: Vec<u8>,
    ) -> Result<(), H2Error> {
        let h = self.header_name(name)?;
        self.accept(h, value)
    }

    fn header_name(&self, name: Name) -> Result<Header, H2Error> {
        match name {
            Name::Index(index) => TableSearcher::new(self.table)
                .search_header_name(index)
                .ok_or_else(|| {
                    debug!(index, "HPACK header name index out of range");
                    H2Error::ConnectionError(ErrorCode::CompressionError)
                }),
            Name::Literal(octets) => Ok(Header::from_bytes(&octets)),
        }
    }

    /// Validates a decoded field and hands it to the stream.
    fn accept(&mut self, header: Header, value: Vec<u8>) -> Result<(), H2Error> {
        self.check_header_list_size(&header, &value)?;
        let is_pseudo = header.as_bytes().starts_with(b":");
        if is_pseudo && !self.pseudo_allowed {
            debug!("HPACK pseudo header after a regular header");
            return Err(H2Error::ConnectionError(ErrorCode::ProtocolError));
        }

        match header {
            Header::Path => self.accept_path(value),
            Header::Method => {
                if value.is_empty() || !self.stream.method().is_empty() {
                    return protocol_error("invalid or repeated :method");
                }
                self.stream.set_method(value);
                Ok(())
            }
            Header::Scheme => {
                if value.is_empty() || !self.stream.scheme().is_empty() {
                    return protocol_error("invalid or repeated :scheme");
                }
                self.stream.set_secure(value == b"https");
                self.stream.set_scheme(value);
                Ok(())
            }
            Header::Authority => {
                if self.stream.authority().is_some() {
                    return protocol_error("repeated :authority");
                }
                self.stream.set_authority(value);
                Ok(())
            }
            Header::Status => protocol_error(":status in a request"),
            Header::Other(_) if is_pseudo => protocol_error("unknown pseudo header"),
            Header::Other(name) => self.accept_regular(name, value),
        }
    }

    fn accept_path(&mut self, value: Vec<u8>) -> Result<(), H2Error> {
        if value.is_empty() || self.stream.got_path() {
            return protocol_error("empty or repeated :path");
        }
        let (path, query) = match value.iter().position(|b| *b == b'?') {
            Some(pos) => (&value[..pos], Some(&value[pos + 1..])),
            None => (value.as_slice(), None),
        };
        let start = path
            .iter()
            .position(|b| *b != b'/')
            .unwrap_or(path.len());
        self.stream.set_path(&path[start..]);
        if let Some(query) = query {
            self.stream.set_query(query);
        }
        Ok(())
    }

    fn accept_regular(&mut self, name: Vec<u8>, value: Vec<u8>) -> Result<(), H2Error> {
        self.pseudo_allowed = false;
        match name.as_slice() {
            b"connection" => return protocol_error("connection header in HTTP/2"),
            b"te" if value != b"trailers" => return protocol_error("te header other than trailers"),
            b"content-length" => self.stream.set_content_length(parse_content_length(&value)),
            _ => {}
        }
        self.stream.push_header(name, value);
        Ok(())
    }

    fn check_header_list_size(&mut self, key: &Header, value: &[u8]) -> Result<(), H2Error> {
        self.header_size += key.len() + value.len() + ENTRY_OVERHEAD;
        if self.header_size > self.header_list_size {
            debug!(
                size = self.header_size,
                max_size = self.header_list_size,
                "HPACK header list exceeds SETTINGS_MAX_HEADER_LIST_SIZE"
            );
            return Err(H2Error::ConnectionError(ErrorCode::ProtocolError));
        }
        Ok(())
    }

    /// Checks that the request pseudo headers are all present.
    fn finish(&self) -> Result<(), H2Error> {
        if !self.stream.got_path()
            || self.stream.method().is_empty()
            || self.stream.scheme().is_empty()
        {
            return protocol_error("missing :path, :method or :scheme");
        }
        Ok(())
    }
}

fn protocol_error(reason: &str) -> Result<(), H2Error> {
    debug!("HPACK header block rejected: {reason}");
    Err(H2Error::ConnectionError(ErrorCode::ProtocolError))
}

/// Parses a `content-length` value. Anything that is not a decimal integer
/// yields 0.
fn parse_content_length(value: &[u8]) -> i64 {
    std::str::from_utf8(value)
        .ok()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod ut_hpack_decoder {
    use crate::error::{ErrorCode, H2Error};
    use crate::hpack::decoder::{parse_content_length, HpackDecoder};
    use crate::stream::{H2Stream, StreamState};
    use crate::util::test_util::decode;

    const MAX_HEADER_LIST_SIZE: usize = 16 << 20;

    macro_rules! check_stream {
        (
            $stream: expr,
            { $m: expr, $sc: expr, $p: expr, $a: expr } $(,)?
        ) => {
            assert_eq!($stream.method(), $m);
            assert_eq!($stream.scheme(), $sc);
            assert_eq!($stream.path(), Some(&$p[..]));
            assert_eq!($stream.authority(), Some(&$a[..]));
        };
    }

    macro_rules! check_table {
        ($hpack: expr, $size: expr, { $($k: literal => $v: literal),* $(,)? } $(,)?) => {
            assert_eq!($hpack.table().curr_size(), $size);
            let mut _cnt = 0;
            $(
                assert_eq!($hpack.table().entry(_cnt), Some((&$k[..], &$v[..])));
                _cnt += 1;
            )*
            assert_eq!($hpack.table().len(), _cnt);
        };
    }

    macro_rules! hpack_test_case {
        ($hpack: expr, $input: literal) => {{
            let bytes = decode($input).unwrap();
            let mut stream = H2Stream::new();
            assert!($hpack.decode(bytes.as_slice(), &mut stream).is_ok());
            stream
        }};
    }

    /// UT test cases for `HpackDecoder`.
    ///
    /// # Brief
    /// 1. Creates a `HpackDecoder`.
    /// 2. Calls `HpackDecoder::decode()` with the request examples of RFC7541
    ///    C.3 and C.4, one fresh stream per block.
    /// 3. Checks the stream and the dynamic table after each block.
    #[test]
    fn ut_hpack_decoder() {
        // C.3. Request Examples without Huffman Coding
        let mut hpack = HpackDecoder::with_max_size(4096, MAX_HEADER_LIST_SIZE);
        // C.3.1. First Request
        let stream = hpack_test_case!(hpack, "828684410f7777772e6578616d706c652e636f6d");
        check_stream!(stream, { b"GET", b"http", b"", b"www.example.com" });
        assert!(!stream.is_secure());
        assert!(stream.headers().is_empty());
        check_table!(hpack, 57, { b":authority" => b"www.example.com" });

        // C.3.2. Second Request
        let stream = hpack_test_case!(hpack, "828684be58086e6f2d6361636865");
        check_stream!(stream, { b"GET", b"http", b"", b"www.example.com" });
        assert_eq!(stream.headers().get("cache-control"), Some(&b"no-cache"[..]));
        check_table!(hpack, 110, {
            b"cache-control" => b"no-cache",
            b":authority" => b"www.example.com",
        });

        // C.3.3. Third Request
        let stream = hpack_test_case!(
            hpack,
            "828785bf400a637573746f6d2d6b65790c637573746f6d2d76616c7565"
        );
        check_stream!(stream, { b"GET", b"https", b"index.html", b"www.example.com" });
        assert!(stream.is_secure());
        assert_eq!(stream.headers().get("custom-key"), Some(&b"custom-value"[..]));
        check_table!(hpack, 164, {
            b"custom-key" => b"custom-value",
            b"cache-control" => b"no-cache",
            b":authority" => b"www.example.com",
        });

        // C.4. Request Examples with Huffman Coding
        let mut hpack = HpackDecoder::with_max_size(4096, MAX_HEADER_LIST_SIZE);
        // C.4.1. First Request
        let stream = hpack_test_case!(hpack, "828684418cf1e3c2e5f23a6ba0ab90f4ff");
        check_stream!(stream, { b"GET", b"http", b"", b"www.example.com" });
        check_table!(hpack, 57, { b":authority" => b"www.example.com" });

        // C.4.2. Second Request
        let stream = hpack_test_case!(hpack, "828684be5886a8eb10649cbf");
        assert_eq!(stream.headers().get("cache-control"), Some(&b"no-cache"[..]));
        check_table!(hpack, 110, {
            b"cache-control" => b"no-cache",
            b":authority" => b"www.example.com",
        });

        // C.4.3. Third Request
        let stream = hpack_test_case!(
            hpack,
            "828785bf408825a849e95ba97d7f8925a849e95bb8e8b4bf"
        );
        check_stream!(stream, { b"GET", b"https", b"index.html", b"www.example.com" });
        check_table!(hpack, 164, {
            b"custom-key" => b"custom-value",
            b"cache-control" => b"no-cache",
            b":authority" => b"www.example.com",
        });
    }

    /// UT test cases for `:path` handling of `HpackDecoder`.
    ///
    /// # Brief
    /// 1. Decodes blocks whose `:path` carries slashes and a query.
    /// 2. Checks the path and the query set on the stream.
    #[test]
    fn ut_hpack_decoder_path() {
        let mut hpack = HpackDecoder::with_max_size(4096, MAX_HEADER_LIST_SIZE);
        // :method GET, :scheme http, :path "//a/b?x=1?y"
        let stream = hpack_test_case!(hpack, "8286040b2f2f612f623f783d313f79");
        assert_eq!(stream.path(), Some(&b"a/b"[..]));
        assert_eq!(stream.query(), b"x=1?y");
        assert_eq!(stream.authority(), None);

        // :path "/?q"
        let stream = hpack_test_case!(hpack, "828604032f3f71");
        assert_eq!(stream.path(), Some(&b""[..]));
        assert_eq!(stream.query(), b"q");
    }

    /// UT test cases for `content-length` handling of `HpackDecoder`.
    ///
    /// # Brief
    /// 1. Decodes a block with a `content-length` header.
    /// 2. Checks the content length of the stream.
    /// 3. Checks the lenient parsing of invalid values.
    #[test]
    fn ut_hpack_decoder_content_length() {
        let mut hpack = HpackDecoder::with_max_size(4096, MAX_HEADER_LIST_SIZE);
        // content-length: 1234 through static name index 28.
        let stream = hpack_test_case!(hpack, "8286840f0d0431323334");
        assert_eq!(stream.content_length(), 1234);
        assert_eq!(stream.headers().get("content-length"), Some(&b"1234"[..]));

        assert_eq!(parse_content_length(b"42"), 42);
        assert_eq!(parse_content_length(b"abc"), 0);
        assert_eq!(parse_content_length(b""), 0);
        assert_eq!(parse_content_length(&[0xff, 0x31]), 0);
    }

    /// UT test cases for `SETTINGS_MAX_HEADER_LIST_SIZE` in `HpackDecoder`.
    ///
    /// # Brief
    /// 1. Creates a `HpackDecoder` with a small header list size.
    /// 2. Decodes a block whose fields exceed it.
    /// 3. Checks that `ProtocolError` is returned, then raises the limit.
    #[test]
    fn ut_hpack_decoder_header_list_size() {
        // :method GET (42) + :scheme http (43) + :path / (38) = 123 octets.
        let bytes = decode("828684").unwrap();
        let mut hpack = HpackDecoder::with_max_size(4096, 122);
        let mut stream = H2Stream::new();
        assert_eq!(
            hpack.decode(&bytes, &mut stream),
            Err(H2Error::ConnectionError(ErrorCode::ProtocolError))
        );

        hpack.update_header_list_size(123);
        let mut stream = H2Stream::new();
        assert!(hpack.decode(&bytes, &mut stream).is_ok());
        assert!(stream.got_path());
    }
}
