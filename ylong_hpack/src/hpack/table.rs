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

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::error::{ErrorCode, H2Error};

/// RFC7541-4.1: The additional 32 octets account for an estimated overhead
/// associated with an entry.
pub(crate) const ENTRY_OVERHEAD: usize = 32;

/// Wire index of the first dynamic table entry.
pub(crate) const DYNAMIC_TABLE_OFFSET: usize = STATIC_TABLE.len() + 1;

/// `TableSearcher` is used to find specified content in static and dynamic
/// tables.
pub(crate) struct TableSearcher<'a> {
    dynamic: &'a DynamicTable,
}

impl<'a> TableSearcher<'a> {
    pub(crate) fn new(dynamic: &'a DynamicTable) -> Self {
        Self { dynamic }
    }

    /// Searches `Header` name in static and dynamic tables. Index 0 never
    /// matches.
    pub(crate) fn search_header_name(&self, index: usize) -> Option<Header> {
        if index < DYNAMIC_TABLE_OFFSET {
            StaticTable::header_name(index)
        } else {
            self.dynamic.header_name(index - DYNAMIC_TABLE_OFFSET)
        }
    }

    /// Searches `Header` and value in static and dynamic tables. Index 0
    /// never matches.
    pub(crate) fn search_header(&self, index: usize) -> Option<(Header, Vec<u8>)> {
        if index < DYNAMIC_TABLE_OFFSET {
            StaticTable::header(index)
        } else {
            self.dynamic.header(index - DYNAMIC_TABLE_OFFSET)
        }
    }
}

/// Result of a static table search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableIndex {
    /// Both name and value match the entry at this index.
    Header(usize),
    /// Only the name matches the entry at this index.
    HeaderName(usize),
}

/// The [`Dynamic Table`][dynamic_table] implementation of [HPACK].
///
/// [dynamic_table]: https://httpwg.org/specs/rfc7541.html#dynamic.table
/// [HPACK]: https://httpwg.org/specs/rfc7541.html
///
/// # Introduction
/// The dynamic table consists of a list of header fields maintained in
/// first-in, first-out order. The first and newest entry in a dynamic table is
/// at the lowest index, and the oldest entry of a dynamic table is at the
/// highest index.
///
/// The dynamic table is initially empty. Entries are added as each header block
/// is decompressed.
///
/// The dynamic table can contain duplicate entries (i.e., entries with the same
/// name and same value). Therefore, duplicate entries MUST NOT be treated as an
/// error by a decoder.
///
/// Two limits apply. `max_size` is the ceiling advertised through
/// `SETTINGS_HEADER_TABLE_SIZE`. `curr_max_size` is the size chosen by the
/// peer through dynamic table size updates and never exceeds `max_size`.
/// `curr_size` never exceeds `curr_max_size`.
pub(crate) struct DynamicTable {
    queue: VecDeque<(Header, Vec<u8>)>,
    curr_size: usize,
    curr_max_size: usize,
    max_size: usize,
}

impl DynamicTable {
    /// Creates a `Dynamic Table` based on the size limit.
    pub(crate) fn with_max_size(max_size: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            curr_size: 0,
            curr_max_size: max_size,
            max_size,
        }
    }

    pub(crate) fn curr_size(&self) -> usize {
        self.curr_size
    }

    pub(crate) fn curr_max_size(&self) -> usize {
        self.curr_max_size
    }

    pub(crate) fn max_size(&self) -> usize {
        self.max_size
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    /// Gets a `Header` by the given index.
    pub(crate) fn header_name(&self, index: usize) -> Option<Header> {
        self.queue.get(index).map(|(h, _)| h.clone())
    }

    /// Gets a `Header` and a value by the given index.
    pub(crate) fn header(&self, index: usize) -> Option<(Header, Vec<u8>)> {
        self.queue.get(index).cloned()
    }

    /// Gets a reference to the entry at the given index.
    pub(crate) fn entry(&self, index: usize) -> Option<(&[u8], &[u8])> {
        self.queue
            .get(index)
            .map(|(h, v)| (h.as_bytes(), v.as_slice()))
    }

    /// Inserts a `Header` and value pair at the front of the table, evicting
    /// the oldest entries first. Returns `false` if the entry is larger than
    /// the table and was not stored, in which case the table ends up empty.
    pub(crate) fn update(&mut self, header: Header, value: Vec<u8>) -> bool {
        let size = header.len() + value.len() + ENTRY_OVERHEAD;
        while self.curr_size + size > self.curr_max_size {
            if !self.evict() {
                break;
            }
        }
        if self.curr_size + size > self.curr_max_size {
            debug!(
                size,
                max_size = self.curr_max_size,
                "HPACK entry larger than the dynamic table is discarded"
            );
            return false;
        }
        self.curr_size += size;
        self.queue.push_front((header, value));
        true
    }

    /// Applies a dynamic table size update received from the peer.
    pub(crate) fn update_size(&mut self, curr_max_size: usize) -> Result<(), H2Error> {
        if curr_max_size > self.max_size {
            debug!(
                size = curr_max_size,
                max_size = self.max_size,
                "HPACK dynamic table size update exceeds the settings limit"
            );
            return Err(H2Error::ConnectionError(ErrorCode::CompressionError));
        }
        trace!(size = curr_max_size, "HPACK dynamic table size update");
        self.curr_max_size = curr_max_size;
        self.fit_size();
        Ok(())
    }

    /// Changes the settings limit. The current size limit is lowered with it
    /// if necessary.
    pub(crate) fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        if self.curr_max_size > max_size {
            self.curr_max_size = max_size;
            self.fit_size();
        }
    }

    /// Adjusts dynamic table content to fit its size.
    fn fit_size(&mut self) {
        while self.curr_size > self.curr_max_size {
            if !self.evict() {
                break;
            }
        }
    }

    fn evict(&mut self) -> bool {
        match self.queue.pop_back() {
            Some((header, value)) => {
                let size = header.len() + value.len() + ENTRY_OVERHEAD;
                trace!(size, "HPACK dynamic table entry evicted");
                self.curr_size -= size;
                true
            }
            None => false,
        }
    }
}

/// The [`Static Table`][static_table] implementation of [HPACK].
///
/// [static_table]: https://httpwg.org/specs/rfc7541.html#static.table
/// [HPACK]: https://httpwg.org/specs/rfc7541.html
///
/// # Introduction
/// The static table consists of a predefined static list of header fields,
/// see `RFC7541` Appendix A. Indices start at 1.
pub struct StaticTable;

impl StaticTable {
    /// Gets the entry at the given 1-based index.
    ///
    /// # Examples
    ///
    /// ```
    /// use ylong_hpack::StaticTable;
    ///
    /// assert_eq!(StaticTable::entry(2), Some((&b":method"[..], &b"GET"[..])));
    /// assert_eq!(StaticTable::entry(0), None);
    /// assert_eq!(StaticTable::entry(62), None);
    /// ```
    pub fn entry(index: usize) -> Option<(&'static [u8], &'static [u8])> {
        index
            .checked_sub(1)
            .and_then(|i| STATIC_TABLE.get(i))
            .map(|(name, value)| (name.as_bytes(), value.as_bytes()))
    }

    /// Searches the table for a name and value pair. A full match wins over
    /// a name match, and the lowest index wins among name matches.
    ///
    /// # Examples
    ///
    /// ```
    /// use ylong_hpack::{StaticTable, TableIndex};
    ///
    /// assert_eq!(StaticTable::index(b":method", b"POST"), Some(TableIndex::Header(3)));
    /// assert_eq!(StaticTable::index(b":method", b"PUT"), Some(TableIndex::HeaderName(2)));
    /// assert_eq!(StaticTable::index(b"x-custom", b""), None);
    /// ```
    pub fn index(name: &[u8], value: &[u8]) -> Option<TableIndex> {
        let mut index = None;
        for (n, (h, v)) in STATIC_TABLE.iter().enumerate() {
            match (h.as_bytes() == name, v.as_bytes() == value, &index) {
                (true, true, _) => return Some(TableIndex::Header(n + 1)),
                (true, false, None) => index = Some(TableIndex::HeaderName(n + 1)),
                _ => {}
            }
        }
        index
    }

    /// Gets the two octets of a literal without indexing representation whose
    /// name refers to the static entry of this regular header name. Pseudo
    /// headers and unknown names have no code. The name must already be
    /// lowercase.
    pub(crate) fn header_code(name: &[u8]) -> Option<[u8; 2]> {
        STATIC_NAME_INDEX
            .binary_search_by(|(n, _)| n.as_bytes().cmp(name))
            .ok()
            .map(|pos| [0x0f, STATIC_NAME_INDEX[pos].1 - 15])
    }

    /// Gets a `Header` by the given index.
    fn header_name(index: usize) -> Option<Header> {
        Self::entry(index).map(|(name, _)| Header::from_bytes(name))
    }

    /// Tries to get a `Header` and a value by the given index.
    fn header(index: usize) -> Option<(Header, Vec<u8>)> {
        Self::entry(index).map(|(name, value)| (Header::from_bytes(name), value.to_vec()))
    }
}

/// | Index | Header Name                   | Header Value  |
/// | :---: | :---:                         | :---:         |
/// | 1     | :authority                    |               |
/// | 2     | :method                       | GET           |
/// | ...   | ...                           | ...           |
/// | 61    | www-authenticate              |               |
const STATIC_TABLE: [(&str, &str); 61] = [
    (":authority", ""),
    (":method", "GET"),
    (":method", "POST"),
    (":path", "/"),
    (":path", "/index.html"),
    (":scheme", "http"),
    (":scheme", "https"),
    (":status", "200"),
    (":status", "204"),
    (":status", "206"),
    (":status", "304"),
    (":status", "400"),
    (":status", "404"),
    (":status", "500"),
    ("accept-charset", ""),
    ("accept-encoding", "gzip, deflate"),
    ("accept-language", ""),
    ("accept-ranges", ""),
    ("accept", ""),
    ("access-control-allow-origin", ""),
    ("age", ""),
    ("allow", ""),
    ("authorization", ""),
    ("cache-control", ""),
    ("content-disposition", ""),
    ("content-encoding", ""),
    ("content-language", ""),
    ("content-length", ""),
    ("content-location", ""),
    ("content-range", ""),
    ("content-type", ""),
    ("cookie", ""),
    ("date", ""),
    ("etag", ""),
    ("expect", ""),
    ("expires", ""),
    ("from", ""),
    ("host", ""),
    ("if-match", ""),
    ("if-modified-since", ""),
    ("if-none-match", ""),
    ("if-range", ""),
    ("if-unmodified-since", ""),
    ("last-modified", ""),
    ("link", ""),
    ("location", ""),
    ("max-forwards", ""),
    ("proxy-authenticate", ""),
    ("proxy-authorization", ""),
    ("range", ""),
    ("referer", ""),
    ("refresh", ""),
    ("retry-after", ""),
    ("server", ""),
    ("set-cookie", ""),
    ("strict-transport-security", ""),
    ("transfer-encoding", ""),
    ("user-agent", ""),
    ("vary", ""),
    ("via", ""),
    ("www-authenticate", ""),
];

/// Regular header names of the static table sorted by octets, each with the
/// index of its first entry.
const STATIC_NAME_INDEX: [(&str, u8); 47] = [
    ("accept", 19),
    ("accept-charset", 15),
    ("accept-encoding", 16),
    ("accept-language", 17),
    ("accept-ranges", 18),
    ("access-control-allow-origin", 20),
    ("age", 21),
    ("allow", 22),
    ("authorization", 23),
    ("cache-control", 24),
    ("content-disposition", 25),
    ("content-encoding", 26),
    ("content-language", 27),
    ("content-length", 28),
    ("content-location", 29),
    ("content-range", 30),
    ("content-type", 31),
    ("cookie", 32),
    ("date", 33),
    ("etag", 34),
    ("expect", 35),
    ("expires", 36),
    ("from", 37),
    ("host", 38),
    ("if-match", 39),
    ("if-modified-since", 40),
    ("if-none-match", 41),
    ("if-range", 42),
    ("if-unmodified-since", 43),
    ("last-modified", 44),
    ("link", 45),
    ("location", 46),
    ("max-forwards", 47),
    ("proxy-authenticate", 48),
    ("proxy-authorization", 49),
    ("range", 50),
    ("referer", 51),
    ("refresh", 52),
    ("retry-after", 53),
    ("server", 54),
    ("set-cookie", 55),
    ("strict-transport-security", 56),
    ("transfer-encoding", 57),
    ("user-agent", 58),
    ("vary", 59),
    ("via", 60),
    ("www-authenticate", 61),
];

/// A header field name. The pseudo headers a server cares about get their own
/// variants so that the decoder can dispatch on them without comparing bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Header {
    Authority,
    Method,
    Path,
    Scheme,
    Status,
    Other(Vec<u8>),
}

impl Header {
    pub(crate) fn from_bytes(name: &[u8]) -> Self {
        match name {
            b":authority" => Header::Authority,
            b":method" => Header::Method,
            b":path" => Header::Path,
            b":scheme" => Header::Scheme,
            b":status" => Header::Status,
            other => Header::Other(other.to_vec()),
        }
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        match self {
            Header::Authority => b":authority",
            Header::Method => b":method",
            Header::Path => b":path",
            Header::Scheme => b":scheme",
            Header::Status => b":status",
            Header::Other(name) => name.as_slice(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.as_bytes().len()
    }
}

#[cfg(test)]
mod ut_dynamic_table {
    use crate::hpack::table::{
        DynamicTable, Header, StaticTable, TableIndex, TableSearcher, STATIC_NAME_INDEX,
    };

    /// UT test cases for `DynamicTable::with_max_size`.
    ///
    /// # Brief
    /// 1. Calls `DynamicTable::with_max_size` to create a `DynamicTable`.
    /// 2. Checks the results.
    #[test]
    fn ut_dynamic_table_with_max_size() {
        let table = DynamicTable::with_max_size(4096);
        assert_eq!(table.len(), 0);
        assert_eq!(table.curr_size(), 0);
        assert_eq!(table.curr_max_size(), 4096);
        assert_eq!(table.max_size(), 4096);
    }

    /// UT test cases for `DynamicTable::header_name` and `DynamicTable::header`.
    ///
    /// # Brief
    /// 1. Creates a `DynamicTable`.
    /// 2. Inserts an entry and reads it back by index.
    /// 3. Checks the results.
    #[test]
    fn ut_dynamic_table_header() {
        let mut table = DynamicTable::with_max_size(52);
        assert!(table.header_name(0).is_none());
        assert!(table.header(0).is_none());

        assert!(table.update(Header::Authority, b"Authority".to_vec()));
        assert_eq!(table.header_name(0), Some(Header::Authority));
        assert_eq!(
            table.header(0),
            Some((Header::Authority, b"Authority".to_vec()))
        );
        assert_eq!(table.entry(0), Some((&b":authority"[..], &b"Authority"[..])));
        assert!(table.header(1).is_none());
    }

    /// UT test cases for `DynamicTable::update`.
    ///
    /// # Brief
    /// 1. Creates a `DynamicTable` that holds two small entries.
    /// 2. Inserts A, B and C in order.
    /// 3. Checks that A was evicted first and the newest entry is at index 0.
    #[test]
    fn ut_dynamic_table_update() {
        // Every entry below takes 1 + 1 + 32 = 34 octets.
        let mut table = DynamicTable::with_max_size(68);
        table.update(Header::Other(b"a".to_vec()), b"1".to_vec());
        table.update(Header::Other(b"b".to_vec()), b"2".to_vec());
        assert_eq!(table.len(), 2);
        assert_eq!(table.curr_size(), 68);

        table.update(Header::Other(b"c".to_vec()), b"3".to_vec());
        assert_eq!(table.len(), 2);
        assert_eq!(table.curr_size(), 68);
        assert_eq!(table.entry(0), Some((&b"c"[..], &b"3"[..])));
        assert_eq!(table.entry(1), Some((&b"b"[..], &b"2"[..])));
    }

    /// UT test cases for `DynamicTable::update` with an oversized entry.
    ///
    /// # Brief
    /// 1. Creates a `DynamicTable` holding one entry.
    /// 2. Inserts an entry larger than the table.
    /// 3. Checks that the entry is discarded and the table is emptied.
    #[test]
    fn ut_dynamic_table_update_oversized() {
        let mut table = DynamicTable::with_max_size(40);
        assert!(table.update(Header::Method, b"a".to_vec()));
        assert_eq!(table.curr_size(), 40);

        assert!(!table.update(Header::Other(b"x-long".to_vec()), b"value".to_vec()));
        assert_eq!(table.len(), 0);
        assert_eq!(table.curr_size(), 0);
    }

    /// UT test cases for `DynamicTable::update_size`.
    ///
    /// # Brief
    /// 1. Creates a `DynamicTable` with two entries.
    /// 2. Shrinks it below the size of both entries, then grows it beyond the
    ///    settings limit.
    /// 3. Checks the evictions and the error.
    #[test]
    fn ut_dynamic_table_update_size() {
        let mut table = DynamicTable::with_max_size(100);
        table.update(Header::Other(b"a".to_vec()), b"1".to_vec());
        table.update(Header::Other(b"b".to_vec()), b"2".to_vec());

        assert!(table.update_size(34).is_ok());
        assert_eq!(table.curr_max_size(), 34);
        assert_eq!(table.len(), 1);
        assert_eq!(table.entry(0), Some((&b"b"[..], &b"2"[..])));

        assert!(table.update_size(0).is_ok());
        assert_eq!(table.len(), 0);
        assert_eq!(table.curr_size(), 0);

        assert!(table.update_size(101).is_err());
        assert_eq!(table.curr_max_size(), 0);
        assert!(table.update_size(100).is_ok());
    }

    /// UT test cases for `DynamicTable::set_max_size`.
    ///
    /// # Brief
    /// 1. Creates a `DynamicTable` and fills it.
    /// 2. Lowers and then raises the settings limit.
    /// 3. Checks that the current limit follows when lowered only.
    #[test]
    fn ut_dynamic_table_set_max_size() {
        let mut table = DynamicTable::with_max_size(100);
        table.update(Header::Other(b"a".to_vec()), b"1".to_vec());
        table.update(Header::Other(b"b".to_vec()), b"2".to_vec());

        table.set_max_size(50);
        assert_eq!(table.max_size(), 50);
        assert_eq!(table.curr_max_size(), 50);
        assert_eq!(table.len(), 1);

        table.set_max_size(200);
        assert_eq!(table.max_size(), 200);
        assert_eq!(table.curr_max_size(), 50);
    }

    /// UT test cases for `StaticTable`.
    ///
    /// # Brief
    /// 1. Reads the boundaries of the static table.
    /// 2. Searches names and values.
    /// 3. Checks the static name codes.
    #[test]
    fn ut_static_table() {
        assert_eq!(StaticTable::entry(1), Some((&b":authority"[..], &b""[..])));
        assert_eq!(
            StaticTable::entry(16),
            Some((&b"accept-encoding"[..], &b"gzip, deflate"[..]))
        );
        assert_eq!(
            StaticTable::entry(61),
            Some((&b"www-authenticate"[..], &b""[..]))
        );
        assert_eq!(StaticTable::entry(0), None);
        assert_eq!(StaticTable::entry(62), None);

        assert_eq!(StaticTable::index(b":status", b"404"), Some(TableIndex::Header(13)));
        assert_eq!(
            StaticTable::index(b":status", b"302"),
            Some(TableIndex::HeaderName(8))
        );
        assert_eq!(StaticTable::index(b"Date", b""), None);

        assert_eq!(StaticTable::header_code(b"accept-charset"), Some([0x0f, 0x00]));
        assert_eq!(StaticTable::header_code(b"date"), Some([0x0f, 0x12]));
        assert_eq!(StaticTable::header_code(b"www-authenticate"), Some([0x0f, 0x2e]));
        assert_eq!(StaticTable::header_code(b":status"), None);
        assert_eq!(StaticTable::header_code(b"Content-Type"), None);
        assert_eq!(StaticTable::header_code(b"content"), None);
        assert_eq!(StaticTable::header_code(b""), None);
    }

    /// UT test cases for the sorted name index used by
    /// `StaticTable::header_code`.
    ///
    /// # Brief
    /// 1. Walks the sorted name index.
    /// 2. Checks that it is strictly ascending and that each entry names the
    ///    first static entry of that name.
    /// 3. Checks that every regular static name has a code.
    #[test]
    fn ut_static_name_index() {
        for pair in STATIC_NAME_INDEX.windows(2) {
            assert!(pair[0].0.as_bytes() < pair[1].0.as_bytes());
        }
        for (name, index) in STATIC_NAME_INDEX {
            assert_eq!(
                StaticTable::index(name.as_bytes(), b"\0"),
                Some(TableIndex::HeaderName(index as usize)),
                "{name}"
            );
        }
        for index in 15..=61 {
            let (name, _) = StaticTable::entry(index).unwrap();
            let first = match StaticTable::index(name, b"\0") {
                Some(TableIndex::HeaderName(first)) => first,
                other => panic!("unexpected {other:?}"),
            };
            assert_eq!(StaticTable::header_code(name), Some([0x0f, (first - 15) as u8]));
        }
    }

    /// UT test cases for `TableSearcher`.
    ///
    /// # Brief
    /// 1. Creates a `DynamicTable` with one entry.
    /// 2. Searches the wire indices around the static table boundary.
    /// 3. Checks the results.
    #[test]
    fn ut_table_searcher() {
        let mut table = DynamicTable::with_max_size(4096);
        table.update(Header::Other(b"custom-key".to_vec()), b"custom-value".to_vec());
        let searcher = TableSearcher::new(&table);

        assert_eq!(searcher.search_header(0), None);
        assert_eq!(searcher.search_header_name(0), None);
        assert_eq!(
            searcher.search_header(61),
            Some((Header::Other(b"www-authenticate".to_vec()), Vec::new()))
        );
        assert_eq!(
            searcher.search_header(62),
            Some((Header::Other(b"custom-key".to_vec()), b"custom-value".to_vec()))
        );
        assert_eq!(searcher.search_header_name(2), Some(Header::Method));
        assert_eq!(searcher.search_header(63), None);
    }

    proptest::proptest! {
        /// After any sequence of insertions and size updates, the size of the
        /// table is the sum of its entry sizes and stays within the current
        /// limit.
        #[test]
        fn ut_dynamic_table_size_invariant(
            ops in proptest::collection::vec(
                (proptest::option::of(0usize..200), "[a-z]{1,20}", "[ -~]{0,60}"),
                1..64,
            ),
        ) {
            let mut table = DynamicTable::with_max_size(150);
            for (size, name, value) in ops {
                match size {
                    Some(size) => {
                        let res = table.update_size(size);
                        proptest::prop_assert_eq!(res.is_ok(), size <= 150);
                    }
                    None => {
                        table.update(Header::from_bytes(name.as_bytes()), value.into_bytes());
                    }
                }
                let sum: usize = (0..table.len())
                    .filter_map(|i| table.entry(i))
                    .map(|(n, v)| n.len() + v.len() + 32)
                    .sum();
                proptest::prop_assert_eq!(table.curr_size(), sum);
                proptest::prop_assert!(table.curr_size() <= table.curr_max_size());
                proptest::prop_assert!(table.curr_max_size() <= table.max_size());
            }
        }
    }
}
