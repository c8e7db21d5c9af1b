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

mod common;

use common::init_test_logging;
use proptest::prelude::*;
use ylong_hpack::huffman::{huffman_decode, huffman_encode, huffman_encoded_len, HuffmanDecoder};
use ylong_hpack::{H2Stream, HPack, Headers, HpackConfig, HttpDate, StaticTable};

fn header_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,24}".prop_filter("forbidden in HTTP/2", |name| {
        name != "connection" && name != "te" && name != "content-length"
    })
}

fn header_value() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..100)
}

/// Builds a request block of `:method GET`, `:scheme http`, `:path /` and
/// the given fields as literals with incremental indexing.
fn request_block(fields: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut block = vec![0x82, 0x86, 0x84];
    for (name, value) in fields {
        block.push(0x40);
        block.push(name.len() as u8);
        block.extend_from_slice(name.as_bytes());
        block.push(value.len() as u8);
        block.extend_from_slice(value);
    }
    block
}

/// Splits the `:status` field off a response block. Returns the status and
/// the remaining fields.
fn split_status(block: &[u8]) -> (Vec<u8>, &[u8]) {
    if block[0] & 0x80 != 0 {
        let (_, status) = StaticTable::entry((block[0] & 0x7f) as usize).unwrap();
        return (status.to_vec(), &block[1..]);
    }
    assert_eq!(block[0], 0x08);
    let len = (block[1] & 0x7f) as usize;
    let octets = &block[2..2 + len];
    let status = if block[1] & 0x80 != 0 {
        let mut status = Vec::new();
        huffman_decode(octets, &mut status).unwrap();
        status
    } else {
        octets.to_vec()
    };
    (status, &block[2 + len..])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// SDV test cases for Huffman coding of arbitrary octets.
    ///
    /// # Brief
    /// 1. Encodes random octets.
    /// 2. Decodes them at once and in random fragments.
    /// 3. Checks that the octets come back.
    #[test]
    fn sdv_huffman_round_trip(src in proptest::collection::vec(any::<u8>(), 0..256), split in 0usize..256) {
        init_test_logging();
        let mut encoded = Vec::new();
        huffman_encode(&src, &mut encoded);
        prop_assert_eq!(encoded.len(), huffman_encoded_len(&src));

        let mut decoded = Vec::new();
        huffman_decode(&encoded, &mut decoded).unwrap();
        prop_assert_eq!(&decoded, &src);

        let split = split.min(encoded.len());
        let mut decoder = HuffmanDecoder::new();
        decoder.decode(&encoded[..split]).unwrap();
        decoder.decode(&encoded[split..]).unwrap();
        prop_assert_eq!(decoder.finish().unwrap(), src);
    }

    /// SDV test cases for decoding random request blocks.
    ///
    /// # Brief
    /// 1. Builds blocks of random literal fields.
    /// 2. Decodes them with a small dynamic table.
    /// 3. Checks the headers of the stream and that the table never exceeds
    ///    its size.
    #[test]
    fn sdv_hpack_decode_literals(
        fields in proptest::collection::vec((header_name(), header_value()), 0..16),
        table_size in 0usize..512,
    ) {
        init_test_logging();
        let mut hpack = HPack::new(table_size);
        let mut stream = H2Stream::new();
        hpack.decode(&request_block(&fields), &mut stream).unwrap();

        let decoded = stream
            .headers()
            .iter()
            .map(|(n, v)| (String::from_utf8(n.to_vec()).unwrap(), v.to_vec()))
            .collect::<Vec<_>>();
        prop_assert_eq!(decoded, fields.clone());
        prop_assert!(hpack.table_size() <= table_size);

        // Entries that fit are reachable from the newest one backwards.
        if let Some((name, value)) = hpack.table_entry(0) {
            let (last_name, last_value) = fields.last().unwrap();
            prop_assert_eq!(name, last_name.as_bytes());
            prop_assert_eq!(value, last_value.as_slice());
        }
    }

    /// SDV test cases for Huffman coding in the encoder.
    ///
    /// # Brief
    /// 1. Encodes random responses with and without Huffman coding.
    /// 2. Checks that the Huffman coded block is never longer and that both
    ///    end with the same date.
    #[test]
    fn sdv_hpack_encode_huffman_not_longer(
        fields in proptest::collection::vec(
            (header_name().prop_filter("date suppresses the appended one", |n| n != "date"), header_value()),
            0..8,
        ),
        status in 100u16..600,
    ) {
        init_test_logging();
        let headers = fields.iter().cloned().collect::<Headers>();
        let date = HttpDate::UNIX_EPOCH;

        let plain = HPack::new(4096);
        let mut config = HpackConfig::new();
        config.set_use_huffman_coding(true);
        let huffman = HPack::with_config(&config);

        let mut plain_block = Vec::new();
        plain.encode_headers(status, &headers, &mut plain_block, &date);
        let mut huffman_block = Vec::new();
        huffman.encode_headers(status, &headers, &mut huffman_block, &date);

        prop_assert!(huffman_block.len() <= plain_block.len());
        prop_assert!(plain_block.ends_with(date.as_bytes()));
        prop_assert!(huffman_block.ends_with(date.as_bytes()));
    }

    /// SDV test cases for decoding what the encoder produced.
    ///
    /// # Brief
    /// 1. Encodes random responses, with Huffman coding on or off.
    /// 2. Replaces the `:status` field with request pseudo headers and decodes
    ///    the block with a fresh `HPack`.
    /// 3. Checks the status, the names in HTTP/2 spelling, the values and the
    ///    appended date.
    #[test]
    fn sdv_hpack_encode_decode_round_trip(
        fields in proptest::collection::vec(("[a-zA-Z][a-zA-Z0-9_-]{0,24}", header_value()), 0..8)
            .prop_filter("forbidden in HTTP/2", |fields| fields.iter().all(|(name, _)| {
                let name = name.to_ascii_lowercase();
                name != "connection" && name != "te"
            })),
        status in 100u16..1000,
        use_huffman in any::<bool>(),
    ) {
        init_test_logging();
        let headers = fields.iter().cloned().collect::<Headers>();
        let date = HttpDate::from_bytes(b"Mon, 21 Oct 2013 20:13:21 GMT").unwrap();

        let mut config = HpackConfig::new();
        config.set_use_huffman_coding(use_huffman);
        let mut hpack = HPack::with_config(&config);
        let mut block = Vec::new();
        hpack.encode_headers(status, &headers, &mut block, &date);

        let (decoded_status, rest) = split_status(&block);
        prop_assert_eq!(decoded_status, status.to_string().into_bytes());

        let mut request = vec![0x82, 0x86, 0x84];
        request.extend_from_slice(rest);
        let mut stream = H2Stream::new();
        hpack.decode(&request, &mut stream).unwrap();
        prop_assert_eq!(hpack.table_len(), 0);

        let mut expected = fields
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase().replace('_', "-").into_bytes(), value.clone()))
            .collect::<Vec<_>>();
        if !headers.contains("date") {
            expected.push((b"date".to_vec(), date.as_bytes().to_vec()));
        }
        let decoded = stream
            .headers()
            .iter()
            .map(|(n, v)| (n.to_vec(), v.to_vec()))
            .collect::<Vec<_>>();
        prop_assert_eq!(decoded, expected);
    }
}
