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

use common::{hex, init_test_logging};
use ylong_hpack::huffman::huffman_decode;
use ylong_hpack::{DateProvider, Headers, HPack, HpackConfig, HttpDate, SystemDate};

const DATE: &[u8; 29] = b"Mon, 21 Oct 2013 20:13:21 GMT";

fn date() -> HttpDate {
    HttpDate::from_bytes(DATE).unwrap()
}

fn date_field() -> Vec<u8> {
    let mut field = hex("0f121d");
    field.extend_from_slice(DATE);
    field
}

/// SDV test cases for encoding the `:status` field.
///
/// # Brief
/// 1. Encodes responses without headers for every status.
/// 2. Checks that statuses of the static table use one octet and that the
///    others are literals with the `:status` name.
#[test]
fn sdv_hpack_encode_status() {
    init_test_logging();
    let hpack = HPack::new(4096);
    let statuses: [(u16, &str); 10] = [
        (200, "88"),
        (204, "89"),
        (206, "8a"),
        (304, "8b"),
        (400, "8c"),
        (404, "8d"),
        (500, "8e"),
        (302, "0803333032"),
        (101, "0803313031"),
        (503, "0803353033"),
    ];
    for (status, prefix) in statuses {
        let mut block = Vec::new();
        hpack.encode_headers(status, &Headers::new(), &mut block, &date());
        let mut expected = hex(prefix);
        expected.extend(date_field());
        assert_eq!(block, expected, "status {status}");
    }
}

/// SDV test cases for encoding regular headers.
///
/// # Brief
/// 1. Encodes a response with a static name, a custom name, and an
///    underscore spelled name.
/// 2. Checks every field of the block.
#[test]
fn sdv_hpack_encode_headers() {
    init_test_logging();
    let hpack = HPack::new(4096);
    let headers = [
        ("Content-Type", "text/html"),
        ("X_Custom", "a"),
        ("cache-control", "no-cache"),
    ]
    .into_iter()
    .collect::<Headers>();

    let mut block = Vec::new();
    hpack.encode_headers(200, &headers, &mut block, &date());

    let mut expected = hex(
        "88\
         0f10 0974 6578 742f 6874 6d6c\
         00 0878 2d63 7573 746f 6d 0161\
         0f09 086e 6f2d 6361 6368 65",
    );
    expected.extend(date_field());
    assert_eq!(block, expected);
}

/// SDV test cases for the `date` field.
///
/// # Brief
/// 1. Encodes a response whose headers contain `Date`.
/// 2. Checks that no other date is appended.
/// 3. Encodes with `SystemDate` and checks the 29-octet tail.
#[test]
fn sdv_hpack_encode_date() {
    init_test_logging();
    let hpack = HPack::new(4096);
    let mut headers = Headers::new();
    headers.append("Date", "Sun, 06 Nov 1994 08:49:37 GMT");

    let mut block = Vec::new();
    hpack.encode_headers(200, &headers, &mut block, &date());
    let mut expected = hex("88 0f12 1d");
    expected.extend_from_slice(b"Sun, 06 Nov 1994 08:49:37 GMT");
    assert_eq!(block, expected);

    let system = SystemDate::new();
    let mut block = Vec::new();
    hpack.encode_headers(404, &Headers::new(), &mut block, &system);
    assert_eq!(block.len(), 1 + 3 + 29);
    assert_eq!(&block[..4], &hex("8d0f121d")[..]);
    assert!(block[4..].ends_with(b" GMT"));

    // A trait object works as a provider too.
    let provider: &dyn DateProvider = &system;
    let mut block = Vec::new();
    hpack.encode_headers(200, &Headers::new(), &mut block, provider);
    assert_eq!(block.len(), 33);
}

/// SDV test cases for Huffman coding in the encoder.
///
/// # Brief
/// 1. Creates an `HPack` with Huffman coding enabled.
/// 2. Encodes a response.
/// 3. Checks that header values are Huffman coded when shorter and that the
///    appended date stays raw.
#[test]
fn sdv_hpack_encode_huffman() {
    init_test_logging();
    let mut config = HpackConfig::new();
    config.set_use_huffman_coding(true);
    let hpack = HPack::with_config(&config);

    let mut headers = Headers::new();
    headers.append("cache-control", "no-cache");
    headers.append("x-raw", "\u{7f}");

    let mut block = Vec::new();
    hpack.encode_headers(302, &headers, &mut block, &date());

    let mut expected = hex(
        "08 8264 02\
         0f09 86a8 eb10 649c bf\
         00 84f2 b583 f1 017f",
    );
    expected.extend(date_field());
    assert_eq!(block, expected);

    let mut decoded = Vec::new();
    huffman_decode(&block[7..13], &mut decoded).unwrap();
    assert_eq!(decoded, b"no-cache");
}

/// SDV test cases for appending to a non-empty buffer.
///
/// # Brief
/// 1. Encodes twice into the same buffer.
/// 2. Checks that the first block is kept.
#[test]
fn sdv_hpack_encode_append() {
    init_test_logging();
    let hpack = HPack::new(4096);
    let mut block = vec![0xaa];
    hpack.encode_headers(200, &Headers::new(), &mut block, &date());
    hpack.encode_headers(500, &Headers::new(), &mut block, &date());
    assert_eq!(block.len(), 1 + 33 + 33);
    assert_eq!(block[0], 0xaa);
    assert_eq!(block[1], 0x88);
    assert_eq!(block[34], 0x8e);
}
