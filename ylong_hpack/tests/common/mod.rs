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

#![allow(dead_code)]

//! Helpers shared by the SDV tests.

use std::sync::Once;

use ylong_hpack::{H2Error, H2Stream, HPack};

static INIT_LOGGING: Once = Once::new();

/// Installs a `tracing` subscriber writing to the test output. Set
/// `RUST_LOG` to see the codec's debug messages.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Converts a string of hex digit pairs to octets. Whitespace is skipped.
/// Panics on malformed input, so a broken test vector fails the test.
pub fn hex(s: &str) -> Vec<u8> {
    let digits = s
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<Vec<_>>();
    assert_eq!(digits.len() % 2, 0, "odd number of hex digits");
    digits
        .chunks(2)
        .map(|pair| {
            let pair = pair.iter().collect::<String>();
            u8::from_str_radix(&pair, 16).expect("invalid hex digit")
        })
        .collect()
}

/// Decodes a hex header block into a fresh `H2Stream`.
pub fn decode_block(hpack: &mut HPack, block: &str) -> Result<H2Stream, H2Error> {
    let mut stream = H2Stream::new();
    hpack.decode(&hex(block), &mut stream)?;
    Ok(stream)
}
