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

//! `ylong_hpack` provides the [HPACK] header compression used by HTTP/2
//! servers.
//!
//! [HPACK]: https://httpwg.org/specs/rfc7541.html
//!
//! # Components
//! - [`HPack`]: the codec of one connection, decoding request header blocks
//!   and encoding response header blocks.
//! - [`StreamState`] and [`H2Stream`]: the receiver of decoded request
//!   headers.
//! - [`Headers`]: an ordered list of header fields.
//! - [`DateProvider`], [`HttpDate`] and [`SystemDate`]: the source of the
//!   `date` field appended to responses.
//! - [`huffman`]: the Huffman code of RFC7541 Appendix B.
//!
//! # Example
//! ```
//! use ylong_hpack::{HPack, Headers, SystemDate};
//!
//! let hpack = HPack::new(4096);
//! let mut headers = Headers::new();
//! headers.append("Content-Type", "text/html");
//!
//! let mut block = Vec::new();
//! hpack.encode_headers(404, &headers, &mut block, &SystemDate::new());
//! assert_eq!(block[0], 0x8d);
//! ```

pub mod config;
pub mod date;
pub mod error;
pub mod headers;
pub mod hpack;
pub mod huffman;
pub mod stream;

pub(crate) mod util;

pub use config::HpackConfig;
pub use date::{DateProvider, HttpDate, SystemDate, HTTP_DATE_LEN};
pub use error::{ErrorCode, H2Error};
pub use headers::Headers;
pub use hpack::table::{StaticTable, TableIndex};
pub use hpack::{HPack, IntegerError};
pub use stream::{H2Stream, StreamState};
