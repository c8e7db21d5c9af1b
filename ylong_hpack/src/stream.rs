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

//! Request state filled in while a header block is decoded.
//!
//! HTTP/2 uses [Pseudo-Header fields] beginning with the `:` character
//! (ASCII 0x3a) to replace the request line of HTTP/1.x. The decoder hands
//! the recognized pseudo headers and every regular header to a
//! [`StreamState`], which is usually the request object of the stream that
//! carried the block. [`H2Stream`] is a plain implementation of it.
//!
//! [Pseudo-Header fields]: https://httpwg.org/specs/rfc9113.html#PseudoHeaderFields
//!
//! # Example
//! ```
//! use ylong_hpack::{H2Stream, StreamState};
//!
//! let mut stream = H2Stream::new();
//! stream.set_method(b"GET".to_vec());
//! assert_eq!(stream.method(), b"GET");
//! assert!(!stream.got_path());
//! ```

use crate::headers::Headers;

/// The receiver of decoded request headers.
///
/// Setters are called at most once per block for each pseudo header, the
/// decoder consults the getters to reject duplicates.
pub trait StreamState {
    /// Returns `true` once `set_path` has been called.
    fn got_path(&self) -> bool;

    /// Sets the path, without leading `/` and without query.
    fn set_path(&mut self, path: &[u8]);

    /// Sets the query, the part of `:path` after the first `?`.
    fn set_query(&mut self, query: &[u8]);

    /// Gets the method, empty if unset.
    fn method(&self) -> &[u8];

    /// Sets the method.
    fn set_method(&mut self, method: Vec<u8>);

    /// Gets the scheme, empty if unset.
    fn scheme(&self) -> &[u8];

    /// Sets the scheme.
    fn set_scheme(&mut self, scheme: Vec<u8>);

    /// Marks the request as received over `https`.
    fn set_secure(&mut self, secure: bool);

    /// Gets the server authority.
    fn authority(&self) -> Option<&[u8]>;

    /// Sets the server authority.
    fn set_authority(&mut self, authority: Vec<u8>);

    /// Sets the value of the `content-length` header.
    fn set_content_length(&mut self, len: i64);

    /// Appends a regular header.
    fn push_header(&mut self, name: Vec<u8>, value: Vec<u8>);
}

/// A request being received on an HTTP/2 stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct H2Stream {
    path: Option<Vec<u8>>,
    query: Vec<u8>,
    method: Vec<u8>,
    scheme: Vec<u8>,
    is_secure: bool,
    authority: Option<Vec<u8>>,
    content_length: i64,
    headers: Headers,
}

impl H2Stream {
    /// Creates an empty `H2Stream`. The content length starts at -1,
    /// meaning no `content-length` header was received.
    pub fn new() -> Self {
        Self {
            path: None,
            query: Vec::new(),
            method: Vec::new(),
            scheme: Vec::new(),
            is_secure: false,
            authority: None,
            content_length: -1,
            headers: Headers::new(),
        }
    }

    /// Gets the path, without leading `/`.
    pub fn path(&self) -> Option<&[u8]> {
        self.path.as_deref()
    }

    /// Gets the query.
    pub fn query(&self) -> &[u8] {
        &self.query
    }

    /// Returns `true` if the scheme is `https`.
    pub fn is_secure(&self) -> bool {
        self.is_secure
    }

    /// Gets the value of the `content-length` header, -1 if absent.
    pub fn content_length(&self) -> i64 {
        self.content_length
    }

    /// Gets the regular headers in arrival order.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }
}

impl Default for H2Stream {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamState for H2Stream {
    fn got_path(&self) -> bool {
        self.path.is_some()
    }

    fn set_path(&mut self, path: &[u8]) {
        self.path = Some(path.to_vec());
    }

    fn set_query(&mut self, query: &[u8]) {
        self.query = query.to_vec();
    }

    fn method(&self) -> &[u8] {
        &self.method
    }

    fn set_method(&mut self, method: Vec<u8>) {
        self.method = method;
    }

    fn scheme(&self) -> &[u8] {
        &self.scheme
    }

    fn set_scheme(&mut self, scheme: Vec<u8>) {
        self.scheme = scheme;
    }

    fn set_secure(&mut self, secure: bool) {
        self.is_secure = secure;
    }

    fn authority(&self) -> Option<&[u8]> {
        self.authority.as_deref()
    }

    fn set_authority(&mut self, authority: Vec<u8>) {
        self.authority = Some(authority);
    }

    fn set_content_length(&mut self, len: i64) {
        self.content_length = len;
    }

    fn push_header(&mut self, name: Vec<u8>, value: Vec<u8>) {
        self.headers.append(name, value);
    }
}
