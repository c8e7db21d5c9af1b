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

//! HTTP [`Headers`], an ordered list of name and value pairs.
//!
//! Both names and values are raw octets. The collection keeps every pair in
//! insertion order, duplicates included, which is the order they go on the
//! wire. Lookups compare names ASCII case-insensitively.
//!
//! # Examples
//!
//! ```
//! use ylong_hpack::Headers;
//!
//! let mut headers = Headers::new();
//! headers.append("Content-Type", "text/html");
//! headers.append("Set-Cookie", "a=1");
//! headers.append("Set-Cookie", "b=2");
//!
//! assert_eq!(headers.get("content-type"), Some(&b"text/html"[..]));
//! assert_eq!(headers.get_all("set-cookie").count(), 2);
//! assert_eq!(headers.len(), 3);
//! ```

use core::slice;
use std::vec;

/// An ordered multimap of header names and values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(Vec<u8>, Vec<u8>)>,
}

impl Headers {
    /// Creates a new, empty `Headers`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ylong_hpack::Headers;
    ///
    /// let headers = Headers::new();
    /// assert!(headers.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the collection holds no pair.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends a pair after all existing ones. The name is kept as given.
    ///
    /// # Examples
    ///
    /// ```
    /// use ylong_hpack::Headers;
    ///
    /// let mut headers = Headers::new();
    /// headers.append("Accept", "text/html");
    /// headers.append(b"accept".to_vec(), b"*/*".to_vec());
    /// assert_eq!(headers.get("ACCEPT"), Some(&b"text/html"[..]));
    /// ```
    pub fn append<N, V>(&mut self, name: N, value: V)
    where
        N: Into<Vec<u8>>,
        V: Into<Vec<u8>>,
    {
        self.entries.push((name.into(), value.into()));
    }

    /// Gets the value of the first pair with this name.
    pub fn get<N: AsRef<[u8]>>(&self, name: N) -> Option<&[u8]> {
        self.get_all(name).next()
    }

    /// Gets the values of all pairs with this name, in order.
    pub fn get_all<N: AsRef<[u8]>>(&self, name: N) -> impl Iterator<Item = &[u8]> {
        self.entries
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name.as_ref()))
            .map(|(_, v)| v.as_slice())
    }

    /// Returns `true` if a pair with this name exists.
    pub fn contains<N: AsRef<[u8]>>(&self, name: N) -> bool {
        let name = name.as_ref();
        self.entries.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// Returns an iterator over the pairs in insertion order.
    pub fn iter(&self) -> HeadersIter<'_> {
        HeadersIter {
            inner: self.entries.iter(),
        }
    }
}

impl<N, V> FromIterator<(N, V)> for Headers
where
    N: Into<Vec<u8>>,
    V: Into<Vec<u8>>,
{
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut headers = Headers::new();
        headers.extend(iter);
        headers
    }
}

impl<N, V> Extend<(N, V)> for Headers
where
    N: Into<Vec<u8>>,
    V: Into<Vec<u8>>,
{
    fn extend<T: IntoIterator<Item = (N, V)>>(&mut self, iter: T) {
        for (name, value) in iter {
            self.append(name, value);
        }
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a [u8], &'a [u8]);
    type IntoIter = HeadersIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Headers {
    type Item = (Vec<u8>, Vec<u8>);
    type IntoIter = vec::IntoIter<(Vec<u8>, Vec<u8>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Borrowing iterator of [`Headers`].
pub struct HeadersIter<'a> {
    inner: slice::Iter<'a, (Vec<u8>, Vec<u8>)>,
}

impl<'a> Iterator for HeadersIter<'a> {
    type Item = (&'a [u8], &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(n, v)| (n.as_slice(), v.as_slice()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for HeadersIter<'_> {}

#[cfg(test)]
mod ut_headers {
    use crate::headers::Headers;

    /// UT test cases for `Headers::append` and `Headers::iter`.
    ///
    /// # Brief
    /// 1. Creates a `Headers` and appends pairs with duplicate names.
    /// 2. Iterates over it.
    /// 3. Checks that order and spelling are preserved.
    #[test]
    fn ut_headers_append_iter() {
        let mut headers = Headers::new();
        headers.append("X-Custom", "1");
        headers.append("server", "ylong");
        headers.append("x-custom", "2");

        let pairs = headers.iter().collect::<Vec<_>>();
        assert_eq!(
            pairs,
            vec![
                (&b"X-Custom"[..], &b"1"[..]),
                (&b"server"[..], &b"ylong"[..]),
                (&b"x-custom"[..], &b"2"[..]),
            ]
        );
        assert_eq!(headers.iter().len(), 3);
    }

    /// UT test cases for `Headers::get`, `Headers::get_all` and
    /// `Headers::contains`.
    ///
    /// # Brief
    /// 1. Creates a `Headers` from an iterator.
    /// 2. Looks names up with a different case.
    /// 3. Checks the results.
    #[test]
    fn ut_headers_get() {
        let headers = [("Date", "a"), ("Vary", "b"), ("vary", "c")]
            .into_iter()
            .collect::<Headers>();

        assert_eq!(headers.get("DATE"), Some(&b"a"[..]));
        assert_eq!(headers.get(b"vary"), Some(&b"b"[..]));
        assert_eq!(
            headers.get_all("VARY").collect::<Vec<_>>(),
            vec![&b"b"[..], &b"c"[..]]
        );
        assert!(headers.contains("date"));
        assert!(!headers.contains("dat"));
        assert_eq!(headers.get("etag"), None);
    }

    /// UT test cases for `Headers::into_iter`.
    ///
    /// # Brief
    /// 1. Creates a `Headers` and consumes it.
    /// 2. Checks the owned pairs.
    #[test]
    fn ut_headers_into_iter() {
        let mut headers = Headers::new();
        headers.extend([(b"a".to_vec(), b"1".to_vec())]);
        let pairs = headers.into_iter().collect::<Vec<_>>();
        assert_eq!(pairs, vec![(b"a".to_vec(), b"1".to_vec())]);
    }
}
