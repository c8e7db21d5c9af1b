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

//! The `Date` header appended to responses.
//!
//! HTTP/2 responses carry an [`IMF-fixdate`] such as
//! `Sun, 06 Nov 1994 08:49:37 GMT`, which is always 29 octets long. The
//! encoder writes it with a fixed 3-octet prefix, so the value is held in an
//! [`HttpDate`] whose length is part of its type.
//!
//! [`IMF-fixdate`]: https://www.rfc-editor.org/rfc/rfc9110.html#section-5.6.7

use core::cell::Cell;
use core::fmt;

use chrono::{DateTime, Utc};

/// Length of an `IMF-fixdate`.
pub const HTTP_DATE_LEN: usize = 29;

/// A 29-octet `IMF-fixdate`.
///
/// # Examples
///
/// ```
/// use ylong_hpack::HttpDate;
///
/// let date = HttpDate::from_bytes(b"Sun, 06 Nov 1994 08:49:37 GMT").unwrap();
/// assert_eq!(date.as_bytes(), b"Sun, 06 Nov 1994 08:49:37 GMT");
/// assert!(HttpDate::from_bytes(b"Sun, 06 Nov 1994").is_none());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HttpDate([u8; HTTP_DATE_LEN]);

impl HttpDate {
    /// `Thu, 01 Jan 1970 00:00:00 GMT`.
    pub const UNIX_EPOCH: HttpDate = HttpDate(*b"Thu, 01 Jan 1970 00:00:00 GMT");

    /// Creates an `HttpDate` from exactly 29 octets. Only the length is
    /// checked.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        <[u8; HTTP_DATE_LEN]>::try_from(bytes).ok().map(HttpDate)
    }

    /// Formats a UTC time. Years outside `1000..=9999` do not fit and yield
    /// `UNIX_EPOCH`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use ylong_hpack::HttpDate;
    ///
    /// let time = Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap();
    /// let date = HttpDate::from_datetime(&time);
    /// assert_eq!(date.as_bytes(), b"Sun, 06 Nov 1994 08:49:37 GMT");
    /// ```
    pub fn from_datetime(time: &DateTime<Utc>) -> Self {
        let formatted = time.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        Self::from_bytes(formatted.as_bytes()).unwrap_or(Self::UNIX_EPOCH)
    }

    /// Gets the octets of the date.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for HttpDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HttpDate")
            .field(&String::from_utf8_lossy(&self.0))
            .finish()
    }
}

/// Supplies the date of the response being encoded.
pub trait DateProvider {
    /// Gets the current date.
    fn http_date(&self) -> HttpDate;
}

impl DateProvider for HttpDate {
    fn http_date(&self) -> HttpDate {
        *self
    }
}

/// A `DateProvider` reading the system clock. The formatted date is cached
/// and only rebuilt when the second changes.
#[derive(Default)]
pub struct SystemDate {
    cache: Cell<Option<(i64, HttpDate)>>,
}

impl SystemDate {
    /// Creates a `SystemDate` with an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn date_at(&self, now: DateTime<Utc>) -> HttpDate {
        let secs = now.timestamp();
        match self.cache.get() {
            Some((cached, date)) if cached == secs => date,
            _ => {
                let date = HttpDate::from_datetime(&now);
                self.cache.set(Some((secs, date)));
                date
            }
        }
    }
}

impl DateProvider for SystemDate {
    fn http_date(&self) -> HttpDate {
        self.date_at(Utc::now())
    }
}

#[cfg(test)]
mod ut_date {
    use chrono::{TimeZone, Utc};

    use crate::date::{DateProvider, HttpDate, SystemDate, HTTP_DATE_LEN};

    /// UT test cases for `HttpDate`.
    ///
    /// # Brief
    /// 1. Creates `HttpDate`s from octets and from UTC times.
    /// 2. Checks the length rule and the formatting.
    #[test]
    fn ut_http_date() {
        assert!(HttpDate::from_bytes(&[b'a'; HTTP_DATE_LEN]).is_some());
        assert!(HttpDate::from_bytes(&[b'a'; HTTP_DATE_LEN + 1]).is_none());
        assert!(HttpDate::from_bytes(b"").is_none());

        let time = Utc.with_ymd_and_hms(2013, 10, 21, 20, 13, 21).unwrap();
        assert_eq!(
            HttpDate::from_datetime(&time).as_bytes(),
            b"Mon, 21 Oct 2013 20:13:21 GMT"
        );
        let time = Utc.timestamp_opt(0, 0).unwrap();
        assert_eq!(HttpDate::from_datetime(&time), HttpDate::UNIX_EPOCH);
        assert_eq!(HttpDate::UNIX_EPOCH.http_date(), HttpDate::UNIX_EPOCH);
    }

    /// UT test cases for `SystemDate`.
    ///
    /// # Brief
    /// 1. Creates a `SystemDate`.
    /// 2. Asks for the date twice within a second, then a second later.
    /// 3. Checks that the cache is reused and then refreshed.
    #[test]
    fn ut_system_date() {
        let provider = SystemDate::new();
        let time = Utc.with_ymd_and_hms(2013, 10, 21, 20, 13, 21).unwrap();
        let first = provider.date_at(time);
        assert_eq!(first.as_bytes(), b"Mon, 21 Oct 2013 20:13:21 GMT");
        assert_eq!(provider.cache.get(), Some((time.timestamp(), first)));

        let later = Utc.with_ymd_and_hms(2013, 10, 21, 20, 13, 22).unwrap();
        let second = provider.date_at(later);
        assert_eq!(second.as_bytes(), b"Mon, 21 Oct 2013 20:13:22 GMT");

        assert_eq!(provider.http_date().as_bytes().len(), HTTP_DATE_LEN);
    }
}
