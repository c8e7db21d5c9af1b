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

//! [`Error Codes`] in [`HTTP/2`] and the errors of the HPACK codec.
//!
//! [`Error Codes`]: https://httpwg.org/specs/rfc9113.html#ErrorCodes
//! [`HTTP/2`]: https://httpwg.org/specs/rfc9113.html
//!
//! # introduction
//! Error codes are 32-bit fields that are used in `RST_STREAM` and `GOAWAY`
//! frames to convey the reasons for the stream or connection error.
//!
//! The compression context is shared by every stream of a connection, so all
//! errors raised while decoding a header block are connection errors. Only
//! `ProtocolError` and `CompressionError` are produced by this crate, the
//! remaining codes exist for the frame layer that owns the connection.

use core::fmt;
use std::convert::TryFrom;

use crate::hpack::IntegerError;
use crate::huffman::HuffmanDecodeError;

/// The error returned by HPACK decoding.
#[derive(Debug, Eq, PartialEq, Copy, Clone, thiserror::Error)]
pub enum H2Error {
    /// [`Connection Error`] Handling.
    ///
    /// [`Connection Error`]: https://www.rfc-editor.org/rfc/rfc9113.html#name-connection-error-handling
    #[error("http2 connection error: {0}")]
    ConnectionError(ErrorCode),
}

impl H2Error {
    /// Gets the `ErrorCode` carried by this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use ylong_hpack::{ErrorCode, H2Error};
    ///
    /// let err = H2Error::ConnectionError(ErrorCode::CompressionError);
    /// assert_eq!(err.code(), ErrorCode::CompressionError);
    /// ```
    pub fn code(&self) -> ErrorCode {
        match self {
            H2Error::ConnectionError(code) => *code,
        }
    }
}

impl From<ErrorCode> for H2Error {
    fn from(code: ErrorCode) -> Self {
        H2Error::ConnectionError(code)
    }
}

impl From<HuffmanDecodeError> for H2Error {
    fn from(_: HuffmanDecodeError) -> Self {
        H2Error::ConnectionError(ErrorCode::CompressionError)
    }
}

impl From<IntegerError> for H2Error {
    fn from(_: IntegerError) -> Self {
        H2Error::ConnectionError(ErrorCode::CompressionError)
    }
}

/// [`Error Codes`] implementation.
///
/// [`Error Codes`]: https://httpwg.org/specs/rfc9113.html#ErrorCodes
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum ErrorCode {
    /// The associated condition is not a result of an error. For example,
    /// a `GOAWAY` might include this code to indicate graceful shutdown of a
    /// connection.
    NoError = 0x00,

    /// The endpoint detected an unspecific protocol error. This error is for
    /// use when a more specific error code is not available.
    ProtocolError = 0x01,

    /// The endpoint encountered an unexpected internal error.
    InternalError = 0x02,

    /// The endpoint detected that its peer violated the flow-control protocol.
    FlowControlError = 0x03,

    /// The endpoint sent a `SETTINGS` frame but did not receive a response in
    /// a timely manner.
    SettingsTimeout = 0x04,

    /// The endpoint received a frame after a stream was half-closed.
    StreamClosed = 0x05,

    /// The endpoint received a frame with an invalid size.
    FrameSizeError = 0x06,

    /// The endpoint refused the stream prior to performing any application
    /// processing.
    RefusedStream = 0x07,

    /// The endpoint uses this error code to indicate that the stream is no
    /// longer needed.
    Cancel = 0x08,

    /// The endpoint is unable to maintain the field section compression context
    /// for the connection.
    CompressionError = 0x09,

    /// The connection established in response to a `CONNECT` request was reset
    /// or abnormally closed.
    ConnectError = 0x0a,

    /// The endpoint detected that its peer is exhibiting a behavior that might
    /// be generating excessive load.
    EnhanceYourCalm = 0x0b,

    /// The underlying transport has properties that do not meet minimum
    /// security requirements.
    InadequateSecurity = 0x0c,

    /// The endpoint requires that HTTP/1.1 be used instead of HTTP/2.
    Http11Required = 0x0d,
}

impl ErrorCode {
    /// Gets the error code of the `ErrorCode` enum.
    pub fn into_code(self) -> u32 {
        self as u32
    }

    /// Gets the name of the code as written in `RFC9113`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NoError => "NO_ERROR",
            ErrorCode::ProtocolError => "PROTOCOL_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::FlowControlError => "FLOW_CONTROL_ERROR",
            ErrorCode::SettingsTimeout => "SETTINGS_TIMEOUT",
            ErrorCode::StreamClosed => "STREAM_CLOSED",
            ErrorCode::FrameSizeError => "FRAME_SIZE_ERROR",
            ErrorCode::RefusedStream => "REFUSED_STREAM",
            ErrorCode::Cancel => "CANCEL",
            ErrorCode::CompressionError => "COMPRESSION_ERROR",
            ErrorCode::ConnectError => "CONNECT_ERROR",
            ErrorCode::EnhanceYourCalm => "ENHANCE_YOUR_CALM",
            ErrorCode::InadequateSecurity => "INADEQUATE_SECURITY",
            ErrorCode::Http11Required => "HTTP_1_1_REQUIRED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u32> for ErrorCode {
    type Error = H2Error;
    fn try_from(value: u32) -> Result<Self, Self::Error> {
        let err = match value {
            0x00 => ErrorCode::NoError,
            0x01 => ErrorCode::ProtocolError,
            0x02 => ErrorCode::InternalError,
            0x03 => ErrorCode::FlowControlError,
            0x04 => ErrorCode::SettingsTimeout,
            0x05 => ErrorCode::StreamClosed,
            0x06 => ErrorCode::FrameSizeError,
            0x07 => ErrorCode::RefusedStream,
            0x08 => ErrorCode::Cancel,
            0x09 => ErrorCode::CompressionError,
            0x0a => ErrorCode::ConnectError,
            0x0b => ErrorCode::EnhanceYourCalm,
            0x0c => ErrorCode::InadequateSecurity,
            0x0d => ErrorCode::Http11Required,
            _ => return Err(H2Error::ConnectionError(ErrorCode::ProtocolError)),
        };
        Ok(err)
    }
}
