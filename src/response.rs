//! The outcome of a sent request.
//!
//! [`Exchange`] is returned by [`RequestBuilder::send()`](crate::RequestBuilder::send)
//! whether or not the network call succeeded.  A transport failure is
//! *recorded* here rather than returned as `Err`: check
//! [`has_error()`](Exchange::has_error) before trusting
//! [`response()`](Exchange::response).

use crate::error::TransportError;
use crate::options::Options;
use crate::transport::RawResponse;
use bytes::Bytes;
use http::StatusCode;
use std::borrow::Cow;

/// The record of the single request performed by `send()`.
pub struct Exchange {
    options: Options,
    outcome: Result<RawResponse, TransportError>,
}

impl std::fmt::Debug for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Exchange");
        s.field("url", &self.options.url());
        match &self.outcome {
            Ok(raw) => s
                .field("status", &raw.status)
                .field("body_len", &raw.body.len()),
            Err(e) => s.field("error", e),
        };
        s.finish()
    }
}

impl Exchange {
    pub(crate) fn new(options: Options, outcome: Result<RawResponse, TransportError>) -> Self {
        match &outcome {
            Ok(_raw) => {
                debug!(
                    status = _raw.status.as_u16(),
                    body_len = _raw.body.len(),
                    "response received",
                );
            }
            Err(_e) => {
                warn!(kind = ?_e.kind(), error = %_e, "transport reported an error");
            }
        }
        Self { options, outcome }
    }

    /// The response body as text, or `None` (the failure sentinel) if the
    /// transport failed.
    ///
    /// Invalid UTF-8 is replaced with U+FFFD; use
    /// [`response_bytes()`](Self::response_bytes) for the raw octets.  An
    /// empty body is `Some("")`, never `None`.
    pub fn response(&self) -> Option<Cow<'_, str>> {
        self.response_bytes().map(|b| String::from_utf8_lossy(b))
    }

    /// The raw response body, or `None` if the transport failed.
    pub fn response_bytes(&self) -> Option<&Bytes> {
        self.outcome.as_ref().ok().map(|raw| &raw.body)
    }

    /// The HTTP status of the response, or `None` if the transport failed
    /// before one was received.
    pub fn status_code(&self) -> Option<StatusCode> {
        self.outcome.as_ref().ok().map(|raw| raw.status)
    }

    /// Returns `true` if the transport reported an error.
    ///
    /// An HTTP error status (4xx/5xx) is a successful exchange and does not
    /// count.
    pub fn has_error(&self) -> bool {
        self.outcome.is_err()
    }

    /// Alias for [`has_error()`](Self::has_error).
    pub fn has_errors(&self) -> bool {
        self.has_error()
    }

    /// The transport's error message, or `None` if there was no error.
    pub fn error(&self) -> Option<&str> {
        self.transport_error().map(TransportError::message)
    }

    /// Alias for [`error()`](Self::error).
    pub fn errors(&self) -> Option<&str> {
        self.error()
    }

    /// The classified transport error, if any.
    pub fn transport_error(&self) -> Option<&TransportError> {
        self.outcome.as_ref().err()
    }

    /// The option set that was applied to the transport.
    pub fn options(&self) -> &Options {
        &self.options
    }
}
