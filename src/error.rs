//! Error types for httpchain.
//!
//! Two families, kept deliberately apart:
//!
//! - [`Error`] is *returned* by the builder call that detected the problem
//!   (bad URL, unknown method, body on a GET, ...).  Query it with
//!   [`is_invalid_url()`](Error::is_invalid_url),
//!   [`is_method_not_set()`](Error::is_method_not_set) and friends.
//! - [`TransportError`] is *recorded* on the [`Exchange`](crate::Exchange)
//!   when the network call itself fails.  [`send()`](crate::RequestBuilder::send)
//!   still returns `Ok`; callers poll
//!   [`has_error()`](crate::Exchange::has_error) afterwards.

use std::fmt;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The error type for builder validation and construction.
///
/// Errors carry a `kind` classification that powers the `is_*()` query
/// methods.  `Display` prints a fixed phrase per kind; the offending input
/// (if any) is kept for `Debug`.
pub struct Error {
    pub(crate) kind: ErrorKind,
    pub(crate) message: String,
    pub(crate) source: Option<BoxError>,
}

/// Classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    /// The HTTP client could not be initialised on this host.
    TransportUnavailable,
    /// `url()` was given something that is not an absolute URL.
    InvalidUrl,
    /// `method()` was given something outside GET/POST/PUT/PATCH/DELETE.
    InvalidMethod,
    /// `body()` or `send()` was called before `method()`.
    MethodNotSet,
    /// `send()` was called before `url()`.
    UrlNotSet,
    /// `body()` was called with a non-empty body on GET or DELETE.
    BodyNotAllowed,
    /// The body could not be serialized.
    Encode,
}

impl Error {
    /// Returns `true` if the transport could not be initialised.
    pub fn is_transport_unavailable(&self) -> bool {
        matches!(self.kind, ErrorKind::TransportUnavailable)
    }

    /// Returns `true` if a URL failed absolute-URL validation.
    pub fn is_invalid_url(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidUrl)
    }

    /// Returns `true` if a method string was not one of the supported verbs.
    pub fn is_invalid_method(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidMethod)
    }

    /// Returns `true` if an operation needed a method that was never set.
    pub fn is_method_not_set(&self) -> bool {
        matches!(self.kind, ErrorKind::MethodNotSet)
    }

    /// Returns `true` if `send()` ran without a URL.
    pub fn is_url_not_set(&self) -> bool {
        matches!(self.kind, ErrorKind::UrlNotSet)
    }

    /// Returns `true` if a body was supplied for GET or DELETE.
    pub fn is_body_not_allowed(&self) -> bool {
        matches!(self.kind, ErrorKind::BodyNotAllowed)
    }

    /// Returns `true` if the request body could not be serialized.
    pub fn is_encode(&self) -> bool {
        matches!(self.kind, ErrorKind::Encode)
    }

    /// Attach a source error (builder pattern).
    #[must_use]
    pub(crate) fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    // -- Internal constructors --

    fn with_kind(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
            source: None,
        }
    }

    pub(crate) fn transport_unavailable(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::TransportUnavailable, msg)
    }

    pub(crate) fn invalid_url(input: &str) -> Self {
        Self::with_kind(ErrorKind::InvalidUrl, format!("rejected URL `{input}`"))
    }

    pub(crate) fn invalid_method(input: &str) -> Self {
        Self::with_kind(ErrorKind::InvalidMethod, format!("rejected method `{input}`"))
    }

    pub(crate) fn method_not_set() -> Self {
        Self::with_kind(ErrorKind::MethodNotSet, String::new())
    }

    pub(crate) fn url_not_set() -> Self {
        Self::with_kind(ErrorKind::UrlNotSet, String::new())
    }

    pub(crate) fn body_not_allowed(method: crate::Method) -> Self {
        Self::with_kind(ErrorKind::BodyNotAllowed, format!("method is {method}"))
    }

    pub(crate) fn encode(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Encode, msg)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self.kind {
            ErrorKind::TransportUnavailable => "HTTP transport is unavailable",
            ErrorKind::InvalidUrl => "invalid URL",
            ErrorKind::InvalidMethod => "invalid HTTP method",
            ErrorKind::MethodNotSet => "HTTP method is not set",
            ErrorKind::UrlNotSet => "URL is not set",
            ErrorKind::BodyNotAllowed => "GET and DELETE methods cannot have a body",
            ErrorKind::Encode => "error encoding request body",
        })
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("source", &self.source)
            .finish()
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| &**e as &(dyn std::error::Error + 'static))
    }
}

// ---------------------------------------------------------------------------
// TransportError -- polled, never returned from the builder
// ---------------------------------------------------------------------------

/// A failure reported by the transport while performing the request.
///
/// `Display` prints the transport's message, which is what
/// [`Exchange::error()`](crate::Exchange::error) returns.
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
    source: Option<BoxError>,
}

/// Classification of a [`TransportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportErrorKind {
    /// The URL in the applied option set could not be used.
    Url,
    /// DNS resolution, TCP connect or TLS handshake failed.
    Connect,
    /// A configured timeout elapsed.
    Timeout,
    /// The redirect limit was exceeded or a redirect was malformed.
    Redirect,
    /// Any other failure while building or sending the request.
    Request,
    /// The response body could not be read.
    Body,
}

impl TransportError {
    /// Create a transport error.  Intended for [`Transport`](crate::Transport)
    /// implementations outside this crate.
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying cause (builder pattern).
    #[must_use]
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the classification.
    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `true` if the failure happened while connecting.
    pub fn is_connect(&self) -> bool {
        matches!(self.kind, TransportErrorKind::Connect)
    }

    /// Returns `true` if a timeout elapsed.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, TransportErrorKind::Timeout)
    }

    /// Classify a reqwest failure.
    ///
    /// This is the **single** place in the crate that maps reqwest errors
    /// onto [`TransportErrorKind`].  Timeout is checked first because a
    /// connect timeout reports both `is_connect()` and `is_timeout()`.
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Connect
        } else if err.is_redirect() {
            TransportErrorKind::Redirect
        } else if err.is_body() || err.is_decode() {
            TransportErrorKind::Body
        } else {
            TransportErrorKind::Request
        };
        let message = crate::util::flatten_chain(&err);
        Self::new(kind, message).with_source(err)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Debug for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("source", &self.source)
            .finish()
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| &**e as &(dyn std::error::Error + 'static))
    }
}

const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Error>();
    assert_send_sync::<TransportError>();
};
