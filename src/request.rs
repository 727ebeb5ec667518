//! Request builder.
//!
//! [`RequestBuilder`] accumulates configuration through chained calls and
//! performs exactly one blocking request in [`send()`](RequestBuilder::send).
//!
//! Validation failures are returned from the call that detects them, so a
//! chain reads naturally with `?`:
//!
//! ```rust,no_run
//! # fn main() -> Result<(), httpchain::Error> {
//! let exchange = httpchain::RequestBuilder::new()?
//!     .url("https://example.com/api")?
//!     .method("POST")?
//!     .json_body([("a", "1")])?
//!     .bearer("secret")
//!     .send()?;
//!
//! if exchange.has_error() {
//!     eprintln!("transport failed: {}", exchange.error().unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```

use crate::body::{BodyEncoding, Payload};
use crate::error::Error;
use crate::method::Method;
use crate::options::{Options, TransportOption};
use crate::response::Exchange;
use crate::transport::{BlockingTransport, Transport};
use std::fmt::Display;

/// Configuration accumulated by the builder, consumed by `send()`.
#[derive(Debug, Clone, Default)]
struct RequestConfig {
    /// Trimmed, validated URL exactly as the caller wrote it.
    url: Option<String>,
    method: Option<Method>,
    /// Raw `Name: value` lines in call order.
    headers: Vec<String>,
    payload: Option<Payload>,
    /// Index in `headers` of the content-type line the current payload added.
    payload_header: Option<usize>,
    /// Raw options from `settings()`, applied last.
    overrides: Options,
}

impl RequestConfig {
    /// Lower the typed configuration to transport options, then apply the
    /// overrides on top.
    fn resolve(&self) -> Options {
        let mut options = Options::new();

        if let Some(url) = &self.url {
            options.insert(TransportOption::Url(url.clone()));
        }
        // A body attached under POST/PUT/PATCH is dropped, together with the
        // content-type line it added, if the method was later switched to
        // one that cannot carry it.
        let keep_body = self.method.is_some_and(Method::allows_body);
        let dropped_line = if keep_body { None } else { self.payload_header };
        let headers: Vec<String> = self
            .headers
            .iter()
            .enumerate()
            .filter(|&(i, _)| Some(i) != dropped_line)
            .map(|(_, line)| line.clone())
            .collect();
        if !headers.is_empty() {
            options.insert(TransportOption::HttpHeader(headers));
        }
        if let Some(payload) = &self.payload {
            if keep_body {
                options.insert(TransportOption::PostFields(payload.encoded.clone()));
            } else {
                warn!(method = ?self.method, "dropping body: method no longer allows one");
            }
        }
        match self.method {
            None | Some(Method::Get) => {}
            Some(Method::Post) => {
                options.insert(TransportOption::Post(true));
            }
            Some(m) => {
                options.insert(TransportOption::CustomRequest(m.as_str().to_owned()));
            }
        }

        options.merge(&self.overrides);
        options
    }
}

/// A single-use HTTP request builder.
///
/// Created with [`RequestBuilder::new()`] (the default blocking transport)
/// or [`RequestBuilder::with_transport()`].  The transport handle is owned
/// by the builder and released when the builder is dropped or consumed by
/// [`send()`](Self::send).
pub struct RequestBuilder<T: Transport = BlockingTransport> {
    transport: T,
    config: RequestConfig,
}

impl<T: Transport> std::fmt::Debug for RequestBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("method", &self.config.method)
            .field("url", &self.config.url)
            .field("headers", &self.config.headers.len())
            .field("overrides", &self.config.overrides.len())
            .finish()
    }
}

impl RequestBuilder<BlockingTransport> {
    /// Create a builder backed by a fresh [`BlockingTransport`].
    ///
    /// # Errors
    ///
    /// Returns a [`TransportUnavailable`](Error::is_transport_unavailable)
    /// error if the HTTP client cannot be initialised on this host.
    pub fn new() -> Result<Self, Error> {
        Ok(Self::with_transport(BlockingTransport::new()?))
    }
}

impl<T: Transport> RequestBuilder<T> {
    /// Create a builder that sends through `transport`.
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            config: RequestConfig::default(),
        }
    }

    /// Set the target URL.
    ///
    /// Surrounding whitespace is trimmed.  The rest is stored verbatim and
    /// is what the transport receives.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidUrl`](Error::is_invalid_url) error unless the
    /// input parses as an absolute URL.
    pub fn url(mut self, url: &str) -> Result<Self, Error> {
        let trimmed = url.trim();
        reqwest::Url::parse(trimmed).map_err(|e| Error::invalid_url(trimmed).with_source(e))?;
        self.config.url = Some(trimmed.to_owned());
        Ok(self)
    }

    /// Set the request method.
    ///
    /// Input is trimmed and upper-cased, so `"get"` selects [`Method::Get`].
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidMethod`](Error::is_invalid_method) error for
    /// anything other than GET, POST, PUT, PATCH or DELETE.
    pub fn method(mut self, method: &str) -> Result<Self, Error> {
        self.config.method = Some(method.parse()?);
        Ok(self)
    }

    /// Append raw header lines (`"Name: value"`) verbatim, in order.
    ///
    /// Lines are never deduplicated.  Malformed lines are reported by the
    /// transport after `send()`.
    #[must_use]
    pub fn headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.headers.extend(headers.into_iter().map(Into::into));
        self
    }

    /// Merge raw transport options.
    ///
    /// Options are applied after everything the builder manages itself, so
    /// an override replaces the URL, header list, body or method directive
    /// derived from the typed setters.  Later calls overwrite earlier ones
    /// with the same [`OptionKey`](crate::OptionKey).
    #[must_use]
    pub fn settings<I>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = TransportOption>,
    {
        for option in options {
            trace!(key = ?option.key(), "transport option override");
            self.config.overrides.insert(option);
        }
        self
    }

    /// Attach a body built from `fields`, in order.
    ///
    /// Empty input is a no-op.  [`BodyEncoding::Json`] also appends a
    /// `Content-Type: application/json` header line.  A later call replaces
    /// the body.
    ///
    /// # Errors
    ///
    /// - [`MethodNotSet`](Error::is_method_not_set) if `method()` has not
    ///   been called.
    /// - [`BodyNotAllowed`](Error::is_body_not_allowed) if the method is GET
    ///   or DELETE.
    pub fn body<I, K, V>(mut self, fields: I, encoding: BodyEncoding) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let fields: Vec<(String, String)> = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        if fields.is_empty() {
            return Ok(self);
        }

        let method = self.config.method.ok_or_else(Error::method_not_set)?;
        if !method.allows_body() {
            return Err(Error::body_not_allowed(method));
        }

        let payload = Payload::encode(&fields, encoding)?;
        self.config.payload_header = None;
        if payload.encoding == BodyEncoding::Json {
            self.config.payload_header = Some(self.config.headers.len());
            self.config
                .headers
                .push("Content-Type: application/json".to_owned());
        }
        self.config.payload = Some(payload);
        Ok(self)
    }

    /// Shorthand for [`body(fields, BodyEncoding::Form)`](Self::body).
    ///
    /// # Errors
    ///
    /// Same as [`body()`](Self::body).
    pub fn form_body<I, K, V>(self, fields: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.body(fields, BodyEncoding::Form)
    }

    /// Shorthand for [`body(fields, BodyEncoding::Json)`](Self::body).
    ///
    /// # Errors
    ///
    /// Same as [`body()`](Self::body).
    pub fn json_body<I, K, V>(self, fields: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.body(fields, BodyEncoding::Json)
    }

    /// Append `Accept: application/json`.
    #[must_use]
    pub fn accept_json(mut self) -> Self {
        self.config.headers.push("Accept: application/json".to_owned());
        self
    }

    /// Alias for [`accept_json()`](Self::accept_json).
    #[must_use]
    pub fn json(self) -> Self {
        self.accept_json()
    }

    /// Append `Authorization: Bearer {token}`.
    #[must_use]
    pub fn bearer<D: Display>(mut self, token: D) -> Self {
        self.config
            .headers
            .push(format!("Authorization: Bearer {token}"));
        self
    }

    /// The option set [`send()`](Self::send) would apply right now.
    pub fn options(&self) -> Options {
        self.config.resolve()
    }

    /// Apply the accumulated options and perform the request.
    ///
    /// Consumes the builder: one builder, one network call.  The transport
    /// handle is released before this returns.
    ///
    /// A failure of the network call itself is **not** an `Err`; it is
    /// recorded on the returned [`Exchange`] and visible through
    /// [`has_error()`](Exchange::has_error).
    ///
    /// # Errors
    ///
    /// - [`UrlNotSet`](Error::is_url_not_set) if `url()` was never called.
    /// - [`MethodNotSet`](Error::is_method_not_set) if `method()` was never
    ///   called.
    pub fn send(self) -> Result<Exchange, Error> {
        let Self {
            mut transport,
            config,
        } = self;

        if config.url.is_none() {
            return Err(Error::url_not_set());
        }
        if config.method.is_none() {
            return Err(Error::method_not_set());
        }

        let options = config.resolve();
        debug!(
            method = ?config.method,
            url = options.url().unwrap_or_default(),
            options = options.len(),
            "sending request",
        );

        let outcome = transport.perform(&options);
        drop(transport);
        Ok(Exchange::new(options, outcome))
    }

    /// Alias for [`send()`](Self::send).
    ///
    /// # Errors
    ///
    /// Same as [`send()`](Self::send).
    pub fn exec(self) -> Result<Exchange, Error> {
        self.send()
    }
}
