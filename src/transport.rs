//! Transport backends.
//!
//! A [`Transport`] owns whatever native resources it needs to execute one
//! request described by an [`Options`] set.  [`BlockingTransport`] is the
//! default backend, built on `reqwest::blocking`.

use crate::error::{Error, TransportError, TransportErrorKind};
use crate::options::{Options, TransportOption};
use crate::util::parse_header_line;
use bytes::Bytes;
use http::{HeaderMap, HeaderValue, StatusCode, header};

/// The status and body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status of the final response.
    pub status: StatusCode,
    /// The whole response body.
    pub body: Bytes,
}

/// Executes a request described by an option set.
///
/// Implementations apply every option in `options` and then perform one
/// blocking call.  Failures are returned as [`TransportError`] and are never
/// turned into builder [`Error`]s by the caller.
pub trait Transport {
    /// Apply `options` and perform the request.
    fn perform(&mut self, options: &Options) -> Result<RawResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn perform(&mut self, options: &Options) -> Result<RawResponse, TransportError> {
        (**self).perform(options)
    }
}

/// The default transport: a `reqwest::blocking::Client`.
///
/// Client-level options (`ConnectTimeout`, `FollowLocation`, `MaxRedirs`,
/// `UserAgent`, `SslVerifyPeer`, `Proxy`) cannot be changed on an existing
/// client, so when any of them is present `perform` builds a client for
/// that call.  Otherwise the client created in [`new()`](Self::new) is used.
///
/// Must not be used from inside an async runtime's worker thread; run it on
/// `spawn_blocking` instead.
pub struct BlockingTransport {
    client: reqwest::blocking::Client,
}

impl std::fmt::Debug for BlockingTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingTransport").finish()
    }
}

impl BlockingTransport {
    /// Open a transport handle.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportUnavailable`](Error::is_transport_unavailable)
    /// error if the HTTP client cannot be initialised (for example when the
    /// TLS backend fails to load).
    pub fn new() -> Result<Self, Error> {
        let client = reqwest::blocking::Client::builder().build().map_err(|e| {
            Error::transport_unavailable("HTTP client initialisation failed").with_source(e)
        })?;
        trace!("transport handle opened");
        Ok(Self { client })
    }

    fn client_for(&self, options: &Options) -> Result<reqwest::blocking::Client, TransportError> {
        if !options.has_client_level() {
            return Ok(self.client.clone());
        }

        let mut builder = reqwest::blocking::Client::builder();
        let mut follow: Option<bool> = None;
        let mut max_redirs: Option<usize> = None;

        for option in options.iter() {
            match option {
                TransportOption::ConnectTimeout(d) => builder = builder.connect_timeout(*d),
                TransportOption::UserAgent(ua) => builder = builder.user_agent(ua.as_str()),
                TransportOption::SslVerifyPeer(verify) => {
                    builder = builder.danger_accept_invalid_certs(!*verify);
                }
                TransportOption::Proxy(url) => {
                    let proxy = reqwest::Proxy::all(url.as_str())
                        .map_err(TransportError::from_reqwest)?;
                    builder = builder.proxy(proxy);
                }
                TransportOption::FollowLocation(f) => follow = Some(*f),
                TransportOption::MaxRedirs(n) => max_redirs = Some(*n),
                _ => {}
            }
        }

        let policy = match (follow, max_redirs) {
            (Some(false), _) => Some(reqwest::redirect::Policy::none()),
            (_, Some(n)) => Some(reqwest::redirect::Policy::limited(n)),
            _ => None,
        };
        if let Some(policy) = policy {
            builder = builder.redirect(policy);
        }

        builder.build().map_err(TransportError::from_reqwest)
    }
}

impl Transport for BlockingTransport {
    fn perform(&mut self, options: &Options) -> Result<RawResponse, TransportError> {
        let url_str = options
            .url()
            .ok_or_else(|| TransportError::new(TransportErrorKind::Url, "no URL set"))?;
        let url = reqwest::Url::parse(url_str).map_err(|e| {
            TransportError::new(TransportErrorKind::Url, format!("malformed URL `{url_str}`"))
                .with_source(e)
        })?;

        let method = options.effective_method().map_err(|verb| {
            TransportError::new(TransportErrorKind::Request, format!("invalid method `{verb}`"))
        })?;

        let mut headers = HeaderMap::new();
        for line in options.header_lines() {
            let (name, value) = parse_header_line(line)?;
            headers.append(name, value);
        }

        let body = options.post_fields().map(str::to_owned);
        if body.is_some() && !headers.contains_key(header::CONTENT_TYPE) {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            );
        }

        let client = self.client_for(options)?;

        trace!(
            method = %method,
            url = %url,
            headers = headers.len(),
            "BlockingTransport::perform",
        );

        let mut request = client.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }
        if let Some(timeout) = options.timeout() {
            request = request.timeout(timeout);
        }

        let response = request.send().map_err(TransportError::from_reqwest)?;
        let status = response.status();
        let body = response.bytes().map_err(TransportError::from_reqwest)?;
        Ok(RawResponse { status, body })
    }
}

impl Drop for BlockingTransport {
    fn drop(&mut self) {
        trace!("transport handle released");
    }
}
