//! Raw transport options.
//!
//! [`TransportOption`] is the escape hatch for settings the typed builder
//! methods do not cover.  Options are stored in an [`Options`] map keyed by
//! [`OptionKey`], so inserting an option replaces any earlier one of the
//! same kind.
//!
//! The builder itself expresses its URL, header list, body and method
//! directives as options too.  An override passed to
//! [`settings()`](crate::RequestBuilder::settings) is applied after those
//! and wins, even when that leaves the request inconsistent (for example a
//! `Url` override pointing at an invalid URL).  Such inconsistencies
//! surface as transport errors after `send()`, not as builder errors.

use std::collections::BTreeMap;
use std::time::Duration;

/// A single raw option applied to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportOption {
    /// Target URL.  Not validated when passed as an override.
    Url(String),
    /// The complete list of raw `Name: value` header lines.
    HttpHeader(Vec<String>),
    /// Encoded request body.  Implies POST unless a method directive says
    /// otherwise.
    PostFields(String),
    /// Issue a POST.
    Post(bool),
    /// Send this verb instead of the one implied by the other options.
    CustomRequest(String),
    /// Total time allowed for the request.
    Timeout(Duration),
    /// Time allowed for the connect phase.
    ConnectTimeout(Duration),
    /// Whether to follow redirects.
    FollowLocation(bool),
    /// Maximum number of redirects to follow.
    MaxRedirs(usize),
    /// `User-Agent` sent with the request.
    UserAgent(String),
    /// Whether to verify the server's TLS certificate.
    SslVerifyPeer(bool),
    /// Proxy URL used for every scheme.
    Proxy(String),
}

/// The kind of a [`TransportOption`], used as the map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum OptionKey {
    /// [`TransportOption::Url`]
    Url,
    /// [`TransportOption::HttpHeader`]
    HttpHeader,
    /// [`TransportOption::PostFields`]
    PostFields,
    /// [`TransportOption::Post`]
    Post,
    /// [`TransportOption::CustomRequest`]
    CustomRequest,
    /// [`TransportOption::Timeout`]
    Timeout,
    /// [`TransportOption::ConnectTimeout`]
    ConnectTimeout,
    /// [`TransportOption::FollowLocation`]
    FollowLocation,
    /// [`TransportOption::MaxRedirs`]
    MaxRedirs,
    /// [`TransportOption::UserAgent`]
    UserAgent,
    /// [`TransportOption::SslVerifyPeer`]
    SslVerifyPeer,
    /// [`TransportOption::Proxy`]
    Proxy,
}

impl TransportOption {
    /// The key this option is stored under.
    pub fn key(&self) -> OptionKey {
        match self {
            TransportOption::Url(_) => OptionKey::Url,
            TransportOption::HttpHeader(_) => OptionKey::HttpHeader,
            TransportOption::PostFields(_) => OptionKey::PostFields,
            TransportOption::Post(_) => OptionKey::Post,
            TransportOption::CustomRequest(_) => OptionKey::CustomRequest,
            TransportOption::Timeout(_) => OptionKey::Timeout,
            TransportOption::ConnectTimeout(_) => OptionKey::ConnectTimeout,
            TransportOption::FollowLocation(_) => OptionKey::FollowLocation,
            TransportOption::MaxRedirs(_) => OptionKey::MaxRedirs,
            TransportOption::UserAgent(_) => OptionKey::UserAgent,
            TransportOption::SslVerifyPeer(_) => OptionKey::SslVerifyPeer,
            TransportOption::Proxy(_) => OptionKey::Proxy,
        }
    }

    /// Whether this option configures the client rather than the single
    /// request, so the transport needs a purpose-built client to honour it.
    pub(crate) fn is_client_level(&self) -> bool {
        matches!(
            self.key(),
            OptionKey::ConnectTimeout
                | OptionKey::FollowLocation
                | OptionKey::MaxRedirs
                | OptionKey::UserAgent
                | OptionKey::SslVerifyPeer
                | OptionKey::Proxy
        )
    }
}

/// A set of transport options, at most one per [`OptionKey`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    map: BTreeMap<OptionKey, TransportOption>,
}

impl Options {
    /// Create an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an option, returning the one it replaced.
    pub fn insert(&mut self, option: TransportOption) -> Option<TransportOption> {
        self.map.insert(option.key(), option)
    }

    /// Insert every option from `other`, later entries winning.
    pub fn merge(&mut self, other: &Options) {
        for option in other.iter() {
            self.insert(option.clone());
        }
    }

    /// Look up an option by key.
    pub fn get(&self, key: OptionKey) -> Option<&TransportOption> {
        self.map.get(&key)
    }

    /// Returns `true` if an option with this key is present.
    pub fn contains(&self, key: OptionKey) -> bool {
        self.map.contains_key(&key)
    }

    /// Iterate over the options in key order.
    pub fn iter(&self) -> impl Iterator<Item = &TransportOption> {
        self.map.values()
    }

    /// Number of options in the set.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if no options are set.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    // -- Typed accessors used by transports --

    /// The `Url` option.
    pub fn url(&self) -> Option<&str> {
        match self.get(OptionKey::Url) {
            Some(TransportOption::Url(u)) => Some(u),
            _ => None,
        }
    }

    /// The `HttpHeader` lines, empty when unset.
    pub fn header_lines(&self) -> &[String] {
        match self.get(OptionKey::HttpHeader) {
            Some(TransportOption::HttpHeader(lines)) => lines,
            _ => &[],
        }
    }

    /// The `PostFields` body.
    pub fn post_fields(&self) -> Option<&str> {
        match self.get(OptionKey::PostFields) {
            Some(TransportOption::PostFields(body)) => Some(body),
            _ => None,
        }
    }

    /// The `CustomRequest` verb.
    pub fn custom_request(&self) -> Option<&str> {
        match self.get(OptionKey::CustomRequest) {
            Some(TransportOption::CustomRequest(verb)) => Some(verb),
            _ => None,
        }
    }

    /// The `Timeout` duration.
    pub fn timeout(&self) -> Option<Duration> {
        match self.get(OptionKey::Timeout) {
            Some(TransportOption::Timeout(d)) => Some(*d),
            _ => None,
        }
    }

    /// The verb these options ask for.
    ///
    /// `CustomRequest` wins, then `Post(true)`, then the presence of
    /// `PostFields`; otherwise `GET`.  A `CustomRequest` that is not a valid
    /// token is returned as `Err` with the offending string.
    pub fn effective_method(&self) -> Result<http::Method, String> {
        if let Some(verb) = self.custom_request() {
            return http::Method::from_bytes(verb.as_bytes()).map_err(|_| verb.to_owned());
        }
        if matches!(self.get(OptionKey::Post), Some(TransportOption::Post(true)))
            || self.contains(OptionKey::PostFields)
        {
            return Ok(http::Method::POST);
        }
        Ok(http::Method::GET)
    }

    /// Returns `true` if any option needs a purpose-built client.
    pub(crate) fn has_client_level(&self) -> bool {
        self.iter().any(TransportOption::is_client_level)
    }
}

impl Extend<TransportOption> for Options {
    fn extend<I: IntoIterator<Item = TransportOption>>(&mut self, iter: I) {
        for option in iter {
            self.insert(option);
        }
    }
}

impl FromIterator<TransportOption> for Options {
    fn from_iter<I: IntoIterator<Item = TransportOption>>(iter: I) -> Self {
        let mut options = Options::new();
        options.extend(iter);
        options
    }
}
