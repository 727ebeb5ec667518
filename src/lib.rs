#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![forbid(unsafe_code)]

#[macro_use]
mod tracing;

mod body;
mod error;
mod method;
mod options;
mod request;
mod response;
mod transport;
pub(crate) mod util;

pub use body::BodyEncoding;
pub use error::{Error, TransportError, TransportErrorKind};
pub use method::Method;
pub use options::{OptionKey, Options, TransportOption};
pub use request::RequestBuilder;
pub use response::Exchange;
pub use transport::{BlockingTransport, RawResponse, Transport};

pub use bytes::Bytes;
pub use http::StatusCode;

/// A `Result` alias where the `Err` case is [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
