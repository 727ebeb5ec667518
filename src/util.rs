//! Shared utility functions.
//!
//! Small helpers used by the transport.  Nothing here depends on reqwest
//! except through `std::error::Error`.

use crate::error::{TransportError, TransportErrorKind};
use http::{HeaderName, HeaderValue};

// ---------------------------------------------------------------------------
// Raw header lines
// ---------------------------------------------------------------------------

/// Split a raw `Name: value` header line into typed parts.
///
/// Whitespace around the name and value is dropped; the value may be empty.
/// A line without a colon, or with an invalid name or value, is a
/// [`TransportErrorKind::Request`] error because it is only discovered when
/// the option set is applied.
pub(crate) fn parse_header_line(line: &str) -> Result<(HeaderName, HeaderValue), TransportError> {
    let (name, value) = line.split_once(':').ok_or_else(|| {
        TransportError::new(
            TransportErrorKind::Request,
            format!("malformed header line `{line}`: missing `:`"),
        )
    })?;
    let name = HeaderName::from_bytes(name.trim().as_bytes()).map_err(|e| {
        TransportError::new(
            TransportErrorKind::Request,
            format!("malformed header line `{line}`: invalid name"),
        )
        .with_source(e)
    })?;
    let value = HeaderValue::from_str(value.trim()).map_err(|e| {
        TransportError::new(
            TransportErrorKind::Request,
            format!("malformed header line `{line}`: invalid value"),
        )
        .with_source(e)
    })?;
    Ok((name, value))
}

// ---------------------------------------------------------------------------
// Error chains
// ---------------------------------------------------------------------------

/// Join an error and all of its sources with `": "`.
///
/// reqwest's own `Display` only names the phase ("error sending request
/// for url (...)"); the useful detail ("Connection refused") sits further
/// down the chain.  Adjacent duplicates are skipped.
pub(crate) fn flatten_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut cur: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = cur {
        let text = e.to_string();
        if parts.last() != Some(&text) {
            parts.push(text);
        }
        cur = e.source();
    }
    parts.join(": ")
}
