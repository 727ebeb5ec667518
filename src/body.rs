//! Request body encoding.
//!
//! A body is a flat list of string fields, encoded once when
//! [`RequestBuilder::body()`](crate::RequestBuilder::body) is called.

use crate::error::Error;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// How [`RequestBuilder::body()`](crate::RequestBuilder::body) encodes its
/// fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyEncoding {
    /// `application/x-www-form-urlencoded` (`a=1&b=two+words`).
    #[default]
    Form,
    /// A JSON object of string values (`{"a":"1"}`).  Also appends a
    /// `Content-Type: application/json` header line.
    Json,
}

/// An encoded request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Payload {
    pub(crate) encoding: BodyEncoding,
    pub(crate) encoded: String,
}

impl Payload {
    /// Encode `fields`, preserving their order.
    pub(crate) fn encode(fields: &[(String, String)], encoding: BodyEncoding) -> Result<Self, Error> {
        let encoded = match encoding {
            BodyEncoding::Form => encode_form(fields),
            BodyEncoding::Json => encode_json(fields)?,
        };
        Ok(Self { encoding, encoded })
    }
}

fn encode_form(fields: &[(String, String)]) -> String {
    let mut ser = form_urlencoded::Serializer::new(String::new());
    for (k, v) in fields {
        ser.append_pair(k, v);
    }
    ser.finish()
}

/// Serializes as a JSON object in field order.
///
/// `serde_json::Map` sorts its keys unless `preserve_order` is enabled, so
/// the fields are driven through `serialize_map` directly instead.
struct OrderedFields<'a>(&'a [(String, String)]);

impl Serialize for OrderedFields<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

fn encode_json(fields: &[(String, String)]) -> Result<String, Error> {
    serde_json::to_string(&OrderedFields(fields))
        .map_err(|e| Error::encode("JSON serialization failed").with_source(e))
}
