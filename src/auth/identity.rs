//! Verified identity and its `x-user` header encoding.

use std::io;

use axum::http::header::InvalidHeaderValue;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::ser::Formatter;
use thiserror::Error;

/// Header carrying the gateway-verified identity to upstreams.
pub const X_USER: HeaderName = HeaderName::from_static("x-user");

/// The `user` claim of a verified token. Opaque to the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedIdentity(serde_json::Value);

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("failed to serialize identity: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("identity is not a valid header value: {0}")]
    Header(#[from] InvalidHeaderValue),
}

impl VerifiedIdentity {
    pub fn new(claims: serde_json::Value) -> Self {
        Self(claims)
    }

    pub fn claims(&self) -> &serde_json::Value {
        &self.0
    }

    /// Compact JSON with every non-ASCII character and DEL escaped as `\uXXXX`,
    /// so the result is always a valid header value.
    pub fn to_header_value(&self) -> Result<HeaderValue, IdentityError> {
        let mut ser = serde_json::Serializer::with_formatter(Vec::new(), AsciiFormatter);
        self.0.serialize(&mut ser)?;
        Ok(HeaderValue::from_bytes(&ser.into_inner())?)
    }

    /// Replace any `x-user` values in `headers` with this identity.
    pub fn inject(&self, headers: &mut HeaderMap) -> Result<(), IdentityError> {
        // `insert` drops every previous value for the name.
        headers.insert(X_USER, self.to_header_value()?);
        Ok(())
    }
}

struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        for ch in fragment.chars() {
            // serde_json already escapes C0 controls; DEL is the one it leaves.
            if ch.is_ascii() && ch != '\u{7f}' {
                writer.write_all(&[ch as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_header_value_is_json() {
        let claims = json!({ "id": 1, "name": "John Doe" });
        let value = VerifiedIdentity::new(claims.clone()).to_header_value().unwrap();

        let decoded: serde_json::Value = serde_json::from_slice(value.as_bytes()).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_non_ascii_is_escaped() {
        let claims = json!({ "name": "João Conceição", "emoji": "🎈" });
        let value = VerifiedIdentity::new(claims.clone()).to_header_value().unwrap();

        assert!(value.to_str().is_ok());
        assert!(value.to_str().unwrap().contains("Jo\\u00e3o"));
        let decoded: serde_json::Value = serde_json::from_str(value.to_str().unwrap()).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_control_characters_are_escaped() {
        let claims = json!({ "name": "a\u{7f}b", "note": "tab\there" });
        let value = VerifiedIdentity::new(claims.clone()).to_header_value().unwrap();

        let raw = value.to_str().unwrap();
        assert!(raw.contains("a\\u007fb"));
        assert!(!raw.bytes().any(|b| b.is_ascii_control()));
        let decoded: serde_json::Value = serde_json::from_str(raw).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_inject_overwrites_client_values() {
        let mut headers = HeaderMap::new();
        headers.append(X_USER, HeaderValue::from_static(r#"{"id":999,"role":"ADMIN"}"#));
        headers.append(X_USER, HeaderValue::from_static("second"));

        VerifiedIdentity::new(json!({ "id": 1 }))
            .inject(&mut headers)
            .unwrap();

        let values: Vec<_> = headers.get_all(X_USER).iter().collect();
        assert_eq!(values, vec![&HeaderValue::from_static(r#"{"id":1}"#)]);
    }

    #[test]
    fn test_null_identity() {
        let value = VerifiedIdentity::new(serde_json::Value::Null)
            .to_header_value()
            .unwrap();
        assert_eq!(value, "null");
    }
}
