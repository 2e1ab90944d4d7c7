// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request body payloads

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;

use crate::error::Result;

type Encoder = dyn Fn() -> serde_json::Result<String> + Send + Sync;

/// Request body, by payload kind
#[derive(Clone)]
pub enum Body {
    /// Plain text
    Text(String),
    /// Structured value, serialized as JSON on demand
    Structured(Structured),
    /// Form fields (urlencoded on the wire)
    Form(Vec<(String, String)>),
    /// Raw bytes
    Binary(Bytes),
}

/// A structured payload that is serialized lazily.
///
/// Serialization may fail (for example a map with non-string keys); callers
/// decide how to surface that.
#[derive(Clone)]
pub struct Structured {
    encode: Arc<Encoder>,
}

impl Structured {
    /// Wrap any serializable value
    pub fn new<T: Serialize + Send + Sync + 'static>(value: T) -> Self {
        let value = Arc::new(value);
        Self {
            encode: Arc::new(move || serde_json::to_string(&*value)),
        }
    }

    /// Compact JSON form
    pub fn to_json(&self) -> serde_json::Result<String> {
        (self.encode)()
    }
}

impl fmt::Debug for Structured {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json() {
            Ok(json) => write!(f, "Structured({})", json),
            Err(_) => f.write_str("Structured(<unserializable>)"),
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Body::Structured(s) => s.fmt(f),
            Body::Form(pairs) => f.debug_tuple("Form").field(pairs).finish(),
            Body::Binary(bytes) => write!(f, "Binary({} bytes)", bytes.len()),
        }
    }
}

impl Body {
    /// Text body
    pub fn text(text: impl Into<String>) -> Self {
        Body::Text(text.into())
    }

    /// Structured (JSON) body
    pub fn json<T: Serialize + Send + Sync + 'static>(value: T) -> Self {
        Body::Structured(Structured::new(value))
    }

    /// Form body
    pub fn form<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Body::Form(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Binary body
    pub fn binary(bytes: impl Into<Bytes>) -> Self {
        Body::Binary(bytes.into())
    }

    /// Content type implied by the payload kind
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Body::Text(_) => Some("text/plain;charset=UTF-8"),
            Body::Structured(_) => Some("application/json"),
            Body::Form(_) => Some("application/x-www-form-urlencoded"),
            Body::Binary(_) => None,
        }
    }

    /// Encode for the wire
    pub fn to_bytes(&self) -> Result<Bytes> {
        Ok(match self {
            Body::Text(text) => Bytes::from(text.clone()),
            Body::Structured(s) => Bytes::from(s.to_json()?),
            Body::Form(pairs) => {
                let encoded = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(pairs.iter())
                    .finish();
                Bytes::from(encoded)
            }
            Body::Binary(bytes) => bytes.clone(),
        })
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Binary(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Binary(Bytes::from(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_form_encoding() {
        let body = Body::form([("q", "a b"), ("page", "2")]);
        assert_eq!(body.to_bytes().unwrap(), Bytes::from("q=a+b&page=2"));
    }

    #[test]
    fn test_unserializable_structured_body() {
        let mut map = HashMap::new();
        map.insert((1, 2), "tuple keys are not valid JSON object keys");
        let body = Body::json(map);
        assert!(body.to_bytes().is_err());
        assert_eq!(format!("{:?}", body), "Structured(<unserializable>)");
    }
}
