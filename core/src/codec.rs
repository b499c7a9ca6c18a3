//! Pluggable body encoding and decoding.
//!
//! # Design
//! Transports never call serde directly; they hold a `Decoder` and requests
//! are built with an `Encoder`. The JSON implementations are the defaults.
//!
//! A decoder separates "the bytes are not a valid document of that type"
//! (`DecodeFailure::Malformed`) from every other failure
//! (`DecodeFailure::Other`), so the response mapper can report the first as
//! `Decode` and the second as `Unknown`.

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::BoxError;

/// Turns a value into request body bytes.
pub trait Encoder {
    type Error: std::error::Error + Send + Sync + 'static;

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, Self::Error>;
}

/// Turns response body bytes into a value.
pub trait Decoder: Send + Sync + 'static {
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, DecodeFailure>;
}

/// Why a decoder could not produce a value.
#[derive(Debug)]
pub enum DecodeFailure {
    /// The input is not a valid encoding of the target type.
    Malformed(BoxError),
    /// The decoder failed for a reason unrelated to the input's shape.
    Other(BoxError),
}

/// JSON via `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl Encoder for JsonEncoder {
    type Error = serde_json::Error;

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, Self::Error> {
        serde_json::to_vec(value)
    }
}

/// JSON via `serde_json`.
///
/// A body that is empty or only whitespace decodes as JSON `null`, so
/// `Empty`, `()` and `Option<_>` accept a response without content.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl Decoder for JsonDecoder {
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, DecodeFailure> {
        let result = if bytes.iter().all(u8::is_ascii_whitespace) {
            T::deserialize(serde_json::Value::Null)
        } else {
            serde_json::from_slice(bytes)
        };
        result.map_err(|err| {
            if err.is_io() {
                DecodeFailure::Other(err.into())
            } else {
                DecodeFailure::Malformed(err.into())
            }
        })
    }
}

/// Decode target for calls that expect no payload.
///
/// Accepts an empty body and ignores any content that is present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Empty;

impl<'de> Deserialize<'de> for Empty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        IgnoredAny::deserialize(deserializer)?;
        Ok(Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Mock {
        value: String,
    }

    #[test]
    fn json_round_trip() {
        let mock = Mock { value: "Value".to_string() };
        let bytes = JsonEncoder.encode(&mock).unwrap();
        let back: Mock = JsonDecoder.decode(&bytes).unwrap();
        assert_eq!(back, mock);
    }

    #[test]
    fn empty_decodes_from_nothing() {
        assert_eq!(JsonDecoder.decode::<Empty>(b"").unwrap(), Empty);
        assert_eq!(JsonDecoder.decode::<Empty>(b"  \n").unwrap(), Empty);
    }

    #[test]
    fn empty_ignores_content() {
        assert_eq!(JsonDecoder.decode::<Empty>(br#"{"ignored":[1,2]}"#).unwrap(), Empty);
    }

    #[test]
    fn option_decodes_empty_body_as_none() {
        let value: Option<Mock> = JsonDecoder.decode(b"").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn struct_rejects_empty_body() {
        let err = JsonDecoder.decode::<Mock>(b"").unwrap_err();
        assert!(matches!(err, DecodeFailure::Malformed(_)));
    }

    #[test]
    fn wrong_shape_is_malformed() {
        let err = JsonDecoder.decode::<Mock>(br#"{"other":1}"#).unwrap_err();
        assert!(matches!(err, DecodeFailure::Malformed(_)));
        let err = JsonDecoder.decode::<Mock>(b"response").unwrap_err();
        assert!(matches!(err, DecodeFailure::Malformed(_)));
    }

    #[test]
    fn empty_serializes_as_null() {
        assert_eq!(JsonEncoder.encode(&Empty).unwrap(), b"null");
    }
}
