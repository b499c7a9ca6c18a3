//! Folding a platform client's raw outcome into a typed `Response`.
//!
//! # Design
//! Every transport path ends in `map_response`, so the error semantics do
//! not depend on whether a call carried a body. The rules are checked in a
//! fixed order and the first match wins:
//!
//! 1. transport error present: `Unreachable`, whatever else was captured
//! 2. no status: `Service { code: None }`
//! 3. status not a recognized code: `Service { code: None }`
//! 4. non-2xx status: `Service { code: Some(..) }`
//! 5. otherwise decode the body (empty if absent)

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::codec::{DecodeFailure, Decoder};
use crate::error::{BoxError, DataProviderError};
use crate::status::{classify, StatusClass, StatusCode};

/// The result of one call: a decoded value or a typed failure.
pub type Response<T> = Result<T, DataProviderError>;

/// What a platform HTTP client hands back for one call.
///
/// Any combination of slots may be filled; `map_response` decides which
/// signal counts.
#[derive(Debug, Default)]
pub struct RawExchange {
    pub body: Option<Bytes>,
    pub status: Option<u16>,
    pub error: Option<BoxError>,
}

impl RawExchange {
    /// A completed HTTP exchange.
    pub fn completed(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            body: Some(body.into()),
            status: Some(status),
            error: None,
        }
    }

    /// A transport-level failure.
    pub fn failed(error: impl Into<BoxError>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

pub fn map_response<T, D>(exchange: RawExchange, decoder: &D) -> Response<T>
where
    T: DeserializeOwned,
    D: Decoder + ?Sized,
{
    let RawExchange { body, status, error } = exchange;

    if let Some(error) = error {
        tracing::debug!(%error, "transport failed");
        return Err(DataProviderError::Unreachable);
    }

    let Some(raw) = status else {
        return Err(DataProviderError::Service { code: None, body });
    };

    let Some(code) = StatusCode::from_u16(raw) else {
        tracing::warn!(status = raw, "unrecognized status code");
        return Err(DataProviderError::Service { code: None, body });
    };

    if classify(i64::from(raw)) == StatusClass::NonSuccess {
        return Err(DataProviderError::Service {
            code: Some(code),
            body,
        });
    }

    decoder
        .decode(body.as_deref().unwrap_or_default())
        .map_err(|failure| match failure {
            DecodeFailure::Malformed(err) => DataProviderError::Decode(err),
            DecodeFailure::Other(err) => DataProviderError::Unknown(Some(err)),
        })
}
