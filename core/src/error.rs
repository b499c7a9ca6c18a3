//! Error types for data provider calls.
//!
//! # Design
//! Two channels, never mixed:
//! - `RequestError` is raised synchronously by `send` before any work is
//!   scheduled, when the target is not an address at all.
//! - `DataProviderError` is the closed taxonomy delivered through the
//!   response once a call has been issued.
//!
//! `FetchError` joins both for the awaiting wrapper. Wrapped decoder and
//! transport errors are boxed trait objects, so equality on
//! `DataProviderError` compares `Decode` and `Unknown` by kind only.

use bytes::Bytes;

use crate::status::StatusCode;

/// A boxed error that can cross threads.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure of an issued call.
#[derive(Debug, thiserror::Error)]
pub enum DataProviderError {
    /// The transport failed before an HTTP exchange completed: timeout,
    /// DNS, refused connection, TLS. These are not told apart.
    #[error("service unreachable")]
    Unreachable,

    /// The exchange completed but the status was not a success, or was not
    /// a recognized code (`code` is `None`). The raw body is kept.
    #[error("service error: {}", describe_code(.code))]
    Service {
        code: Option<StatusCode>,
        body: Option<Bytes>,
    },

    /// The status was a success but the body did not decode into the
    /// expected type.
    #[error("response body could not be decoded: {0}")]
    Decode(#[source] BoxError),

    /// Anything else.
    #[error("unknown failure{}", describe_unknown(.0))]
    Unknown(Option<BoxError>),
}

fn describe_code(code: &Option<StatusCode>) -> String {
    match code {
        Some(code) => format!("HTTP {code}"),
        None => "unrecognized or missing status".to_string(),
    }
}

fn describe_unknown(err: &Option<BoxError>) -> String {
    err.as_ref().map(|e| format!(": {e}")).unwrap_or_default()
}

impl PartialEq for DataProviderError {
    fn eq(&self, other: &Self) -> bool {
        use DataProviderError::*;
        match (self, other) {
            (Unreachable, Unreachable) => true,
            (
                Service { code: lc, body: lb },
                Service { code: rc, body: rb },
            ) => lc == rc && lb == rb,
            (Decode(_), Decode(_)) => true,
            (Unknown(_), Unknown(_)) => true,
            _ => false,
        }
    }
}

/// A request that could not be issued. Raised before any work is scheduled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// The target is not an absolute `http`/`https` address.
    #[error("invalid target {target:?}: {reason}")]
    InvalidTarget { target: String, reason: String },
}

/// Either failure, as seen by a caller awaiting `Transport::fetch`.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Provider(#[from] DataProviderError),
}
