//! HTTP status codes and success classification.
//!
//! # Design
//! `StatusCode` wraps the `http` crate's code and only admits codes that
//! crate has a canonical reason for. A numeric status the server sends
//! without one is "unrecognized" and the response mapper treats it exactly
//! like a missing status. `classify` works on any integer.

use std::fmt;

use ureq::http;

/// Outcome of classifying a numeric status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    NonSuccess,
}

/// A code is `Success` iff it lies in `200..300`.
pub fn classify(code: i64) -> StatusClass {
    if (200..300).contains(&code) {
        StatusClass::Success
    } else {
        StatusClass::NonSuccess
    }
}

/// A recognized HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatusCode(http::StatusCode);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(http::StatusCode::OK);
    pub const CREATED: StatusCode = StatusCode(http::StatusCode::CREATED);
    pub const NO_CONTENT: StatusCode = StatusCode(http::StatusCode::NO_CONTENT);
    pub const FOUND: StatusCode = StatusCode(http::StatusCode::FOUND);
    pub const BAD_REQUEST: StatusCode = StatusCode(http::StatusCode::BAD_REQUEST);
    pub const UNAUTHORIZED: StatusCode = StatusCode(http::StatusCode::UNAUTHORIZED);
    pub const FORBIDDEN: StatusCode = StatusCode(http::StatusCode::FORBIDDEN);
    pub const NOT_FOUND: StatusCode = StatusCode(http::StatusCode::NOT_FOUND);
    pub const CONFLICT: StatusCode = StatusCode(http::StatusCode::CONFLICT);
    pub const TOO_MANY_REQUESTS: StatusCode = StatusCode(http::StatusCode::TOO_MANY_REQUESTS);
    pub const INTERNAL_SERVER_ERROR: StatusCode =
        StatusCode(http::StatusCode::INTERNAL_SERVER_ERROR);
    pub const BAD_GATEWAY: StatusCode = StatusCode(http::StatusCode::BAD_GATEWAY);
    pub const SERVICE_UNAVAILABLE: StatusCode = StatusCode(http::StatusCode::SERVICE_UNAVAILABLE);

    /// Returns `None` for codes without a canonical reason phrase.
    pub fn from_u16(code: u16) -> Option<Self> {
        http::StatusCode::from_u16(code)
            .ok()
            .filter(|c| c.canonical_reason().is_some())
            .map(StatusCode)
    }

    pub fn as_u16(&self) -> u16 {
        self.0.as_u16()
    }

    pub fn canonical_reason(&self) -> &'static str {
        self.0.canonical_reason().unwrap_or_default()
    }

    pub fn is_success(&self) -> bool {
        classify(i64::from(self.as_u16())) == StatusClass::Success
    }
}

impl From<StatusCode> for http::StatusCode {
    fn from(code: StatusCode) -> Self {
        code.0
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.canonical_reason())
    }
}
