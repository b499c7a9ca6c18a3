//! Request-side data model: HTTP methods and the immutable `Request` value.
//!
//! # Design
//! A `Request` is plain data. Nothing here touches the network or validates
//! the target; a transport checks the target when the request is sent, so a
//! request can be built, compared and stored before any endpoint exists.
//!
//! The body is an `Option<Bytes>` rather than a possibly-empty buffer, which
//! keeps "no body" and "empty body" distinct under equality and lets the
//! transport pick between a plain call and an upload.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::codec::Encoder;

/// HTTP method for a request. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Trace,
    Options,
    Connect,
    Patch,
}

impl Method {
    pub const ALL: [Method; 9] = [
        Method::Get,
        Method::Head,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Trace,
        Method::Options,
        Method::Connect,
        Method::Patch,
    ];

    /// The token sent on the request line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Trace => "TRACE",
            Method::Options => "OPTIONS",
            Method::Connect => "CONNECT",
            Method::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the nine method tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown HTTP method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMethod(s.to_string()))
    }
}

/// An HTTP request described as plain data.
///
/// Immutable once built: the `with_*` methods consume and return the value.
/// Two requests are equal when method, target, headers (as a map) and body
/// bytes are all equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    target: String,
    headers: HashMap<String, String>,
    body: Option<Bytes>,
}

impl Request {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Build a request whose body is `value` run through `encoder`.
    ///
    /// The encoder's error is returned as-is.
    pub fn encoded<T, E>(
        method: Method,
        target: impl Into<String>,
        headers: HashMap<String, String>,
        value: &T,
        encoder: &E,
    ) -> Result<Self, E::Error>
    where
        T: Serialize + ?Sized,
        E: Encoder,
    {
        let body = encoder.encode(value)?;
        Ok(Self::new(method, target)
            .with_headers(headers)
            .with_body(body))
    }

    /// Add or replace a single header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Merge `headers` into the request, replacing existing keys.
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }
}
