//! The platform HTTP client seam and its `ureq` implementation.
//!
//! # Design
//! `parse_target` runs on the caller's thread, so a bad target fails before
//! any work is scheduled. Header conversion happens later on the worker in
//! `PreparedRequest::new`; a header that cannot go on the wire is reported
//! through the response like any other failure of an issued call.
//!
//! Platform clients are blocking and report every outcome as a
//! `RawExchange`; they never interpret status codes. `UreqClient` turns off
//! ureq's status-as-error behavior so 4xx/5xx come back as data, and hands
//! back the last 3xx when redirects run out.

use std::collections::HashMap;

use ureq::http::{HeaderName, HeaderValue, Uri};
use ureq::typestate::{WithBody, WithoutBody};
use ureq::{Agent, RequestBuilder};

use crate::config::TransportConfig;
use crate::error::RequestError;
use crate::http::Method;
use crate::response::RawExchange;

/// A header name or value that cannot be carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid header {name:?}")]
pub struct InvalidHeader {
    pub name: String,
}

/// A request in wire form, ready for a `PlatformClient`.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: Vec<(HeaderName, HeaderValue)>,
}

impl PreparedRequest {
    pub fn new(
        method: Method,
        uri: Uri,
        headers: &HashMap<String, String>,
    ) -> Result<Self, InvalidHeader> {
        let mut wire = Vec::with_capacity(headers.len());
        for (name, value) in headers {
            let invalid = || InvalidHeader { name: name.clone() };
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
            let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
            wire.push((header_name, header_value));
        }
        Ok(Self {
            method,
            uri,
            headers: wire,
        })
    }
}

/// Accepts absolute `http`/`https` URIs with a host.
pub fn parse_target(target: &str) -> Result<Uri, RequestError> {
    let invalid = |reason: String| RequestError::InvalidTarget {
        target: target.to_string(),
        reason,
    };

    let uri = target.parse::<Uri>().map_err(|e| invalid(format!("{e}")))?;
    match uri.scheme_str() {
        Some("http") | Some("https") => {}
        Some(other) => return Err(invalid(format!("unsupported scheme {other:?}"))),
        None => return Err(invalid("missing scheme".to_string())),
    }
    if uri.host().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(uri)
}

/// Executes prepared requests. Implementations block until the exchange
/// finishes or fails.
pub trait PlatformClient: Send + Sync + 'static {
    /// A call without a body.
    fn call(&self, request: &PreparedRequest) -> RawExchange;

    /// A call that uploads `body`.
    fn upload(&self, request: &PreparedRequest, body: &[u8]) -> RawExchange;
}

/// `PlatformClient` backed by a `ureq::Agent`. The agent pools connections
/// across calls.
#[derive(Debug, Clone)]
pub struct UreqClient {
    agent: Agent,
    body_limit: u64,
}

impl UreqClient {
    pub fn new(config: &TransportConfig) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout())
            .timeout_connect(config.connect_timeout())
            .max_redirects(config.max_redirects)
            .max_redirects_will_error(false)
            .build()
            .new_agent();
        Self {
            agent,
            body_limit: config.body_limit(),
        }
    }

    fn execute(&self, request: &PreparedRequest, body: Option<&[u8]>) -> RawExchange {
        let uri = request.uri.clone();
        let headers = &request.headers;
        let result = match request.method {
            Method::Get => without_body(self.agent.get(uri), headers, body),
            Method::Head => without_body(self.agent.head(uri), headers, body),
            Method::Delete => without_body(self.agent.delete(uri), headers, body),
            Method::Trace => without_body(self.agent.trace(uri), headers, body),
            Method::Options => without_body(self.agent.options(uri), headers, body),
            Method::Connect => without_body(self.agent.connect(uri), headers, body),
            Method::Post => with_body(self.agent.post(uri), headers, body),
            Method::Put => with_body(self.agent.put(uri), headers, body),
            Method::Patch => with_body(self.agent.patch(uri), headers, body),
        };

        let mut response = match result {
            Ok(response) => response,
            Err(err) => return RawExchange::failed(err),
        };
        let status = response.status().as_u16();
        match response
            .body_mut()
            .with_config()
            .limit(self.body_limit)
            .read_to_vec()
        {
            Ok(bytes) => RawExchange::completed(status, bytes),
            Err(err) => RawExchange::failed(err),
        }
    }
}

impl Default for UreqClient {
    fn default() -> Self {
        Self::new(&TransportConfig::default())
    }
}

impl PlatformClient for UreqClient {
    fn call(&self, request: &PreparedRequest) -> RawExchange {
        self.execute(request, None)
    }

    fn upload(&self, request: &PreparedRequest, body: &[u8]) -> RawExchange {
        self.execute(request, Some(body))
    }
}

type UreqResult = Result<ureq::http::Response<ureq::Body>, ureq::Error>;

fn apply_headers<B>(
    mut builder: RequestBuilder<B>,
    headers: &[(HeaderName, HeaderValue)],
) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.clone(), value.clone());
    }
    builder
}

fn without_body(
    builder: RequestBuilder<WithoutBody>,
    headers: &[(HeaderName, HeaderValue)],
    body: Option<&[u8]>,
) -> UreqResult {
    let builder = apply_headers(builder, headers);
    match body {
        Some(bytes) => builder.force_send_body().send(bytes),
        None => builder.call(),
    }
}

fn with_body(
    builder: RequestBuilder<WithBody>,
    headers: &[(HeaderName, HeaderValue)],
    body: Option<&[u8]>,
) -> UreqResult {
    let builder = apply_headers(builder, headers);
    match body {
        Some(bytes) => builder.send(bytes),
        None => builder.send_empty(),
    }
}
