//! Request/response model and pluggable HTTP transport.
//!
//! # Overview
//! Callers describe a call as a `Request`, hand it to a `Transport`, and get
//! back exactly one `Response<T>`: the body decoded into `T`, or a
//! `DataProviderError` saying why not.
//!
//! # Design
//! - `Transport` is the seam. `HttpTransport` is the production
//!   implementation over `ureq`; `StubTransport` answers from a closure for
//!   tests.
//! - Every outcome goes through `map_response`, which applies a fixed
//!   precedence: transport error, then missing or unrecognized status, then
//!   non-2xx status, then decoding.
//! - A request whose target is not an address (`RequestError`) fails
//!   synchronously and never produces a response.
//! - Encoding and decoding are injected (`Encoder`, `Decoder`); JSON via
//!   serde is the default.

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod platform;
pub mod response;
pub mod status;
pub mod transport;

pub use client::HttpTransport;
pub use codec::{DecodeFailure, Decoder, Empty, Encoder, JsonDecoder, JsonEncoder};
pub use config::{ConfigError, TransportConfig};
pub use error::{BoxError, DataProviderError, FetchError, RequestError};
pub use http::{Method, Request, UnknownMethod};
pub use platform::{InvalidHeader, PlatformClient, PreparedRequest, UreqClient};
pub use response::{map_response, RawExchange, Response};
pub use status::{classify, StatusClass, StatusCode};
pub use transport::{StubTransport, Transport};
