//! `HttpTransport`: the production `Transport`.
//!
//! # Design
//! `HttpTransport` holds only configuration (a platform client, a decoder
//! and an optional runtime handle) behind `Arc`s, and carries no state
//! between calls. Each `send` validates the target on the caller's thread,
//! then runs exactly one blocking exchange on a worker and folds the result
//! through `map_response`. Upload and plain calls differ only in which
//! `PlatformClient` method runs. Whatever happens on the worker, including a
//! panic in the platform client or decoder, ends in exactly one callback.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tokio::runtime::Handle;
use ureq::http::Uri;

use crate::codec::{Decoder, JsonDecoder};
use crate::config::TransportConfig;
use crate::error::{DataProviderError, RequestError};
use crate::http::{Method, Request};
use crate::platform::{parse_target, PlatformClient, PreparedRequest, UreqClient};
use crate::response::{map_response, Response};
use crate::transport::Transport;

/// Sends requests through a `PlatformClient`, `ureq` by default.
///
/// Work runs on the blocking pool of the configured runtime, or of the
/// runtime `send` is called from. Outside any runtime each call gets its
/// own thread.
#[derive(Debug)]
pub struct HttpTransport<C = UreqClient, D = JsonDecoder> {
    client: Arc<C>,
    decoder: Arc<D>,
    runtime: Option<Handle>,
}

impl<C, D> Clone for HttpTransport<C, D> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            decoder: Arc::clone(&self.decoder),
            runtime: self.runtime.clone(),
        }
    }
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> Self {
        Self::with_client(UreqClient::new(config))
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(&TransportConfig::default())
    }
}

impl<C: PlatformClient> HttpTransport<C, JsonDecoder> {
    pub fn with_client(client: C) -> Self {
        Self {
            client: Arc::new(client),
            decoder: Arc::new(JsonDecoder),
            runtime: None,
        }
    }
}

impl<C: PlatformClient, D: Decoder> HttpTransport<C, D> {
    pub fn with_decoder<E: Decoder>(self, decoder: E) -> HttpTransport<C, E> {
        HttpTransport {
            client: self.client,
            decoder: Arc::new(decoder),
            runtime: self.runtime,
        }
    }

    /// Run exchanges on `runtime`'s blocking pool regardless of the caller.
    pub fn on_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn dispatch<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        match self.runtime.clone().or_else(|| Handle::try_current().ok()) {
            Some(runtime) => {
                runtime.spawn_blocking(job);
            }
            None => {
                std::thread::spawn(job);
            }
        }
    }
}

impl<C: PlatformClient, D: Decoder> Transport for HttpTransport<C, D> {
    fn send<T, F>(&self, request: &Request, callback: F) -> Result<(), RequestError>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Response<T>) + Send + 'static,
    {
        let span = tracing::debug_span!(
            "send",
            method = %request.method(),
            target = request.target(),
        );
        let uri = span.in_scope(|| parse_target(request.target()))?;

        let client = Arc::clone(&self.client);
        let decoder = Arc::clone(&self.decoder);
        let method = request.method();
        let headers = request.headers().clone();
        let body = request.body().cloned();

        self.dispatch(move || {
            let _entered = span.enter();
            let response = panic::catch_unwind(AssertUnwindSafe(|| {
                exchange(client.as_ref(), decoder.as_ref(), method, uri, &headers, body)
            }))
            .unwrap_or_else(|payload| {
                let reason = panic_reason(payload.as_ref());
                tracing::error!(%reason, "exchange panicked");
                Err(DataProviderError::Unknown(Some(
                    format!("exchange panicked: {reason}").into(),
                )))
            });
            callback(response);
        });
        Ok(())
    }
}

fn exchange<C, D, T>(
    client: &C,
    decoder: &D,
    method: Method,
    uri: Uri,
    headers: &HashMap<String, String>,
    body: Option<Bytes>,
) -> Response<T>
where
    C: PlatformClient,
    D: Decoder,
    T: DeserializeOwned,
{
    let prepared = match PreparedRequest::new(method, uri, headers) {
        Ok(prepared) => prepared,
        Err(err) => {
            tracing::debug!(%err, "request not sent");
            return Err(DataProviderError::Unknown(Some(err.into())));
        }
    };

    let raw = match body {
        Some(body) => {
            tracing::debug!(len = body.len(), "upload");
            client.upload(&prepared, &body)
        }
        None => {
            tracing::debug!("call");
            client.call(&prepared)
        }
    };
    tracing::debug!(
        status = raw.status,
        failed = raw.error.is_some(),
        "exchange finished"
    );
    map_response(raw, decoder)
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(reason) = payload.downcast_ref::<&str>() {
        reason.to_string()
    } else if let Some(reason) = payload.downcast_ref::<String>() {
        reason.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
