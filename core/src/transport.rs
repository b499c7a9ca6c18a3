//! The transport boundary and its test double.
//!
//! # Design
//! `send` is the primitive: it either rejects the request synchronously or
//! guarantees the callback runs exactly once. `fetch` is layered on top with
//! a oneshot channel and issues the call before returning its future, so
//! dropping the future leaves the call running.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::de::DeserializeOwned;
use tokio::sync::oneshot;

use crate::codec::{Decoder, JsonDecoder};
use crate::error::{DataProviderError, FetchError, RequestError};
use crate::http::Request;
use crate::response::{map_response, RawExchange, Response};

/// Sends requests and reports one `Response` per request.
pub trait Transport {
    /// Issue `request` and hand the outcome to `callback`.
    ///
    /// Returns `Err` without calling `callback` when the target is not a
    /// valid address. Otherwise `callback` runs exactly once, possibly on
    /// another thread, and carries every later failure.
    fn send<T, F>(&self, request: &Request, callback: F) -> Result<(), RequestError>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Response<T>) + Send + 'static;

    /// Issue `request` and resolve with the decoded value.
    fn fetch<T>(&self, request: &Request) -> impl Future<Output = Result<T, FetchError>> + Send
    where
        T: DeserializeOwned + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let sent = self.send(request, move |response: Response<T>| {
            // The receiver is gone if the caller stopped waiting.
            let _ = tx.send(response);
        });
        async move {
            sent?;
            match rx.await {
                Ok(response) => response.map_err(FetchError::from),
                Err(_) => Err(DataProviderError::Unknown(None).into()),
            }
        }
    }
}

type Responder = dyn Fn(&Request) -> Result<RawExchange, RequestError> + Send + Sync;

/// A `Transport` that answers from a closure instead of the network.
///
/// The closure produces the raw exchange, which goes through the same
/// `map_response` as real traffic. The callback runs on the calling thread
/// before `send` returns. Every invocation is counted, including rejected
/// ones.
pub struct StubTransport<D = JsonDecoder> {
    responder: Box<Responder>,
    decoder: D,
    calls: AtomicUsize,
}

impl StubTransport<JsonDecoder> {
    pub fn new<R>(responder: R) -> Self
    where
        R: Fn(&Request) -> Result<RawExchange, RequestError> + Send + Sync + 'static,
    {
        Self::with_decoder(responder, JsonDecoder)
    }
}

impl<D: Decoder> StubTransport<D> {
    pub fn with_decoder<R>(responder: R, decoder: D) -> Self
    where
        R: Fn(&Request) -> Result<RawExchange, RequestError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            decoder,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<D: Decoder> Transport for StubTransport<D> {
    fn send<T, F>(&self, request: &Request, callback: F) -> Result<(), RequestError>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Response<T>) + Send + 'static,
    {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let exchange = (self.responder)(request)?;
        callback(map_response(exchange, &self.decoder));
        Ok(())
    }
}
