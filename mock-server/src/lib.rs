use std::{collections::BTreeMap, time::Duration};

use axum::{
    body::Bytes,
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// Fixed payload served by `/reply` and `/slow/{ms}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub response: String,
}

/// What `/inspect` saw of the incoming request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inspection {
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub body_len: usize,
}

pub fn app() -> Router {
    Router::new()
        .route("/status/{code}", any(status))
        .route("/echo", any(echo))
        .route("/reply", any(reply))
        .route("/empty", any(empty))
        .route("/inspect", any(inspect))
        .route("/slow/{ms}", any(slow))
        .route("/large/{len}", any(large))
        .route("/redirect/loop", any(redirect_loop))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn status(Path(code): Path<u16>) -> Response {
    match StatusCode::from_u16(code) {
        Ok(status) => (status, format!("status {code}")).into_response(),
        Err(_) => (StatusCode::BAD_REQUEST, "status out of range").into_response(),
    }
}

async fn echo(body: Bytes) -> Bytes {
    tracing::debug!(len = body.len(), "echo");
    body
}

async fn reply() -> Json<Reply> {
    Json(Reply {
        response: "value".to_string(),
    })
}

async fn empty() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn inspect(method: Method, headers: HeaderMap, body: Bytes) -> Json<Inspection> {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    Json(Inspection {
        method: method.as_str().to_string(),
        headers,
        body_len: body.len(),
    })
}

async fn slow(Path(ms): Path<u64>) -> Json<Reply> {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    Json(Reply {
        response: "slow".to_string(),
    })
}

/// A JSON string holding `len` copies of `a`.
async fn large(Path(len): Path<usize>) -> Response {
    let body = format!("\"{}\"", "a".repeat(len));
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn redirect_loop() -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, "/redirect/loop")],
        "redirecting",
    )
        .into_response()
}
