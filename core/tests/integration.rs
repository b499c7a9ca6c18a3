//! `HttpTransport` against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port in its own thread and runtime,
//! then sends real requests through the default ureq-backed transport.
//! Covers both the upload and plain paths, every failure kind the network
//! can produce, redirects, large bodies and the callback contract.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::mpsc;
use std::time::Duration;

use bytes::Bytes;
use dataprovider_core::{
    DataProviderError, Empty, FetchError, HttpTransport, JsonEncoder, Method, Request,
    RequestError, Response, StatusCode, Transport, TransportConfig,
};
use mock_server::{Inspection, Reply};

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn transport() -> HttpTransport {
    HttpTransport::new(&TransportConfig {
        timeout_ms: Some(5_000),
        ..TransportConfig::default()
    })
}

#[tokio::test]
async fn post_with_json_body_decodes_reply() {
    let addr = start_server();
    let request = Request::encoded(
        Method::Post,
        format!("http://{addr}/reply"),
        HashMap::from([("content-type".to_string(), "application/json".to_string())]),
        &serde_json::json!({ "a": 1 }),
        &JsonEncoder,
    )
    .unwrap();

    let reply: Reply = transport().fetch(&request).await.unwrap();
    assert_eq!(reply.response, "value");
}

#[tokio::test]
async fn upload_carries_method_headers_and_body() {
    let addr = start_server();
    let request = Request::new(Method::Put, format!("http://{addr}/inspect"))
        .with_header("x-token", "abc")
        .with_body("12345");

    let seen: Inspection = transport().fetch(&request).await.unwrap();
    assert_eq!(seen.method, "PUT");
    assert_eq!(seen.headers["x-token"], "abc");
    assert_eq!(seen.body_len, 5);
}

#[tokio::test]
async fn get_with_body_is_still_an_upload() {
    let addr = start_server();
    let request = Request::new(Method::Get, format!("http://{addr}/inspect")).with_body("abc");

    let seen: Inspection = transport().fetch(&request).await.unwrap();
    assert_eq!(seen.method, "GET");
    assert_eq!(seen.body_len, 3);
}

#[tokio::test]
async fn plain_call_for_every_bodyless_method() {
    let addr = start_server();
    for method in [Method::Get, Method::Delete, Method::Options, Method::Post, Method::Patch] {
        let request = Request::new(method, format!("http://{addr}/inspect"));
        let seen: Inspection = transport().fetch(&request).await.unwrap();
        assert_eq!(seen.method, method.as_str());
        assert_eq!(seen.body_len, 0, "{method}");
    }
}

#[tokio::test]
async fn not_found_is_service_error_with_body() {
    let addr = start_server();
    let request = Request::new(Method::Get, format!("http://{addr}/status/404"));

    let err = transport().fetch::<Empty>(&request).await.unwrap_err();
    assert_eq!(
        err,
        FetchError::Provider(DataProviderError::Service {
            code: Some(StatusCode::NOT_FOUND),
            body: Some(Bytes::from_static(b"status 404")),
        })
    );
}

#[tokio::test]
async fn unrecognized_status_drops_code_keeps_body() {
    let addr = start_server();
    let request = Request::new(Method::Get, format!("http://{addr}/status/599"));

    let err = transport().fetch::<Empty>(&request).await.unwrap_err();
    assert_eq!(
        err,
        FetchError::Provider(DataProviderError::Service {
            code: None,
            body: Some(Bytes::from_static(b"status 599")),
        })
    );
}

#[tokio::test]
async fn undecodable_success_is_decode_error() {
    let addr = start_server();
    let request = Request::new(Method::Get, format!("http://{addr}/status/200"));

    let err = transport().fetch::<Reply>(&request).await.unwrap_err();
    assert!(matches!(err, FetchError::Provider(DataProviderError::Decode(_))));
}

#[tokio::test]
async fn no_content_decodes_as_empty() {
    let addr = start_server();
    let request = Request::new(Method::Delete, format!("http://{addr}/empty"));

    let value: Empty = transport().fetch(&request).await.unwrap();
    assert_eq!(value, Empty);
}

#[tokio::test]
async fn echo_round_trips_bytes() {
    let addr = start_server();
    let payload = serde_json::json!({ "response": "echoed" });
    let request = Request::encoded(
        Method::Post,
        format!("http://{addr}/echo"),
        HashMap::new(),
        &payload,
        &JsonEncoder,
    )
    .unwrap();

    let back: serde_json::Value = transport().fetch(&request).await.unwrap();
    assert_eq!(back, payload);
}

#[tokio::test]
async fn timeout_is_unreachable() {
    let addr = start_server();
    let transport = HttpTransport::new(&TransportConfig {
        timeout_ms: Some(100),
        ..TransportConfig::default()
    });
    let request = Request::new(Method::Get, format!("http://{addr}/slow/2000"));

    let err = transport.fetch::<Reply>(&request).await.unwrap_err();
    assert_eq!(err, FetchError::Provider(DataProviderError::Unreachable));
}

#[tokio::test]
async fn refused_connection_is_unreachable() {
    // Bind and drop to get a port nobody listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let request = Request::new(Method::Get, format!("http://{addr}/reply"));

    let err = transport().fetch::<Reply>(&request).await.unwrap_err();
    assert_eq!(err, FetchError::Provider(DataProviderError::Unreachable));
}

#[tokio::test]
async fn body_larger_than_ten_mebibytes_is_read_whole() {
    let addr = start_server();
    let len = 11 * 1024 * 1024;
    let request = Request::new(Method::Get, format!("http://{addr}/large/{len}"));

    let text: String = transport().fetch(&request).await.unwrap();
    assert_eq!(text.len(), len);
}

#[tokio::test]
async fn body_over_configured_limit_fails_the_exchange() {
    let addr = start_server();
    let transport = HttpTransport::new(&TransportConfig {
        timeout_ms: Some(5_000),
        max_body_bytes: Some(1024),
        ..TransportConfig::default()
    });
    let request = Request::new(Method::Get, format!("http://{addr}/large/4096"));

    let err = transport.fetch::<String>(&request).await.unwrap_err();
    assert_eq!(err, FetchError::Provider(DataProviderError::Unreachable));
}

#[tokio::test]
async fn exhausted_redirects_return_the_last_redirect() {
    let addr = start_server();
    let transport = HttpTransport::new(&TransportConfig {
        timeout_ms: Some(5_000),
        max_redirects: 2,
        ..TransportConfig::default()
    });
    let request = Request::new(Method::Get, format!("http://{addr}/redirect/loop"));

    let err = transport.fetch::<Empty>(&request).await.unwrap_err();
    assert!(
        matches!(
            err,
            FetchError::Provider(DataProviderError::Service {
                code: Some(StatusCode::FOUND),
                ..
            })
        ),
        "{err:?}"
    );
}

#[test]
fn unencodable_header_arrives_through_the_callback() {
    let addr = start_server();
    let (tx, rx) = mpsc::channel();

    let request =
        Request::new(Method::Get, format!("http://{addr}/reply")).with_header("x-name", "a\r\nb");
    transport()
        .send(&request, move |response: Response<Reply>| tx.send(response).unwrap())
        .unwrap();

    let response = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert_eq!(response, Err(DataProviderError::Unknown(None)));
}

#[tokio::test]
async fn blank_target_fails_synchronously() {
    let err = transport()
        .fetch::<Empty>(&Request::new(Method::Get, "   "))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FetchError::Request(RequestError::InvalidTarget { ref target, .. }) if target == "   "
    ));
}

#[test]
fn callback_runs_once_outside_a_runtime() {
    let addr = start_server();
    let (tx, rx) = mpsc::channel();

    transport()
        .send(
            &Request::new(Method::Get, format!("http://{addr}/reply")),
            move |response: Response<Reply>| tx.send(response).unwrap(),
        )
        .unwrap();

    let response = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert_eq!(
        response,
        Ok(Reply {
            response: "value".to_string()
        })
    );
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
}
