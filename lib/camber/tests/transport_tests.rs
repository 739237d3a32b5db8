//! Transport-level tests: timeout, retry, and connection failures.

use std::time::Duration;

use assert2::{check, let_assert};
use camber::{Camber, Error, Method, OperationSpec, Protocol, args};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn builder_for(server: &MockServer) -> camber::CamberBuilder {
    let uri = url::Url::parse(&server.uri()).expect("uri");
    Camber::builder()
        .api_key("sk_test_123")
        .protocol(Protocol::Http)
        .host(uri.host_str().expect("host").to_owned())
        .port(uri.port().expect("port"))
}

#[tokio::test]
async fn timeout_resolves_as_a_single_connection_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/public/v1/campsites"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": []}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = builder_for(&server)
        .timeout(Duration::from_millis(50))
        .build()
        .expect("client");
    let list = client
        .resource("campsites")
        .operation(OperationSpec::new(Method::Get, ""));

    let err = list.call(args![]).await.expect_err("must time out");
    check!(err.is_connection());
    check!(err.to_string().contains("timeout being reached (50ms)"));
    check!(err.retries() == Some(0));
}

#[tokio::test]
async fn timeout_also_covers_body_receipt() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    // A server that sends headers plus a partial body, then stalls with the
    // socket held open.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut buf = [0u8; 1024];
        let _ = socket.read(&mut buf).await;
        let _ = socket
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 100\r\n\r\npartial")
            .await;
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(socket);
    });

    let client = Camber::builder()
        .api_key("sk_test_123")
        .protocol(Protocol::Http)
        .host("127.0.0.1")
        .port(addr.port())
        .timeout(Duration::from_millis(100))
        .build()
        .expect("client");
    let list = client
        .resource("campsites")
        .operation(OperationSpec::new(Method::Get, ""));

    let err = tokio::time::timeout(Duration::from_secs(2), list.call(args![]))
        .await
        .expect("exchange resolves before the outer guard")
        .expect_err("must time out");
    check!(err.is_connection());
    check!(err.to_string().contains("timeout being reached (100ms)"));
}

#[tokio::test]
async fn idempotent_request_is_retried_after_a_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/public/v1/campsites"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/public/v1/campsites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let client = builder_for(&server)
        .max_retries(1)
        .build()
        .expect("client");
    let list = client
        .resource("campsites")
        .operation(OperationSpec::new(Method::Get, ""));

    let listed = list.call(args![]).await.expect("listed after retry");
    check!(listed.transport().status == 200);
    check!(server.received_requests().await.unwrap_or_default().len() == 2);
}

#[tokio::test]
async fn non_idempotent_request_is_never_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/public/v1/campsites"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"error": {"type": "api_error", "message": "boom"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = builder_for(&server)
        .max_retries(2)
        .build()
        .expect("client");
    let create = client
        .resource("campsites")
        .operation(OperationSpec::new(Method::Post, ""));

    let err = create
        .call(args![{"name": "Pine Hollow"}])
        .await
        .expect_err("must fail");
    let_assert!(Error::Api(failure) = err);
    check!(failure.status == Some(500));
    check!(failure.message.as_deref() == Some("boom"));
}

#[tokio::test]
async fn connection_refusal_reports_the_retry_count() {
    // Port 1 is never listening.
    let client = Camber::builder()
        .api_key("sk_test_123")
        .protocol(Protocol::Http)
        .host("127.0.0.1")
        .port(1)
        .max_retries(1)
        .timeout(Duration::from_millis(250))
        .build()
        .expect("client");
    let list = client
        .resource("campsites")
        .operation(OperationSpec::new(Method::Get, ""));

    let err = list.call(args![]).await.expect_err("must fail");
    check!(err.is_connection());
    check!(err.retries() == Some(1));
}
