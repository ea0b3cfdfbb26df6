//! reqwest transport against a local mock server.

use fetch_api::protocol::JsonSchemaValidator;
use fetch_api::{
    ApiResponse, ClientConfig, FailureKind, FetchClient, JsonRpcEnvelope, MultipartBody,
    ParseKind, Payload, RequestOptions,
};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

/// Test fixture that owns a mock server and a client with default settings.
struct MockServerFixture {
    server: ServerGuard,
    client: FetchClient,
}

impl MockServerFixture {
    async fn new() -> Self {
        let server = Server::new_async().await;
        let client = FetchClient::builder()
            .config(ClientConfig::default())
            .build()
            .expect("client");
        Self { server, client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.server.url(), path)
    }
}

#[tokio::test]
async fn test_rest_get_with_query_and_schema() {
    let mut fx = MockServerFixture::new().await;
    let mock = fx
        .server
        .mock("GET", "/items")
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .match_header("x-trace", "t-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":false,"errorText":"","additionalErrors":[],"data":{"id":1}}"#)
        .create_async()
        .await;

    let schema = JsonSchemaValidator::compile(&json!({
        "type": "object",
        "required": ["id"],
        "properties": {"id": {"type": "integer"}}
    }))
    .unwrap();

    let response = fx
        .client
        .rest()
        .get(
            &fx.url("/items"),
            RequestOptions::new()
                .query("page", "2")
                .header("X-Trace", "t-1")
                .schema(schema),
        )
        .await;

    mock.assert_async().await;
    assert_eq!(response, ApiResponse::success(Payload::Json(json!({"id": 1}))));
}

#[tokio::test]
async fn test_json_rpc_post_sends_merged_body() {
    let mut fx = MockServerFixture::new().await;
    let mock = fx
        .server
        .mock("POST", "/rpc")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "method": "user.get",
            "params": [7],
            "jsonrpc": "2.0",
            "id": "abc"
        })))
        .with_status(200)
        .with_body(r#"{"jsonrpc":"2.0","id":"abc","result":{"name":"Ada"}}"#)
        .create_async()
        .await;

    let response = fx
        .client
        .json_rpc()
        .post(
            &fx.url("/rpc"),
            RequestOptions::new()
                .json(json!({"method": "user.get", "params": [7]}))
                .json_rpc(JsonRpcEnvelope::new("abc")),
        )
        .await;

    mock.assert_async().await;
    assert_eq!(response, ApiResponse::success(Payload::Json(json!({"name": "Ada"}))));
}

#[tokio::test]
async fn test_status_outside_whitelist() {
    let mut fx = MockServerFixture::new().await;
    let _mock = fx
        .server
        .mock("DELETE", "/items/1")
        .with_status(404)
        .with_body(r#"{"error":false,"errorText":"","additionalErrors":[],"data":null}"#)
        .create_async()
        .await;

    let response = fx
        .client
        .rest()
        .delete(&fx.url("/items/1"), RequestOptions::new())
        .await;

    let err = response.error().unwrap();
    assert_eq!(err.kind, FailureKind::UnacceptableStatus);
    assert_eq!(err.status, Some(404));
    assert_eq!(err.error_text, "errors.network");
}

#[tokio::test]
async fn test_multipart_upload() {
    let mut fx = MockServerFixture::new().await;
    let mock = fx
        .server
        .mock("POST", "/upload")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data; boundary=.+$".into()),
        )
        .match_body(Matcher::Regex("name=\"title\"".into()))
        .with_status(201)
        .with_body(r#"{"error":false,"errorText":"","additionalErrors":[],"data":{"stored":true}}"#)
        .create_async()
        .await;

    let form = MultipartBody::new().text("title", "report").file(
        "file",
        &b"%PDF-1.7"[..],
        Some("report.pdf".into()),
        Some("application/pdf".into()),
    );
    let response = fx
        .client
        .pure_rest()
        .post(&fx.url("/upload"), RequestOptions::new().multipart(form))
        .await;

    mock.assert_async().await;
    assert!(response.is_success());
}

#[tokio::test]
async fn test_blob_download_and_error_body() {
    let mut fx = MockServerFixture::new().await;
    let _ok = fx
        .server
        .mock("GET", "/files/1")
        .with_status(200)
        .with_header("content-type", "application/octet-stream")
        .with_body(&b"\x00\x01binary"[..])
        .create_async()
        .await;
    let _bad = fx
        .server
        .mock("GET", "/files/2")
        .with_status(400)
        .with_body(r#"{"error":true,"errorText":"errors.file_missing","additionalErrors":[],"data":null}"#)
        .create_async()
        .await;

    let blob_options = || {
        RequestOptions::new()
            .parse_kind(ParseKind::Blob)
            .extra_validation(|input| input.payload.as_bytes().is_some())
    };

    let response = fx
        .client
        .rest()
        .get(&fx.url("/files/1"), blob_options())
        .await;
    assert_eq!(
        response.data().and_then(Payload::as_bytes).map(|b| b.to_vec()),
        Some(b"\x00\x01binary".to_vec())
    );

    // the override rejects JSON, so the non-ok body fails validation
    let response = fx
        .client
        .rest()
        .get(&fx.url("/files/2"), blob_options())
        .await;
    assert_eq!(response.error().unwrap().kind, FailureKind::MalformedBaseFormat);
}

#[tokio::test]
async fn test_connection_refused_is_network_failure() {
    let client = FetchClient::builder()
        .config(ClientConfig::default())
        .build()
        .unwrap();
    let response = client
        .rest()
        .get("http://127.0.0.1:9/unreachable", RequestOptions::new())
        .await;
    let err = response.error().unwrap();
    assert_eq!(err.kind, FailureKind::NetworkFailure);
    assert_eq!(err.error_text, "errors.network");
}
