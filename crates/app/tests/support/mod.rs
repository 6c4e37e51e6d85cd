//! In-process echo service for integration tests.
//!
//! Implements the subset of the httpbin contract the harness relies on.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, Query};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::routing::{delete, get, post, put};
use serde_json::{Value, json};

/// A running echo server.
pub struct EchoServer {
    addr: SocketAddr,
}

impl EchoServer {
    /// Starts the server on an ephemeral port.
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/get", get(echo_query))
            .route("/headers", get(echo_headers))
            .route("/post", post(echo_body))
            .route("/put", put(echo_body))
            .route("/delete", delete(echo_body))
            .route("/delay/{seconds}", get(delay))
            .route("/status/{code}", get(status).post(status))
            .route("/latin1", get(latin1_header));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind echo server");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("echo server");
        });
        Self { addr }
    }

    /// Base URL ending in `/`.
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Absolute URL for `path`.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}/{}", self.addr, path.trim_start_matches('/'))
    }
}

/// A URL on a port nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/get")
}

async fn echo_query(
    Query(args): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    Json(json!({ "args": args, "headers": header_map(&headers) }))
}

async fn echo_headers(headers: HeaderMap) -> Json<Value> {
    Json(json!({ "headers": header_map(&headers) }))
}

async fn echo_body(
    Query(args): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Value> {
    let parsed: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    Json(json!({
        "args": args,
        "headers": header_map(&headers),
        "data": String::from_utf8_lossy(&body),
        "json": parsed,
    }))
}

async fn delay(Path(seconds): Path<u64>, headers: HeaderMap) -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(seconds.min(10))).await;
    Json(json!({ "args": {}, "headers": header_map(&headers) }))
}

async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

/// Responds with a header value that is not valid UTF-8.
async fn latin1_header() -> (HeaderMap, &'static str) {
    let mut headers = HeaderMap::new();
    headers.insert("x-latin1", HeaderValue::from_bytes(b"caf\xe9").unwrap());
    (headers, "ok")
}

/// Header names title-cased the way httpbin reports them.
fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                title_case(name.as_str()),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect()
}

fn title_case(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join("-")
}
