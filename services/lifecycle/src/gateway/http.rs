//! HTTP implementation of the namespace gateway.
//!
//! # Purpose
//! Speaks the cluster control plane's REST dialect over `reqwest`. Responses
//! map onto [`GatewayError`] so callers never see raw status codes:
//! - `404` becomes `NotFound`, the only signal the confirmation loop trusts
//! - `409` becomes `Conflict`
//! - connection and timeout failures become `Transport`
//! - everything else becomes `Unexpected` with the response body attached
use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};

use super::{GatewayError, GatewayResult, NamespaceGateway};
use crate::model::NamespaceRecord;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct CreateRecordRequest<'a> {
    name: &'a str,
    annotations: &'a HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RecordPayload {
    name: String,
    #[serde(default)]
    annotations: HashMap<String, String>,
    created_at: Option<DateTime<Utc>>,
}

impl RecordPayload {
    fn into_record(self) -> NamespaceRecord {
        NamespaceRecord {
            name: self.name,
            annotations: self.annotations,
            // Some control planes omit the creation timestamp; fall back to
            // the epoch rather than inventing a clock reading.
            created_at: self.created_at.unwrap_or(DateTime::UNIX_EPOCH),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RecordListResponse {
    items: Vec<RecordPayload>,
}

pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("build gateway http client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            token,
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let mut builder = self.client.request(method, url);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }
}

fn transport_error(operation: &str, err: reqwest::Error) -> GatewayError {
    GatewayError::Transport(format!("{operation}: {err}"))
}

/// Percent-encodes one path segment. Record names are caller-supplied, so
/// anything outside the unreserved set is escaped to keep a name containing
/// `/` or `?` from addressing a different resource.
fn encode_segment(name: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(name.len());
    for byte in name.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char);
            }
            _ => {
                out.push('%');
                out.push(HEX[usize::from(byte >> 4)] as char);
                out.push(HEX[usize::from(byte & 0x0f)] as char);
            }
        }
    }
    out
}

/// Resolves the response status into the gateway error taxonomy. `subject` is
/// what the request was about, usually the namespace name.
async fn check(subject: &str, response: reqwest::Response) -> GatewayResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::NOT_FOUND => Err(GatewayError::NotFound(subject.to_string())),
        StatusCode::CONFLICT => Err(GatewayError::Conflict(if body.is_empty() {
            format!("{subject} already exists")
        } else {
            body
        })),
        _ => Err(GatewayError::Unexpected(anyhow!(
            "{subject}: gateway returned {status}: {body}"
        ))),
    }
}

#[async_trait]
impl NamespaceGateway for HttpGateway {
    async fn create_record(
        &self,
        name: &str,
        annotations: HashMap<String, String>,
    ) -> GatewayResult<NamespaceRecord> {
        let response = self
            .request(Method::POST, "/v1/namespaces")
            .json(&CreateRecordRequest {
                name,
                annotations: &annotations,
            })
            .send()
            .await
            .map_err(|err| transport_error("create namespace", err))?;
        let payload: RecordPayload = check(name, response)
            .await?
            .json()
            .await
            .map_err(|err| anyhow::Error::new(err).context("create namespace body"))?;
        Ok(payload.into_record())
    }

    async fn get_record(&self, name: &str) -> GatewayResult<NamespaceRecord> {
        let response = self
            .request(Method::GET, &format!("/v1/namespaces/{}", encode_segment(name)))
            .send()
            .await
            .map_err(|err| transport_error("get namespace", err))?;
        let payload: RecordPayload = check(name, response)
            .await?
            .json()
            .await
            .map_err(|err| anyhow::Error::new(err).context("get namespace body"))?;
        Ok(payload.into_record())
    }

    async fn delete_record(&self, name: &str) -> GatewayResult<()> {
        let response = self
            .request(Method::DELETE, &format!("/v1/namespaces/{}", encode_segment(name)))
            .send()
            .await
            .map_err(|err| transport_error("delete namespace", err))?;
        check(name, response).await?;
        Ok(())
    }

    async fn list_records(&self) -> GatewayResult<Vec<NamespaceRecord>> {
        let response = self
            .request(Method::GET, "/v1/namespaces")
            .send()
            .await
            .map_err(|err| transport_error("list namespaces", err))?;
        let payload: RecordListResponse = check("namespaces", response)
            .await?
            .json()
            .await
            .map_err(|err| anyhow::Error::new(err).context("list namespaces body"))?;
        Ok(payload
            .items
            .into_iter()
            .map(RecordPayload::into_record)
            .collect())
    }

    async fn health_check(&self) -> GatewayResult<()> {
        self.list_records().await.map(|_| ())
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::HeaderMap;
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    async fn serve(router: Router) -> (String, tokio::task::JoinHandle<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve stub");
        });
        (format!("http://{addr}"), handle)
    }

    #[tokio::test]
    async fn create_parses_the_returned_record() {
        let router = Router::new().route(
            "/v1/namespaces",
            post(|Json(body): Json<serde_json::Value>| async move {
                (
                    StatusCode::CREATED,
                    Json(json!({
                        "name": body["name"],
                        "annotations": body["annotations"],
                        "created_at": "2024-05-01T08:00:00Z",
                    })),
                )
            }),
        );
        let (base_url, server) = serve(router).await;

        let gateway = HttpGateway::new(base_url, None).expect("gateway");
        let mut annotations = HashMap::new();
        annotations.insert("owner".to_string(), "alice".to_string());
        let record = gateway
            .create_record("demo", annotations)
            .await
            .expect("create");
        assert_eq!(record.name, "demo");
        assert_eq!(record.annotations.get("owner").map(String::as_str), Some("alice"));
        assert_eq!(record.created_at.to_rfc3339(), "2024-05-01T08:00:00+00:00");
        server.abort();
    }

    #[tokio::test]
    async fn missing_record_maps_to_not_found() {
        let router = Router::new().route(
            "/v1/namespaces/:name",
            get(|| async { StatusCode::NOT_FOUND }),
        );
        let (base_url, server) = serve(router).await;

        let gateway = HttpGateway::new(base_url, None).expect("gateway");
        let err = gateway.get_record("ghost").await.expect_err("missing");
        assert!(err.is_not_found());
        server.abort();
    }

    #[tokio::test]
    async fn record_names_travel_as_a_single_path_segment() {
        let router = Router::new().route(
            "/v1/namespaces/:name",
            get(|Path(name): Path<String>| async move {
                Json(json!({"name": name, "annotations": {}}))
            }),
        );
        let (base_url, server) = serve(router).await;

        let gateway = HttpGateway::new(base_url, None).expect("gateway");
        // Unencoded, this name would splice extra path components and a query
        // string into the URL and the route would never match.
        let record = gateway.get_record("team/alpha?shard=1").await.expect("get");
        assert_eq!(record.name, "team/alpha?shard=1");
        server.abort();
    }

    #[tokio::test]
    async fn conflict_status_maps_to_conflict() {
        let router = Router::new().route(
            "/v1/namespaces",
            post(|| async { (StatusCode::CONFLICT, "namespace demo exists") }),
        );
        let (base_url, server) = serve(router).await;

        let gateway = HttpGateway::new(base_url, None).expect("gateway");
        let err = gateway
            .create_record("demo", HashMap::new())
            .await
            .expect_err("conflict");
        assert!(matches!(err, GatewayError::Conflict(message) if message.contains("demo")));
        server.abort();
    }

    #[tokio::test]
    async fn server_errors_map_to_unexpected_not_absence() {
        let router = Router::new().route(
            "/v1/namespaces/:name",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "etcd leader lost") }),
        );
        let (base_url, server) = serve(router).await;

        let gateway = HttpGateway::new(base_url, None).expect("gateway");
        let err = gateway.get_record("demo").await.expect_err("server error");
        // A 5xx says nothing about absence, so the confirmation loop must not
        // read it as the record being gone.
        assert!(!err.is_not_found());
        match err {
            GatewayError::Unexpected(source) => {
                let message = source.to_string();
                assert!(message.contains("500"));
                assert!(message.contains("etcd leader lost"));
            }
            other => panic!("unexpected error: {other}"),
        }
        server.abort();
    }

    #[tokio::test]
    async fn unreachable_gateway_maps_to_transport() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);

        let gateway = HttpGateway::new(format!("http://{addr}"), None).expect("gateway");
        let err = gateway.delete_record("demo").await.expect_err("refused");
        assert!(matches!(err, GatewayError::Transport(_)));
    }

    #[tokio::test]
    async fn list_tolerates_records_without_created_at() {
        let router = Router::new().route(
            "/v1/namespaces",
            get(|| async {
                Json(json!({
                    "items": [
                        {"name": "demo", "annotations": {"owner": "alice"}},
                    ]
                }))
            }),
        );
        let (base_url, server) = serve(router).await;

        let gateway = HttpGateway::new(base_url, None).expect("gateway");
        let records = gateway.list_records().await.expect("list");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].created_at, DateTime::UNIX_EPOCH);
        server.abort();
    }

    #[tokio::test]
    async fn bearer_token_rides_along_when_configured() {
        let router = Router::new().route(
            "/v1/namespaces",
            get(|headers: HeaderMap| async move {
                let authorized = headers
                    .get("authorization")
                    .and_then(|value| value.to_str().ok())
                    == Some("Bearer sekrit");
                if authorized {
                    Json(json!({"items": []})).into_response()
                } else {
                    StatusCode::UNAUTHORIZED.into_response()
                }
            }),
        );
        let (base_url, server) = serve(router).await;

        let gateway =
            HttpGateway::new(base_url, Some("sekrit".to_string())).expect("gateway");
        gateway.health_check().await.expect("authorized");
        server.abort();
    }

    #[test]
    fn segment_encoding_escapes_path_metacharacters() {
        assert_eq!(encode_segment("demo-1.2_x~"), "demo-1.2_x~");
        assert_eq!(encode_segment("team/alpha?shard=1"), "team%2Falpha%3Fshard%3D1");
    }
}
