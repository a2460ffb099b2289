//! Integration tests for the gateway HTTP surface
//!
//! Requests go straight into the router with `oneshot`; backends are wiremock
//! servers addressed on 127.0.0.1.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use futures::StreamExt;
use gatehouse::gateway::Gateway;
use gatehouse::routes::build_router;
use gatehouse::test_utils::fixtures::{api_manifest, hybrid_manifest, tool_manifest, write_service};
use gatehouse::test_utils::test_helpers::{fast_timeouts, local_gateway};
use gatehouse::AppState;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt; // for `oneshot`
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestGateway {
    _services: TempDir,
    gateway: Arc<Gateway>,
    app: Router,
}

impl TestGateway {
    fn new(services: TempDir) -> Self {
        let gateway = Arc::new(local_gateway(services.path().to_path_buf(), &fast_timeouts()));
        let app = build_router(AppState::new(Arc::clone(&gateway)));
        Self {
            _services: services,
            gateway,
            app,
        }
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post(&self, uri: &str, body: &str) -> (StatusCode, Value) {
        self.send(
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }
}

async fn backend() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;
    server
}

/// svc-a: API on a mock backend; svc-b: stdio tool provider
async fn two_service_gateway(api_port: u16) -> TestGateway {
    let services = TempDir::new().unwrap();
    write_service(services.path(), "svc-a", &api_manifest("svc-a", api_port)).unwrap();
    write_service(services.path(), "svc-b", &tool_manifest("svc-b", &["t1", "t2"])).unwrap();

    let test = TestGateway::new(services);
    test.gateway.discover().await.unwrap();
    test
}

#[tokio::test]
async fn test_health_and_readiness_follow_discovery() {
    let services = TempDir::new().unwrap();
    let test = TestGateway::new(services);

    let (status, body) = test.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["phase"], "starting");

    let (status, body) = test.get("/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["ready"], false);

    test.gateway.discover().await.unwrap();

    let (status, body) = test.get("/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "ready");

    let (_, body) = test.get("/health").await;
    assert_eq!(body["services"], 0);
}

#[tokio::test]
async fn test_list_services_includes_live_health() {
    let server = backend().await;
    let test = two_service_gateway(server.address().port()).await;

    let (status, body) = test.get("/services").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["svc-a"]["type"], "api");
    assert_eq!(body["svc-a"]["capabilities"]["api"], true);
    assert_eq!(body["svc-a"]["health"]["status"], "healthy");
    assert_eq!(body["svc-a"]["endpoints"], json!(["/items"]));
    assert_eq!(body["svc-b"]["type"], "tool-provider");
    assert_eq!(body["svc-b"]["tools"], json!(["t1", "t2"]));
    assert_eq!(body["svc-b"]["health"]["detail"], "non-api");
}

#[tokio::test]
async fn test_capability_listings() {
    let server = backend().await;
    let port = server.address().port();
    let test = two_service_gateway(port).await;

    let (_, api) = test.get("/services/api").await;
    assert_eq!(api.as_object().unwrap().len(), 1);
    assert_eq!(api["svc-a"]["url"], format!("http://127.0.0.1:{}", port));
    assert_eq!(api["svc-a"]["health"], "healthy");

    let (_, tools) = test.get("/services/tools").await;
    assert_eq!(tools.as_object().unwrap().len(), 1);
    assert_eq!(tools["svc-b"]["protocol"], "stdio");
    assert_eq!(tools["svc-b"]["url"], Value::Null);
}

#[tokio::test]
async fn test_discovery_and_routing_views() {
    let server = backend().await;
    let port = server.address().port();
    let test = two_service_gateway(port).await;

    let (_, discovery) = test.get("/discovery").await;
    assert_eq!(discovery["total"], 2);
    assert_eq!(discovery["phase"], "ready");
    assert_eq!(discovery["services"]["svc-b"]["capabilities"]["tool_provider"], true);

    let (_, routing) = test.get("/routing").await;
    assert_eq!(routing["api_services"]["svc-a"]["port"], port);
    assert_eq!(routing["tool_services"]["svc-b"]["tools"], json!(["t1", "t2"]));
    assert!(routing["health_endpoints"].get("svc-b").is_none());
}

#[tokio::test]
async fn test_refresh_picks_up_new_descriptors() {
    let services = TempDir::new().unwrap();
    write_service(services.path(), "first", &tool_manifest("first", &["a"])).unwrap();
    let root = services.path().to_path_buf();
    let test = TestGateway::new(services);
    test.gateway.discover().await.unwrap();
    assert_eq!(test.gateway.registry().len(), 1);

    write_service(&root, "second", &tool_manifest("second", &["b"])).unwrap();
    write_service(&root, "broken", "name: [").unwrap();

    let (status, body) = test.post("/discovery/refresh", "").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["services"], 2);
    assert_eq!(body["failures"].as_array().unwrap().len(), 1);
    assert!(test.gateway.registry().get("second").is_some());
}

#[tokio::test]
async fn test_single_service_health() {
    let server = backend().await;
    let test = two_service_gateway(server.address().port()).await;

    let (status, body) = test.get("/services/svc-a/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["health"]["status"], "healthy");

    let (status, body) = test.get("/services/ghost/health").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "service_not_found");
}

#[tokio::test]
async fn test_tool_catalog_endpoint() {
    let server = backend().await;
    let test = two_service_gateway(server.address().port()).await;

    let (status, body) = test.get("/tools").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["svc-b"][0]["name"], "t1");
    assert_eq!(body["svc-b"][1]["description"], "Tool from svc-b");
    assert!(body.get("svc-a").is_none());
}

#[tokio::test]
async fn test_execute_tool_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": "1",
            "result": {"echo": "hi"}
        })))
        .mount(&server)
        .await;

    let services = TempDir::new().unwrap();
    write_service(
        services.path(),
        "echo",
        &hybrid_manifest("echo", server.address().port(), &["say"]),
    )
    .unwrap();
    write_service(services.path(), "svc-b", &tool_manifest("svc-b", &["t1"])).unwrap();
    let test = TestGateway::new(services);
    test.gateway.discover().await.unwrap();

    let (status, body) = test.post("/tools/echo/say", r#"{"text": "hi"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "echo");
    assert_eq!(body["tool"], "say");
    assert_eq!(body["result"]["echo"], "hi");

    let (status, body) = test.post("/tools/echo/say", "[1, 2]").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");

    let (status, body) = test.post("/tools/svc-b/t1", "").await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(body["error"], "not_implemented");

    let (status, _) = test.post("/tools/ghost/t1", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_proxy_endpoint_strips_prefix() {
    let server = backend().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("root"))
        .mount(&server)
        .await;
    let test = two_service_gateway(server.address().port()).await;

    let (status, body) = test.get("/proxy/svc-a/items?limit=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"id": 1}]));

    let (status, body) = test.get("/proxy/svc-a").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "root");

    let (status, body) = test.get("/proxy/svc%2Da/items").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"id": 1}]));

    let (status, body) = test.get("/proxy/svc-b/anything").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "service_not_found");
}

#[tokio::test]
async fn test_health_stream_sends_current_snapshot_first() {
    let server = backend().await;
    let test = two_service_gateway(server.address().port()).await;

    let response = test
        .app
        .clone()
        .oneshot(Request::get("/health/stream").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let mut frames = response.into_body().into_data_stream();
    let first = frames.next().await.unwrap().unwrap();
    let text = String::from_utf8_lossy(&first);
    assert!(text.contains("event: health"));
    assert!(text.contains("svc-a"));
}

#[tokio::test]
async fn test_health_stream_ends_on_shutdown() {
    let test = TestGateway::new(TempDir::new().unwrap());

    let response = test
        .app
        .clone()
        .oneshot(Request::get("/health/stream").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let mut frames = response.into_body().into_data_stream();
    frames.next().await.unwrap().unwrap();

    test.gateway.shutdown_token().cancel();

    let rest = tokio::time::timeout(std::time::Duration::from_secs(2), async {
        while frames.next().await.is_some() {}
    })
    .await;
    assert!(rest.is_ok());
}
