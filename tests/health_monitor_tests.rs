use gatehouse::models::HealthStatus;
use gatehouse::services::health_monitor::spawn_health_monitor;
use gatehouse::test_utils::fixtures::{api_manifest, write_service};
use gatehouse::test_utils::test_helpers::{fast_timeouts, local_gateway};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_monitor_broadcasts_each_sweep_until_cancelled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let services = TempDir::new().unwrap();
    write_service(services.path(), "svc-a", &api_manifest("svc-a", server.address().port())).unwrap();

    let gateway = Arc::new(local_gateway(services.path().to_path_buf(), &fast_timeouts()));
    gateway.discover().await.unwrap();

    let mut updates = gateway.subscribe_health();
    let ct = gateway.shutdown_token();
    let handle = spawn_health_monitor(Arc::clone(&gateway), Duration::from_millis(50), ct.clone());

    for _ in 0..2 {
        let snapshot = tokio::time::timeout(Duration::from_secs(2), updates.recv())
            .await
            .expect("no sweep within two seconds")
            .unwrap();
        assert_eq!(snapshot.services["svc-a"].status, HealthStatus::Healthy);
    }

    ct.cancel();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("monitor did not stop")
        .unwrap();
}

#[tokio::test]
async fn test_discovery_publishes_a_snapshot() {
    let services = TempDir::new().unwrap();
    let gateway = local_gateway(services.path().to_path_buf(), &fast_timeouts());
    let mut updates = gateway.subscribe_health();

    gateway.discover().await.unwrap();

    let snapshot = updates.try_recv().unwrap();
    assert!(snapshot.services.is_empty());
    assert!(gateway.is_ready());
}
