//! Failure injection against the remote-service boundary.

use std::sync::Arc;

use reqwest::{header, StatusCode};

mod common;

use common::{no_redirect_client, spawn_proxy, FakeBackend};

#[tokio::test]
async fn resolve_faults_surface_as_bad_gateway_not_as_misses() {
    let backend = Arc::new(FakeBackend::new());
    backend.set_fail_resolve(true);
    let (addr, _shutdown) = spawn_proxy(backend).await;
    let client = no_redirect_client();

    let response = client
        .get(format!("http://{addr}/deps-v1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(response.bytes().await.unwrap().is_empty());

    let response = client
        .head(format!("http://{addr}/deps-v1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn upload_target_faults_surface_as_bad_gateway() {
    let backend = Arc::new(FakeBackend::new());
    backend.set_fail_reserve(true);
    let (addr, _shutdown) = spawn_proxy(backend).await;
    let client = no_redirect_client();

    let response = client
        .post(format!("http://{addr}/deps-v1"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(response.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn a_fault_does_not_wedge_the_listener() {
    let backend = Arc::new(FakeBackend::new());
    let (addr, _shutdown) = spawn_proxy(backend.clone()).await;
    let client = no_redirect_client();

    backend.set_fail_resolve(true);
    let response = client
        .get(format!("http://{addr}/deps-v1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    // The remote recovers; the same proxy instance serves normally again.
    backend.set_fail_resolve(false);
    backend.insert("deps-v1", "https://store.example/archives/deps-v1.tar");

    let response = client
        .get(format!("http://{addr}/deps-v1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://store.example/archives/deps-v1.tar"
    );

    let response = client
        .head(format!("http://{addr}/other-key"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
