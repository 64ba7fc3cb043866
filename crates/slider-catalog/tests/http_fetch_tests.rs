//! HttpFetcher against local servers (axum, or a raw socket for broken replies).

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use slider_catalog::{
    CatalogConfig, CatalogError, CatalogOrigin, CatalogStore, DocumentSource, FetchError,
    HttpFetcher,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

const DEFINE_JS: &str = r#"var json_file = {"default_satellite":"goes_19","satellites":{"goes_19":{"satellite_title":"GOES-19 (East)","sectors":{"full_disk":{"sector_title":"Full Disk"}},"products":{"geocolor":{"product_title":"GeoColor"}}}}};"#;

async fn spawn_server() -> SocketAddr {
    let app = Router::new()
        .route("/define.js", get(|| async { DEFINE_JS }))
        .route(
            "/missing.js",
            get(|| async { (StatusCode::NOT_FOUND, "not here") }),
        )
        .route(
            "/maintenance.js",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "back soon") }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn config_for(url: String) -> CatalogConfig {
    CatalogConfig {
        source_url: url,
        request_timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(2),
        ..CatalogConfig::default()
    }
}

#[tokio::test]
async fn test_fetch_ok_returns_body() {
    let addr = spawn_server().await;
    let fetcher = HttpFetcher::new(&config_for(format!("http://{addr}/define.js"))).unwrap();

    let body = fetcher.fetch().await.unwrap();
    assert_eq!(body.as_ref(), DEFINE_JS.as_bytes());
    assert_eq!(fetcher.describe(), format!("http://{addr}/define.js"));
}

#[tokio::test]
async fn test_fetch_non_200_carries_status() {
    let addr = spawn_server().await;
    let fetcher = HttpFetcher::new(&config_for(format!("http://{addr}/missing.js"))).unwrap();

    let err = fetcher.fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 404, .. }));
    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn test_fetch_connection_refused() {
    // Bind then drop to obtain a port with nothing listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let fetcher = HttpFetcher::new(&config_for(format!("http://{addr}/define.js"))).unwrap();
    let err = fetcher.fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::Transport { .. }));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_fetch_truncated_body() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 1024];
        let _ = socket.read(&mut request).await;
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\n\r\nvar json_file = {")
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });

    let fetcher = HttpFetcher::new(&config_for(format!("http://{addr}/define.js"))).unwrap();
    let err = fetcher.fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::Body { .. }));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_store_from_config_live() {
    let addr = spawn_server().await;
    let store = CatalogStore::from_config(&config_for(format!("http://{addr}/define.js"))).unwrap();

    let catalog = store.get().await.unwrap();
    assert_eq!(store.origin().await, Some(CatalogOrigin::Live));
    let goes = catalog.default_satellite().unwrap();
    assert_eq!(goes.id(), "goes-19");
    assert!(goes.sector("full_disk").is_some());
}

#[tokio::test]
async fn test_store_from_config_falls_back_on_503() {
    let addr = spawn_server().await;
    let store =
        CatalogStore::from_config(&config_for(format!("http://{addr}/maintenance.js"))).unwrap();

    let catalog = store.get().await.unwrap();
    assert_eq!(store.origin().await, Some(CatalogOrigin::FailSafe));
    assert!(catalog.satellite("goes-16").is_some());
}

#[tokio::test]
async fn test_store_from_config_offline() {
    let mut config = config_for("http://127.0.0.1:9/define.js".to_string());
    config.disable_downloads = true;

    let store = CatalogStore::from_config(&config).unwrap();
    store.get().await.unwrap();
    assert_eq!(store.origin().await, Some(CatalogOrigin::FailSafe));
}

#[tokio::test]
async fn test_store_from_config_bad_crop_table() {
    let mut config = config_for("http://127.0.0.1:9/define.js".to_string());
    config.crop_table = Some("/nonexistent/crops.yaml".into());

    let err = CatalogStore::from_config(&config).err().unwrap();
    assert!(matches!(err, CatalogError::CropTable { .. }));
}

#[tokio::test]
async fn test_store_from_config_with_crop_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crops.yaml");
    std::fs::write(&path, "goes_16:\n  conus: { x: 0.05, y: 0.1 }\n").unwrap();

    let mut config = config_for("http://127.0.0.1:9/define.js".to_string());
    config.disable_downloads = true;
    config.crop_table = Some(path);

    let store = CatalogStore::from_config(&config).unwrap();
    let catalog = store.get().await.unwrap();
    let conus = catalog.satellite("goes-16").unwrap().sector("conus").unwrap();
    assert_eq!(conus.crop_ratios.map(|c| c.x), Some(0.05));
}
