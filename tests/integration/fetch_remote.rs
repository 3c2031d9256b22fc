//! Remote manifest fetch tests against a local one-shot HTTP server

use hashsweep::error::{ApiError, NetworkError};
use hashsweep::fetch::ManifestFetcher;
use hashsweep::tree::hasher;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

/// Serve a single HTTP response on an ephemeral port and return its URL
fn serve_once(status_line: &'static str, body: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
        }
    });
    format!("http://{}/hashes.json", addr)
}

#[tokio::test]
async fn test_fetch_writes_and_loads_manifest() {
    let body = format!("{{\n    \"a.txt\": \"{}\"\n}}", hasher::hash_bytes(b"hello"));
    let url = serve_once("200 OK", body.clone());

    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("cache/hashes.json");
    let fetcher = ManifestFetcher::new(Duration::from_secs(5)).unwrap();
    let manifest = fetcher.fetch_to_file(&url, &dest).await.unwrap();

    assert_eq!(manifest.len(), 1);
    assert_eq!(manifest.get("a.txt"), Some(&hasher::hash_bytes(b"hello")));
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), body);
}

#[tokio::test]
async fn test_non_success_status_is_network_error() {
    let url = serve_once("404 Not Found", "missing".to_string());

    let fetcher = ManifestFetcher::new(Duration::from_secs(5)).unwrap();
    let err = fetcher.fetch_text(&url).await.unwrap_err();
    match err {
        NetworkError::Status { status, .. } => assert_eq!(status, 404),
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_body_is_format_error() {
    let url = serve_once("200 OK", "<html>not a manifest</html>".to_string());

    let dir = TempDir::new().unwrap();
    let fetcher = ManifestFetcher::new(Duration::from_secs(5)).unwrap();
    let err = fetcher
        .fetch_to_file(&url, &dir.path().join("hashes.json"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::FormatError(_)));
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let fetcher = ManifestFetcher::new(Duration::from_secs(5)).unwrap();
    let err = fetcher
        .fetch_text(&format!("http://{}/hashes.json", addr))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        NetworkError::Connect { .. } | NetworkError::Request { .. }
    ));
}
