//! Catalog client tests against a local canned-response HTTP server

use std::sync::{Arc, Mutex};
use std::time::Duration;

use hotel_catalog::{CatalogClient, CatalogError, CatalogSource, ScanConfig};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

type RequestLog = Arc<Mutex<Vec<String>>>;

/// Serve `responses` in order, one connection each; returns the base URL and the request lines
async fn serve(responses: Vec<(u16, String)>) -> (String, RequestLog) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log: RequestLog = Arc::new(Mutex::new(Vec::new()));
    let requests = Arc::clone(&log);

    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            let request = String::from_utf8_lossy(&buf);
            let line = request.lines().next().unwrap_or_default().to_string();
            requests.lock().unwrap().push(line);

            let response = format!(
                "HTTP/1.1 {} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        }
    });

    (format!("http://{}/api/v3", addr), log)
}

fn client(base_url: &str) -> CatalogClient {
    let config = ScanConfig {
        base_url: base_url.to_string(),
        api_key: Some("k3y".to_string()),
        rps: 100.0,
        max_retries: 3,
        request_timeout_secs: 5,
        ..Default::default()
    };
    CatalogClient::new(config)
        .unwrap()
        .with_backoff_unit(Duration::from_millis(10))
}

fn ok(data: serde_json::Value) -> (u16, String) {
    (200, json!({ "data": data }).to_string())
}

#[tokio::test]
async fn test_hotels_page_sends_query() {
    let (base, log) = serve(vec![ok(json!([{"id": 1, "name": "Opera"}]))]).await;
    let client = client(&base);

    let hotels = client.hotels_page(10, Some(2), 1, 100).await.unwrap();
    assert_eq!(hotels.len(), 1);
    assert_eq!(hotels[0].name, "Opera");

    let line = log.lock().unwrap()[0].clone();
    assert!(line.starts_with("GET /api/v3/hotels?"), "{}", line);
    for param in ["city_id=10", "page=1", "per_page=100", "country_id=2", "apikey=k3y", "lang=en"] {
        assert!(line.contains(param), "missing {} in {}", param, line);
    }
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let (base, log) = serve(vec![
        (500, "oops".to_string()),
        (503, String::new()),
        ok(json!({"website": "bristol.ua", "phones": ["+380441112233"]})),
    ])
    .await;
    let client = client(&base);

    let info = client.hotel_info(7).await.unwrap();
    assert_eq!(info.site.as_deref(), Some("bristol.ua"));
    assert_eq!(info.phone.as_deref(), Some("+380441112233"));
    assert_eq!(log.lock().unwrap().len(), 3);
    assert_eq!(client.stats().request_count, 3);
}

#[tokio::test]
async fn test_rate_limited_gives_up_after_max_retries() {
    let (base, log) = serve(vec![
        (429, String::new()),
        (429, String::new()),
        (429, String::new()),
    ])
    .await;
    let client = client(&base);

    let err = client.hotel_info(7).await.unwrap_err();
    assert_eq!(err, CatalogError::RateLimited);
    assert_eq!(log.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_client_error_fails_immediately() {
    let body = "x".repeat(400);
    let (base, log) = serve(vec![(403, body)]).await;
    let client = client(&base);

    match client.cities(1).await {
        Err(CatalogError::Http { status, body }) => {
            assert_eq!(status, 403);
            assert_eq!(body.len(), 300);
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_countries_follow_pagination() {
    let full_page: Vec<_> = (1..=500).map(|i| json!({"id": i, "name": format!("C{}", i)})).collect();
    let (base, log) = serve(vec![
        ok(json!(full_page)),
        ok(json!([{"id": "501", "name": "Last"}])),
    ])
    .await;
    let client = client(&base);

    let countries = client.countries().await.unwrap();
    assert_eq!(countries.len(), 501);
    assert_eq!(countries[500].id, 501);

    let log = log.lock().unwrap();
    assert!(log[0].contains("page=1"));
    assert!(log[1].contains("page=2"));
}

#[tokio::test]
async fn test_non_json_body_is_decode_error() {
    let (base, _log) = serve(vec![(200, "<html>".to_string())]).await;
    let client = client(&base);

    let err = client.hotels_page(1, None, 1, 10).await.unwrap_err();
    assert!(matches!(err, CatalogError::Decode(_)));
}
