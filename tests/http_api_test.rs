//! Integration tests for the HTTP listing API against a local server

use subastas_cli::api::{HttpListingApi, ListingApi};
use subastas_cli::errors::AppError;
use subastas_cli::models::{ExportRequest, ListingId, SearchFilters, SearchRequest};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Request as received by the test server.
struct Received {
    head: String,
    body: String,
}

impl Received {
    fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    fn header(&self, name: &str) -> Option<String> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }
}

/// Serves one canned response on 127.0.0.1 and hands back what was requested.
async fn serve_once(
    status: &'static str,
    content_type: &'static str,
    body: Vec<u8>,
) -> (String, JoinHandle<Received>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        let head_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before headers were complete");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos;
            }
        };
        let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
        let mut received = Received {
            head,
            body: String::new(),
        };

        let content_length: usize = received
            .header("content-length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let body_start = head_end + 4;
        while buf.len() < body_start + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before body was complete");
            buf.extend_from_slice(&chunk[..n]);
        }
        received.body =
            String::from_utf8_lossy(&buf[body_start..body_start + content_length]).to_string();

        let head = format!(
            "HTTP/1.1 {status}\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
            body.len()
        );
        // The client may hang up early on error statuses
        let _ = socket.write_all(head.as_bytes()).await;
        let _ = socket.write_all(&body).await;
        let _ = socket.shutdown().await;
        received
    });

    (base_url, handle)
}

fn api(base_url: &str) -> HttpListingApi {
    HttpListingApi::new(reqwest::Client::new(), base_url).unwrap()
}

/// Address of a port nothing listens on.
async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    url
}

#[tokio::test]
async fn test_search_sends_only_filled_params() {
    let body = br#"{"success": true, "total": 1, "data": [{"id": 7, "titulo": "Garaje"}]}"#;
    let (base_url, server) = serve_once("200 OK", "application/json", body.to_vec()).await;
    let request = SearchRequest {
        seq: 1,
        term: "piso".to_string(),
        filters: SearchFilters {
            tipo: Some(String::new()),
            provincia: Some("Madrid".to_string()),
            valor_min: Some(100000.0),
            valor_max: None,
        },
    };

    let listings = api(&base_url).search(&request).await.unwrap();
    let received = server.await.unwrap();

    assert_eq!(
        received.request_line(),
        "GET /api/subastas?search=piso&provincia=Madrid&valorMin=100000 HTTP/1.1"
    );
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].id, ListingId::new("7"));
}

#[tokio::test]
async fn test_search_error_status_is_judged_by_body() {
    let body = br#"{"success": false, "error": "database unavailable"}"#;
    let (base_url, server) =
        serve_once("500 Internal Server Error", "application/json", body.to_vec()).await;
    let request = SearchRequest {
        seq: 1,
        term: String::new(),
        filters: SearchFilters::default(),
    };

    let result = api(&base_url).search(&request).await;
    let received = server.await.unwrap();

    assert_eq!(received.request_line(), "GET /api/subastas HTTP/1.1");
    assert!(matches!(
        result,
        Err(AppError::SearchApplication(ref m)) if m == "database unavailable"
    ));
}

#[tokio::test]
async fn test_search_html_error_page_is_transport_error() {
    let (base_url, server) =
        serve_once("502 Bad Gateway", "text/html", b"<html>Bad Gateway</html>".to_vec()).await;
    let request = SearchRequest {
        seq: 1,
        term: String::new(),
        filters: SearchFilters::default(),
    };

    let result = api(&base_url).search(&request).await;
    server.await.unwrap();

    assert!(matches!(result, Err(AppError::SearchTransport(ref m)) if m.contains("HTTP 502")));
}

#[tokio::test]
async fn test_export_posts_empty_ids_and_returns_bytes() {
    let xlsx = b"PK\x03\x04spreadsheet".to_vec();
    let (base_url, server) = serve_once(
        "200 OK",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        xlsx.clone(),
    )
    .await;

    let bytes = api(&base_url)
        .export(&ExportRequest { ids: Vec::new() })
        .await
        .unwrap();
    let received = server.await.unwrap();

    assert_eq!(received.request_line(), "POST /api/exportar HTTP/1.1");
    assert_eq!(
        received.header("content-type").as_deref(),
        Some("application/json")
    );
    assert_eq!(received.body, r#"{"ids":[]}"#);
    assert_eq!(bytes, xlsx);
}

#[tokio::test]
async fn test_export_sends_selected_ids_as_strings() {
    let (base_url, server) = serve_once("200 OK", "application/octet-stream", b"x".to_vec()).await;
    let request = ExportRequest {
        ids: vec![ListingId::new("1"), ListingId::new("SUB-JA-2025-77")],
    };

    api(&base_url).export(&request).await.unwrap();
    let received = server.await.unwrap();

    assert_eq!(received.body, r#"{"ids":["1","SUB-JA-2025-77"]}"#);
}

#[tokio::test]
async fn test_export_server_error_is_export_error() {
    let (base_url, server) = serve_once(
        "500 Internal Server Error",
        "application/json",
        br#"{"success": false}"#.to_vec(),
    )
    .await;

    let result = api(&base_url).export(&ExportRequest { ids: Vec::new() }).await;
    server.await.unwrap();

    assert!(matches!(result, Err(AppError::ExportTransport(ref m)) if m.contains("HTTP 500")));
}

#[tokio::test]
async fn test_unreachable_server_maps_error_per_endpoint() {
    let api = api(&closed_port_url().await);
    let request = SearchRequest {
        seq: 1,
        term: String::new(),
        filters: SearchFilters::default(),
    };

    let search = api.search(&request).await;
    let export = api.export(&ExportRequest { ids: Vec::new() }).await;

    assert!(matches!(search, Err(AppError::SearchTransport(_))));
    assert!(matches!(export, Err(AppError::ExportTransport(_))));
}
