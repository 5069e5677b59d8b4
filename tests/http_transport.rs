//! `HttpTransport` against a local socket: timeout classification, the
//! multipart upload shape, and server error messages.

mod common;

use std::net::SocketAddr;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use common::PDF_BYTES;
use pdfscope::api::{ApiError, Upload};
use pdfscope::{ApiClient, ClientError, DocumentType, Settings};

async fn bind() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind local listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    (listener, addr)
}

fn client_for(addr: SocketAddr, timeout_secs: u64) -> ApiClient {
    let mut settings = Settings::with_api_url(&format!("http://{addr}"));
    settings.request_timeout = timeout_secs;
    ApiClient::from_settings(&settings).expect("Failed to build client")
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn content_length(head: &str) -> Option<usize> {
    head.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.trim().eq_ignore_ascii_case("content-length") {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}

/// Read one full HTTP request (headers and body) from `stream`.
async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.expect("Failed to read request");
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let Some(end) = find(&buf, b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..end]).into_owned();
        let body_len = buf.len() - (end + 4);
        let chunked = head
            .to_ascii_lowercase()
            .contains("transfer-encoding: chunked");
        let complete = match content_length(&head) {
            Some(len) => body_len >= len,
            None if chunked => buf.ends_with(b"0\r\n\r\n"),
            None => true,
        };
        if complete {
            break;
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Serve one request with `status` and a JSON `body`; yields the raw request.
fn serve_once(listener: TcpListener, status: &'static str, body: &'static str) -> JoinHandle<String> {
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("Failed to accept");
        let request = read_request(&mut stream).await;
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream
            .write_all(response.as_bytes())
            .await
            .expect("Failed to write response");
        let _ = stream.shutdown().await;
        request
    })
}

// ============================================================================
// Timeouts
// ============================================================================

#[tokio::test]
async fn silent_server_times_out() {
    let (listener, addr) = bind().await;
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("Failed to accept");
        // Hold the connection open without answering.
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(stream);
    });

    let api = client_for(addr, 1);
    let outcome = tokio::time::timeout(Duration::from_secs(10), api.health_check())
        .await
        .expect("request should give up on its own");

    let err = outcome.unwrap_err();
    assert_eq!(
        err,
        ApiError::Timeout {
            after: Duration::from_secs(1)
        }
    );
    let shown: ClientError = err.into();
    assert!(matches!(shown, ClientError::Timeout { .. }));
    server.abort();
}

// ============================================================================
// Upload shape and error bodies
// ============================================================================

#[tokio::test]
async fn analyze_sends_multipart_file_and_surfaces_server_message() {
    let (listener, addr) = bind().await;
    let server = serve_once(
        listener,
        "500 Internal Server Error",
        r#"{"success":false,"message":"PDF 파싱 실패"}"#,
    );

    let api = client_for(addr, 5);
    let err = api
        .analyze_document(
            Upload::new("paper.pdf", PDF_BYTES.to_vec()),
            DocumentType::Report,
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ApiError::Network {
            status: Some(500),
            message: Some("PDF 파싱 실패".to_string())
        }
    );
    let shown: ClientError = err.into();
    assert_eq!(shown.user_message(), "PDF 파싱 실패");

    let request = server.await.expect("server task panicked");
    let request_line = request.lines().next().unwrap_or_default();
    assert!(
        request_line.starts_with("POST /api/v1/analyze?documentType=REPORT "),
        "unexpected request line: {request_line}"
    );
    let lower = request.to_ascii_lowercase();
    assert!(lower.contains("content-type: multipart/form-data; boundary="));
    assert!(request.contains(r#"name="file""#));
    assert!(request.contains(r#"filename="paper.pdf""#));
    assert!(request.contains("application/pdf"));
    assert!(request.contains("%PDF-1.4"));
}

#[tokio::test]
async fn get_result_decodes_success_body() {
    let (listener, addr) = bind().await;
    let server = serve_once(
        listener,
        "200 OK",
        r#"{"id":31,"fileName":"q1.pdf","documentType":"MANUAL","keywords":"alpha, beta"}"#,
    );

    let api = client_for(addr, 5);
    let response = api.get_analysis_result("31").await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.data.analysis_id, "31");
    assert_eq!(response.data.document_type, DocumentType::Manual);
    assert_eq!(response.data.keywords, vec!["alpha", "beta"]);

    let request = server.await.expect("server task panicked");
    assert!(request.starts_with("GET /api/v1/storage/results/31 "));
}
