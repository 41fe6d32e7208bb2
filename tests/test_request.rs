use noderelay::http::request::{Method, Request, RequestBuilder};
use std::collections::HashMap;

fn basic_request(headers: HashMap<String, String>) -> Request {
    Request {
        method: Method::GET,
        path: "/".to_string(),
        version: "HTTP/1.1".to_string(),
        scheme: String::new(),
        headers,
        body: vec![],
    }
}

#[test]
fn test_request_header_retrieval() {
    let mut headers = HashMap::new();
    headers.insert("Host".to_string(), "example.com".to_string());
    headers.insert("Content-Type".to_string(), "application/json".to_string());

    let req = basic_request(headers);

    assert_eq!(req.header("Host"), Some("example.com"));
    assert_eq!(req.header("Content-Type"), Some("application/json"));
    assert_eq!(req.header("Missing"), None);
}

#[test]
fn test_request_header_retrieval_case_insensitive() {
    let mut headers = HashMap::new();
    headers.insert("host".to_string(), "example.com".to_string());

    let req = basic_request(headers);

    assert_eq!(req.header("Host"), Some("example.com"));
    assert_eq!(req.header("HOST"), Some("example.com"));
}

#[test]
fn test_request_set_header_replaces_existing_case_insensitively() {
    let mut headers = HashMap::new();
    headers.insert("host".to_string(), "old.example.com".to_string());

    let mut req = basic_request(headers);
    req.set_header("Host", "10.0.0.5:8080");

    // No duplicate under a different casing
    assert_eq!(req.headers.len(), 1);
    assert_eq!(req.header("Host"), Some("10.0.0.5:8080"));
}

#[test]
fn test_request_set_header_inserts_when_missing() {
    let mut req = basic_request(HashMap::new());
    req.set_header("Host", "10.0.0.5:80");

    assert_eq!(req.header("Host"), Some("10.0.0.5:80"));
}

#[test]
fn test_request_content_length_parsing() {
    let mut headers = HashMap::new();
    headers.insert("Content-Length".to_string(), "42".to_string());

    let req = basic_request(headers);

    assert_eq!(req.content_length(), 42);
}

#[test]
fn test_request_content_length_invalid() {
    let mut headers = HashMap::new();
    headers.insert("Content-Length".to_string(), "not-a-number".to_string());

    let req = basic_request(headers);

    assert_eq!(req.content_length(), 0);
}

#[test]
fn test_request_keep_alive_http11_default() {
    // HTTP/1.1 defaults to keep-alive
    let req = basic_request(HashMap::new());

    assert!(req.keep_alive());
}

#[test]
fn test_request_keep_alive_close() {
    let mut headers = HashMap::new();
    headers.insert("Connection".to_string(), "close".to_string());

    let req = basic_request(headers);

    assert!(!req.keep_alive());
}

#[test]
fn test_request_method_from_string() {
    assert_eq!(Method::from_str("GET"), Some(Method::GET));
    assert_eq!(Method::from_str("POST"), Some(Method::POST));
    assert_eq!(Method::from_str("INVALID"), None);
    assert_eq!(Method::from_str("get"), None); // Case-sensitive
}

#[test]
fn test_request_to_bytes_request_line_and_headers() {
    let req = RequestBuilder::new()
        .method(Method::GET)
        .path("/nodes/10-0-0-5/ports/8080/app")
        .version("HTTP/1.1")
        .header("Host", "10.0.0.5:8080")
        .header("Upgrade", "websocket")
        .build()
        .unwrap();

    let bytes = req.to_bytes();
    let text = String::from_utf8_lossy(&bytes);

    assert!(text.starts_with("GET /nodes/10-0-0-5/ports/8080/app HTTP/1.1\r\n"));
    assert!(text.contains("Host: 10.0.0.5:8080\r\n"));
    // The relay is transparent: upgrade headers must survive serialization
    assert!(text.contains("Upgrade: websocket\r\n"));
    assert!(text.ends_with("\r\n\r\n"));
}

#[test]
fn test_request_to_bytes_includes_body() {
    let req = RequestBuilder::new()
        .method(Method::POST)
        .path("/api")
        .header("Content-Length", "5")
        .body(b"hello".to_vec())
        .build()
        .unwrap();

    let bytes = req.to_bytes();
    let text = String::from_utf8_lossy(&bytes);

    assert!(text.contains("\r\n\r\nhello"));
}

#[test]
fn test_request_to_bytes_empty_path_defaults_to_root() {
    let req = RequestBuilder::new()
        .method(Method::GET)
        .path("")
        .build()
        .unwrap();

    let bytes = req.to_bytes();
    let text = String::from_utf8_lossy(&bytes);

    assert!(text.starts_with("GET / HTTP/1.1\r\n"));
}
