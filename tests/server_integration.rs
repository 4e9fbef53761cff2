//! End-to-end tests over real sockets
//!
//! Every test stands up a full server on an ephemeral port with a
//! temporary document root and drives it with plain `TcpStream` clients.
//! Responses are read to EOF, which doubles as the check that the server
//! really closes every connection.

use staticd::config::ServerConfig;
use staticd::http::Headers;
use staticd::server::Server;
use std::fs;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::path::Path;
use std::thread;
use tempfile::TempDir;

fn write_error_pages(dir: &Path) {
    for code in [400, 403, 404, 405] {
        fs::write(dir.join(format!("{}.html", code)), format!("<h1>{}</h1>", code)).unwrap();
    }
}

/// Temp tree with a `site/` document root and an `errors/` page directory
fn fixture() -> (TempDir, ServerConfig) {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("site");
    let errors = dir.path().join("errors");
    fs::create_dir(&root).unwrap();
    fs::create_dir(&errors).unwrap();
    write_error_pages(&errors);

    let mut config = ServerConfig::new(&root);
    config.port = 0;
    config.workers = 2;
    config.error_dir = errors;
    (dir, config)
}

fn doc_root(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("site")
}

/// Bind, run in the background, hand back the bound address
fn start(config: ServerConfig) -> SocketAddr {
    let server = Server::bind(config).unwrap();
    let addr = server.local_addr().unwrap();
    thread::spawn(move || server.run().unwrap());
    addr
}

/// One-shot exchange: write the request, read the response to EOF
fn exchange(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.write_all(request).unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).unwrap();
    response
}

/// Split a raw response into status line, headers and body
fn split_response(raw: &[u8]) -> (String, Headers, Vec<u8>) {
    let head_end = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("no head terminator in response");
    let head = std::str::from_utf8(&raw[..head_end]).unwrap();

    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap().to_string();
    let mut headers = Headers::new();
    for line in lines {
        let (name, value) = Headers::parse_header_line(line).unwrap();
        headers.insert(name, value);
    }
    (status_line, headers, raw[head_end + 4..].to_vec())
}

#[test]
fn test_get_serves_exact_file_bytes() {
    let (dir, config) = fixture();
    fs::write(doc_root(&dir).join("hello.txt"), "hello from the server\n").unwrap();
    let addr = start(config);

    let raw = exchange(addr, b"GET /hello.txt HTTP/1.1\r\nHost: localhost\r\n\r\n");
    let (status, headers, body) = split_response(&raw);

    assert_eq!(status, "HTTP/1.1 200 OK");
    assert_eq!(headers.get("Content-Length"), Some("22"));
    assert_eq!(headers.get("Content-Type"), Some("text/plain"));
    assert_eq!(headers.get("Connection"), Some("close"));
    assert!(headers.get("Date").is_some());
    assert!(headers.get("Server").is_some());
    assert_eq!(body, b"hello from the server\n");
}

#[test]
fn test_head_sends_headers_only() {
    let (dir, config) = fixture();
    fs::write(doc_root(&dir).join("hello.txt"), "hello from the server\n").unwrap();
    let addr = start(config);

    let raw = exchange(addr, b"HEAD /hello.txt HTTP/1.1\r\nHost: localhost\r\n\r\n");
    let (status, headers, body) = split_response(&raw);

    assert_eq!(status, "HTTP/1.1 200 OK");
    assert_eq!(headers.get("Content-Length"), Some("22"));
    assert!(body.is_empty(), "HEAD must not carry a body");
}

#[test]
fn test_unsupported_method_gets_405_with_page() {
    let (dir, config) = fixture();
    fs::write(doc_root(&dir).join("hello.txt"), "hi").unwrap();
    let addr = start(config);

    let raw = exchange(addr, b"POST /hello.txt HTTP/1.1\r\nContent-Length: 0\r\n\r\n");
    let (status, _headers, body) = split_response(&raw);

    assert_eq!(status, "HTTP/1.1 405 Method Not Allowed");
    assert_eq!(body, b"<h1>405</h1>");
}

#[test]
fn test_head_of_missing_file_still_carries_the_page() {
    let (_dir, config) = fixture();
    let addr = start(config);

    let raw = exchange(addr, b"HEAD /nope.html HTTP/1.1\r\n\r\n");
    let (status, headers, body) = split_response(&raw);

    // Error responses carry their body whatever the method was.
    assert_eq!(status, "HTTP/1.1 404 Not Found");
    assert_eq!(body, b"<h1>404</h1>");
    assert_eq!(headers.get("Content-Length"), Some("12"));
}

#[test]
fn test_traversal_is_forbidden_even_when_target_exists() {
    let (dir, config) = fixture();
    fs::write(dir.path().join("secret.txt"), "secret").unwrap();
    let addr = start(config);

    let raw = exchange(addr, b"GET /../secret.txt HTTP/1.1\r\n\r\n");
    let (status, _headers, body) = split_response(&raw);

    assert_eq!(status, "HTTP/1.1 403 Forbidden");
    assert_eq!(body, b"<h1>403</h1>");
}

#[test]
fn test_trailing_slash_serves_index() {
    let (dir, config) = fixture();
    let sub = doc_root(&dir).join("docs");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("index.html"), "<html>docs</html>").unwrap();
    fs::write(doc_root(&dir).join("index.html"), "<html>root</html>").unwrap();
    let addr = start(config);

    let (status, _, body) = split_response(&exchange(addr, b"GET /docs/ HTTP/1.1\r\n\r\n"));
    assert_eq!(status, "HTTP/1.1 200 OK");
    assert_eq!(body, b"<html>docs</html>");

    let (status, _, body) = split_response(&exchange(addr, b"GET / HTTP/1.1\r\n\r\n"));
    assert_eq!(status, "HTTP/1.1 200 OK");
    assert_eq!(body, b"<html>root</html>");
}

#[test]
fn test_directory_is_not_served_as_a_file() {
    let (dir, config) = fixture();
    let sub = doc_root(&dir).join("docs");
    fs::create_dir(&sub).unwrap();
    let addr = start(config);

    // No trailing slash: looked up as a file, which a directory is not.
    let (status, _, _) = split_response(&exchange(addr, b"GET /docs HTTP/1.1\r\n\r\n"));
    assert_eq!(status, "HTTP/1.1 404 Not Found");

    // Trailing slash but no index.html inside.
    let (status, _, _) = split_response(&exchange(addr, b"GET /docs/ HTTP/1.1\r\n\r\n"));
    assert_eq!(status, "HTTP/1.1 404 Not Found");
}

#[test]
fn test_binary_file_round_trips() {
    let (dir, config) = fixture();
    let blob: Vec<u8> = (0u8..=255).cycle().take(10_000).collect();
    fs::write(doc_root(&dir).join("blob.bin"), &blob).unwrap();
    let addr = start(config);

    let raw = exchange(addr, b"GET /blob.bin HTTP/1.1\r\n\r\n");
    let (status, headers, body) = split_response(&raw);

    assert_eq!(status, "HTTP/1.1 200 OK");
    assert_eq!(headers.get("Content-Length"), Some("10000"));
    assert_eq!(headers.get("Content-Type"), Some("application/octet-stream"));
    assert_eq!(body, blob);
}

#[test]
fn test_percent_encoding_and_query_strings() {
    let (dir, config) = fixture();
    fs::write(doc_root(&dir).join("hello world.txt"), "spaced").unwrap();
    let addr = start(config);

    let raw = exchange(addr, b"GET /hello%20world.txt?version=1 HTTP/1.1\r\n\r\n");
    let (status, _, body) = split_response(&raw);

    assert_eq!(status, "HTTP/1.1 200 OK");
    assert_eq!(body, b"spaced");
}

#[test]
fn test_malformed_request_line_gets_400() {
    let (_dir, config) = fixture();
    let addr = start(config);

    let raw = exchange(addr, b"NONSENSE\r\n\r\n");
    let (status, _, body) = split_response(&raw);

    assert_eq!(status, "HTTP/1.1 400 Bad Request");
    assert_eq!(body, b"<h1>400</h1>");
}

#[test]
fn test_protocol_token_is_optional() {
    let (dir, config) = fixture();
    fs::write(doc_root(&dir).join("hello.txt"), "hi").unwrap();
    let addr = start(config);

    let (status, _, body) = split_response(&exchange(addr, b"GET /hello.txt\r\n\r\n"));
    assert_eq!(status, "HTTP/1.1 200 OK");
    assert_eq!(body, b"hi");
}

#[test]
fn test_partial_request_is_answered_after_half_close() {
    let (dir, config) = fixture();
    fs::write(doc_root(&dir).join("hello.txt"), "hi").unwrap();
    let addr = start(config);

    // No head terminator at all; the server parses what arrived once the
    // client half-closes.
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.write_all(b"GET /hello.txt HTTP/1.1").unwrap();
    stream.shutdown(std::net::Shutdown::Write).unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).unwrap();
    let (status, _, body) = split_response(&raw);

    assert_eq!(status, "HTTP/1.1 200 OK");
    assert_eq!(body, b"hi");
}

#[test]
fn test_oversized_request_is_abandoned_without_response() {
    let (_dir, mut config) = fixture();
    config.max_request_len = 1024;
    let addr = start(config);

    let mut stream = TcpStream::connect(addr).unwrap();
    // Well past the cap, never sending a head terminator. The tail write
    // may fail once the server has already hung up; that is the point.
    let _ = stream.write_all(&vec![b'x'; 64 * 1024]);

    let mut response = Vec::new();
    let _ = stream.read_to_end(&mut response);
    assert!(
        response.is_empty(),
        "server must not answer an oversized request"
    );
}

#[test]
fn test_concurrent_connections_are_served_independently() {
    let (dir, mut config) = fixture();
    config.workers = 4;
    for i in 0..8 {
        fs::write(
            doc_root(&dir).join(format!("file{}.txt", i)),
            format!("content of file {}", i),
        )
        .unwrap();
    }
    let addr = start(config);

    let mut clients = Vec::new();
    for i in 0..8 {
        clients.push(thread::spawn(move || {
            let request = format!("GET /file{}.txt HTTP/1.1\r\n\r\n", i);
            let raw = exchange(addr, request.as_bytes());
            let (status, _, body) = split_response(&raw);

            assert_eq!(status, "HTTP/1.1 200 OK");
            assert_eq!(body, format!("content of file {}", i).as_bytes());
        }));
    }
    for client in clients {
        client.join().unwrap();
    }
}

#[test]
fn test_unknown_extension_falls_back_to_octet_stream() {
    let (dir, config) = fixture();
    fs::write(doc_root(&dir).join("data.xyzzy"), "???").unwrap();
    let addr = start(config);

    let raw = exchange(addr, b"GET /data.xyzzy HTTP/1.1\r\n\r\n");
    let (_, headers, _) = split_response(&raw);

    assert_eq!(
        headers.get("Content-Type"),
        Some("application/octet-stream")
    );
}
