//! End-to-end tests for files served from the local document root.

use std::fs;

use segment_proxy::http::response::NOT_FOUND;

mod common;

#[tokio::test]
async fn root_serves_index_html() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), "<h1>hi</h1>").unwrap();
    let config = common::test_config(dir.path(), common::closed_port().await);
    let server = common::start_server(config).await;

    let response = common::raw_exchange(server.addr, b"GET / HTTP/1.0\r\n\r\n").await;
    let (head, body) = common::split_response(&response);

    assert_eq!(
        head,
        "HTTP/1.0 200 OK\r\nContent-Type: text/html; charset=UTF-8\r\nContent-Length: 11"
    );
    assert_eq!(body, b"<h1>hi</h1>");

    server.stop().await;
}

#[tokio::test]
async fn reqwest_reads_plain_text_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("notes.txt"), "segment list\n").unwrap();
    let config = common::test_config(dir.path(), common::closed_port().await);
    let server = common::start_server(config).await;

    let response = reqwest::get(format!("http://{}/notes.txt", server.addr))
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "text/plain; charset=UTF-8"
    );
    assert_eq!(response.text().await.unwrap(), "segment list\n");

    server.stop().await;
}

#[tokio::test]
async fn encoded_space_and_percent_resolve_to_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("my file%.jpg"), [0xFFu8, 0xD8, 0xFF, 0x00]).unwrap();
    let config = common::test_config(dir.path(), common::closed_port().await);
    let server = common::start_server(config).await;

    let response =
        common::raw_exchange(server.addr, b"GET /my%20file%25.jpg HTTP/1.0\r\n\r\n").await;
    let (head, body) = common::split_response(&response);

    assert!(head.starts_with("HTTP/1.0 200 OK\r\n"));
    assert!(head.contains("Content-Type: image/jpeg; charset=UTF-8\r\n"));
    assert!(head.ends_with("Content-Length: 4"));
    assert_eq!(body, [0xFF, 0xD8, 0xFF, 0x00]);

    server.stop().await;
}

#[tokio::test]
async fn unknown_extension_is_octet_stream() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("playlist.m3u8"), "#EXTM3U\n").unwrap();
    let config = common::test_config(dir.path(), common::closed_port().await);
    let server = common::start_server(config).await;

    let response =
        common::raw_exchange(server.addr, b"GET /playlist.m3u8 HTTP/1.1\r\nHost: x\r\n\r\n").await;
    let (head, body) = common::split_response(&response);

    assert!(head.contains("Content-Type: application/octet-stream; charset=UTF-8\r\n"));
    assert_eq!(body, b"#EXTM3U\n");

    server.stop().await;
}

#[tokio::test]
async fn missing_file_gets_exact_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::test_config(dir.path(), common::closed_port().await);
    let server = common::start_server(config).await;

    let response = common::raw_exchange(server.addr, b"GET /nope.html HTTP/1.0\r\n\r\n").await;
    assert_eq!(response, NOT_FOUND);

    let via_reqwest = reqwest::get(format!("http://{}/nope.html", server.addr))
        .await
        .unwrap();
    assert_eq!(via_reqwest.status(), reqwest::StatusCode::NOT_FOUND);
    assert_eq!(
        via_reqwest.text().await.unwrap(),
        "Requested file does not exist."
    );

    server.stop().await;
}

#[tokio::test]
async fn malformed_request_is_closed_without_reply() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::test_config(dir.path(), common::closed_port().await);
    let server = common::start_server(config).await;

    let response = common::raw_exchange(server.addr, b"GARBAGE\r\n\r\n").await;
    assert!(response.is_empty());

    let response = common::raw_exchange(server.addr, b"POST /index.html HTTP/1.0\r\n\r\n").await;
    assert!(response.is_empty());

    server.stop().await;
}

#[tokio::test]
async fn each_connection_gets_one_response() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "A").unwrap();
    fs::write(dir.path().join("b.txt"), "B").unwrap();
    let config = common::test_config(dir.path(), common::closed_port().await);
    let server = common::start_server(config).await;

    // A second pipelined request on the same connection is ignored.
    let response = common::raw_exchange(
        server.addr,
        b"GET /a.txt HTTP/1.0\r\n\r\nGET /b.txt HTTP/1.0\r\n\r\n",
    )
    .await;
    let (_, body) = common::split_response(&response);
    assert_eq!(body, b"A");

    server.stop().await;
}

#[tokio::test]
async fn concurrent_clients_are_served_independently() {
    let dir = tempfile::tempdir().unwrap();
    let payload = vec![b'x'; 256 * 1024];
    fs::write(dir.path().join("big.txt"), &payload).unwrap();
    let config = common::test_config(dir.path(), common::closed_port().await);
    let server = common::start_server(config).await;
    let addr = server.addr;

    let mut tasks = Vec::new();
    for _ in 0..20 {
        tasks.push(tokio::spawn(async move {
            common::raw_exchange(addr, b"GET /big.txt HTTP/1.0\r\n\r\n").await
        }));
    }

    for task in tasks {
        let response = task.await.unwrap();
        let (head, body) = common::split_response(&response);
        assert!(head.ends_with("Content-Length: 262144"));
        assert_eq!(body.len(), payload.len());
    }

    server.stop().await;
}
