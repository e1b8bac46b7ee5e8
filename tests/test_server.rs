//! End-to-end tests: client -> host -> proxy -> unix socket backend

use std::sync::Arc;

use local_metrics_proxy::http::handler::Handler;
use local_metrics_proxy::registry::Registry;
use local_metrics_proxy::server::listener;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, UnixListener};

async fn start(config: &str) -> std::net::SocketAddr {
    let chain = Registry::with_defaults().load_chain("Proxyfile", config).unwrap();
    let handler: Arc<dyn Handler> = Arc::new(chain);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(listener::serve(listener, handler));
    addr
}

async fn fetch(addr: std::net::SocketAddr) -> String {
    let mut client = TcpStream::connect(addr).await.unwrap();
    client
        .write_all(b"GET /metrics HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = Vec::new();
    client.read_to_end(&mut response).await.unwrap();
    String::from_utf8(response).unwrap()
}

#[tokio::test]
async fn test_end_to_end_relay() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("exporter.sock");
    let backend = UnixListener::bind(&socket).unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = backend.accept().await.unwrap();
        stream.write_all(b"node_load1 0.42\n").await.unwrap();
    });

    let config = format!(
        "local_metrics_proxy {{\n  uds {{\n    path \"{}\"\n  }}\n}}\n",
        socket.display()
    );
    let addr = start(&config).await;

    let response = fetch(addr).await;

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
    assert!(response.contains("Content-Length: 16\r\n"));
    assert!(response.ends_with("\r\n\r\nnode_load1 0.42\n"));
}

#[tokio::test]
async fn test_end_to_end_unreachable_backend() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("gone.sock");

    let config = format!(
        "local_metrics_proxy {{\n  uds {{\n    path \"{}\"\n  }}\n}}\n",
        socket.display()
    );
    let addr = start(&config).await;

    let response = fetch(addr).await;

    assert!(response.starts_with("HTTP/1.1 502 Bad Gateway\r\n"), "{response}");
    assert!(response.ends_with("502 Bad Gateway\n"));
}

#[tokio::test]
async fn test_malformed_request_gets_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let config = format!(
        "local_metrics_proxy {{\n  uds {{\n    path \"{}\"\n  }}\n}}\n",
        dir.path().join("unused.sock").display()
    );
    let addr = start(&config).await;

    let mut client = TcpStream::connect(addr).await.unwrap();
    client.write_all(b"BREW /pot HTTP/1.1\r\n\r\n").await.unwrap();
    let mut response = Vec::new();
    client.read_to_end(&mut response).await.unwrap();

    assert!(String::from_utf8(response)
        .unwrap()
        .starts_with("HTTP/1.1 400 Bad Request\r\n"));
}
