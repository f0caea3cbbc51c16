use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::core::app::App;
use crate::core::message::ChatMessage;
use crate::core::storage::{MemoryStore, SharedStore};

pub fn create_test_app() -> App {
    create_test_app_with_store(Arc::new(MemoryStore::new()))
}

pub fn create_test_app_with_store(storage: SharedStore) -> App {
    let mut app = App::new(storage, "http://127.0.0.1:9".to_string(), reqwest::Client::new());
    app.initialize();
    app
}

pub fn create_test_messages() -> Vec<ChatMessage> {
    vec![
        ChatMessage::user("Pulse Examination (Nabz)"),
        ChatMessage::bot("The pulse is read at the **wrist**."),
        ChatMessage::user("What about fever?"),
        ChatMessage::bot("- rest\n- fluids"),
    ]
}

/// Canned reply for [`spawn_test_server`].
pub struct TestResponse {
    head: String,
    chunks: Vec<Vec<u8>>,
    chunked: bool,
}

impl TestResponse {
    /// 200 response whose body is written as separate HTTP chunks with a
    /// short pause between them.
    pub fn chunked(chunks: &[&[u8]]) -> Self {
        Self {
            head: "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n".to_string(),
            chunks: chunks.iter().map(|chunk| chunk.to_vec()).collect(),
            chunked: true,
        }
    }

    pub fn status(code: u16) -> Self {
        Self {
            head: format!(
                "HTTP/1.1 {code} Error\r\nContent-Type: application/json\r\nContent-Length: 2\r\nConnection: close\r\n\r\n"
            ),
            chunks: vec![b"{}".to_vec()],
            chunked: false,
        }
    }
}

pub struct CapturedRequest {
    pub head: String,
    pub body: String,
}

pub struct TestServer {
    pub base_url: String,
    request_rx: oneshot::Receiver<CapturedRequest>,
}

impl TestServer {
    pub async fn request(self) -> CapturedRequest {
        self.request_rx.await.expect("test server captured a request")
    }
}

/// One-shot HTTP/1.1 server on an ephemeral port.
pub async fn spawn_test_server(response: TestResponse) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test server");
    let addr = listener.local_addr().expect("test server address");
    let (request_tx, request_rx) = oneshot::channel();

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };

        let mut buffer = Vec::new();
        let mut scratch = [0_u8; 4096];
        let header_end = loop {
            if let Some(pos) = find_subslice(&buffer, b"\r\n\r\n") {
                break pos + 4;
            }
            match socket.read(&mut scratch).await {
                Ok(0) | Err(_) => return,
                Ok(n) => buffer.extend_from_slice(&scratch[..n]),
            }
        };

        let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
        let content_length = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        while buffer.len() < header_end + content_length {
            match socket.read(&mut scratch).await {
                Ok(0) | Err(_) => break,
                Ok(n) => buffer.extend_from_slice(&scratch[..n]),
            }
        }
        let body = String::from_utf8_lossy(&buffer[header_end..]).to_string();
        let _ = request_tx.send(CapturedRequest { head, body });

        let _ = socket.write_all(response.head.as_bytes()).await;
        for chunk in &response.chunks {
            if response.chunked {
                let _ = socket
                    .write_all(format!("{:x}\r\n", chunk.len()).as_bytes())
                    .await;
                let _ = socket.write_all(chunk).await;
                let _ = socket.write_all(b"\r\n").await;
            } else {
                let _ = socket.write_all(chunk).await;
            }
            let _ = socket.flush().await;
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        if response.chunked {
            let _ = socket.write_all(b"0\r\n\r\n").await;
        }
        let _ = socket.shutdown().await;
    });

    TestServer {
        base_url: format!("http://{addr}"),
        request_rx,
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
