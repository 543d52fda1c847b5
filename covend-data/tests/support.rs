//! A one-shot HTTP server answering with a canned response.

use std::thread::JoinHandle;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Server that accepts a single request and replies with a fixed body.
pub struct CannedServer {
    base_url: String,
    handle: JoinHandle<String>,
}

impl CannedServer {
    /// Start serving `body` with HTTP status `status` on a free local port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub fn start(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("test runtime");
        let listener = runtime
            .block_on(TcpListener::bind("127.0.0.1:0"))
            .expect("bind local listener");
        let address = listener.local_addr().expect("listener address");
        let handle = std::thread::spawn(move || {
            runtime.block_on(async move {
                let (mut socket, _) = listener.accept().await.expect("accept request");
                let request = read_request(&mut socket).await;
                let response = format!(
                    "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket
                    .write_all(response.as_bytes())
                    .await
                    .expect("write response");
                socket.shutdown().await.expect("close socket");
                request
            })
        });
        Self {
            base_url: format!("http://{address}/api"),
            handle,
        }
    }

    /// Base URL to configure the client with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Wait for the exchange to finish and return the raw request.
    ///
    /// # Panics
    ///
    /// Panics if the server thread panicked.
    pub fn finish(self) -> String {
        self.handle.join().expect("server thread")
    }
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 4096];
    loop {
        let read = socket.read(&mut chunk).await.expect("read request");
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(chunk.get(..read).unwrap_or_default());
        if request_complete(&buffer) {
            break;
        }
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

fn request_complete(buffer: &[u8]) -> bool {
    let text = String::from_utf8_lossy(buffer);
    let Some((head, body)) = text.split_once("\r\n\r\n") else {
        return false;
    };
    let length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    body.len() >= length
}

/// Overpass answer for two crossing streets near Plaza de Armas, Lima.
///
/// Jirón Carabaya runs north to south through nodes 1, 2 and 3 as a one-way
/// street. Jirón Huallaga runs east to west through nodes 4, 2 and 5 in both
/// directions. A footbridge under construction links 3 and 5.
pub const LIMA_CROSSING: &str = r#"{
  "version": 0.6,
  "generator": "Overpass API",
  "elements": [
    {"type": "node", "id": 1, "lat": -12.0423, "lon": -77.0298},
    {"type": "node", "id": 2, "lat": -12.0432, "lon": -77.0298},
    {"type": "node", "id": 3, "lat": -12.0441, "lon": -77.0298},
    {"type": "node", "id": 4, "lat": -12.0432, "lon": -77.0289},
    {"type": "node", "id": 5, "lat": -12.0432, "lon": -77.0307},
    {"type": "way", "id": 100, "nodes": [1, 2, 3],
     "tags": {"highway": "secondary", "name": "Jirón Carabaya", "oneway": "yes"}},
    {"type": "way", "id": 101, "nodes": [4, 2, 5],
     "tags": {"highway": "residential", "name": "Jirón Huallaga"}},
    {"type": "way", "id": 102, "nodes": [3, 5],
     "tags": {"highway": "construction"}}
  ]
}"#;
