//! Canned-response HTTP backend for integration tests.
//!
//! Stands in for the cygnus management/notification endpoints and the HDFS
//! REST gateway. Each instance answers every request with one configured
//! status and body, and records what it received so tests can assert on
//! the request line, headers, and payload.

// Items in this shared module may not be used by all test binaries that import it.
#![allow(
    dead_code,
    reason = "shared test utilities are not used by all test binaries"
)]

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

/// One request the mock backend served.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A listening mock backend; dropped instances stop serving.
#[derive(Debug)]
pub struct MockBackend {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: tokio::task::JoinHandle<()>,
}

impl MockBackend {
    /// Start a backend answering every request with `status` and `body`.
    ///
    /// # Panics
    /// Panics if no local port can be bound.
    pub async fn spawn(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock backend");
        let addr = listener.local_addr().expect("mock backend has no address");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        let reply = format!(
            "HTTP/1.1 {status} Mock\r\nContent-Type: application/json\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len(),
        );
        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                serve(stream, &reply, &recorded).await;
            }
        });
        Self {
            addr,
            requests,
            handle,
        }
    }

    pub fn host(&self) -> String { self.addr.ip().to_string() }

    pub fn port(&self) -> u16 { self.addr.port() }

    pub fn url(&self) -> String { format!("http://{}", self.addr) }

    /// Snapshot of everything served so far.
    ///
    /// # Panics
    /// Panics if the recording mutex was poisoned.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock poisoned").clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) { self.handle.abort(); }
}

async fn serve(mut stream: TcpStream, reply: &str, recorded: &Mutex<Vec<RecordedRequest>>) {
    let Some(request) = read_request(&mut stream).await else {
        return;
    };
    // Record before replying, so the test sees the request as soon as the
    // client call returns.
    recorded
        .lock()
        .expect("requests lock poisoned")
        .push(request);
    if stream.write_all(reply.as_bytes()).await.is_ok() {
        let _ = stream.shutdown().await;
    }
}

async fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut raw = Vec::new();
    let mut buf = [0u8; 1024];
    let head_end = loop {
        if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
        let n = stream.read(&mut buf).await.ok()?;
        if n == 0 {
            return None;
        }
        raw.extend_from_slice(&buf[..n]);
    };
    let head = String::from_utf8_lossy(&raw[..head_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split(' ');
    let method = request_line.next()?.to_owned();
    let target = request_line.next()?.to_owned();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(": "))
        .map(|(n, v)| (n.to_ascii_lowercase(), v.to_owned()))
        .collect();
    let content_length = headers
        .iter()
        .find(|(n, _)| n == "content-length")
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = raw[head_end + 4..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut buf).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&buf[..n]);
    }
    Some(RecordedRequest {
        method,
        target,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}
