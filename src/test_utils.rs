//! Shared test utilities for bookbot
//!
//! This module provides common test fixtures and helper functions
//! used across multiple test modules.

#[cfg(test)]
pub mod test_helpers {
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread::JoinHandle;
    use std::time::Duration;

    /// Run a future to completion on a fresh current-thread runtime
    pub fn run_async<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(future)
    }

    /// One canned HTTP response, written in parts
    #[derive(Debug, Clone)]
    pub struct CannedResponse {
        pub status: u16,
        pub content_type: &'static str,
        pub parts: Vec<String>,
        pub part_delay: Duration,
    }

    impl CannedResponse {
        pub fn json(status: u16, body: &str) -> Self {
            Self {
                status,
                content_type: "application/json",
                parts: vec![body.to_string()],
                part_delay: Duration::ZERO,
            }
        }

        /// Event-stream body written one part at a time with a pause between
        pub fn event_stream(parts: &[&str]) -> Self {
            Self {
                status: 200,
                content_type: "text/event-stream",
                parts: parts.iter().map(|p| p.to_string()).collect(),
                part_delay: Duration::from_millis(20),
            }
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.part_delay = delay;
            self
        }
    }

    /// Loopback HTTP server answering one connection per canned response
    pub struct CannedServer {
        pub base_url: String,
        handle: JoinHandle<Vec<String>>,
    }

    impl CannedServer {
        pub fn start(responses: Vec<CannedResponse>) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let base_url = format!("http://{}/api", listener.local_addr().unwrap());

            let handle = std::thread::spawn(move || {
                let mut captured = Vec::new();
                for response in responses {
                    let Ok((mut stream, _)) = listener.accept() else {
                        break;
                    };
                    captured.push(read_request(&mut stream));
                    write_response(&mut stream, &response);
                }
                captured
            });

            Self { base_url, handle }
        }

        /// Wait for every canned response to be served; returns the raw requests
        pub fn finish(self) -> Vec<String> {
            self.handle.join().unwrap()
        }
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];

        loop {
            let n = stream.read(&mut buf).unwrap_or(0);
            if n == 0 {
                break;
            }
            data.extend_from_slice(&buf[..n]);

            if let Some(header_end) = memchr::memmem::find(&data, b"\r\n\r\n") {
                let content_length = String::from_utf8_lossy(&data[..header_end])
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if data.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }

        String::from_utf8_lossy(&data).into_owned()
    }

    fn write_response(stream: &mut TcpStream, response: &CannedResponse) {
        let head = format!(
            "HTTP/1.1 {} Canned\r\nContent-Type: {}\r\nConnection: close\r\n\r\n",
            response.status, response.content_type
        );
        if stream.write_all(head.as_bytes()).is_err() {
            return;
        }
        let _ = stream.flush();

        for part in &response.parts {
            if !response.part_delay.is_zero() {
                std::thread::sleep(response.part_delay);
            }
            if stream.write_all(part.as_bytes()).is_err() {
                return;
            }
            let _ = stream.flush();
        }
    }

    /// Body of a captured raw request
    pub fn request_body(raw: &str) -> serde_json::Value {
        let body = raw.split_once("\r\n\r\n").map(|(_, b)| b).unwrap_or("");
        serde_json::from_str(body).unwrap_or(serde_json::Value::Null)
    }

    /// Request line of a captured raw request (e.g. `POST /api/rag/chat HTTP/1.1`)
    pub fn request_line(raw: &str) -> &str {
        raw.lines().next().unwrap_or("")
    }
}
