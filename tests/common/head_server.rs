//! Minimal HTTP/1.1 server for link verification tests.
//!
//! Answers every request with a fixed status and no body, and records the
//! request lines it saw. A second flavour accepts connections and never
//! answers, to exercise timeouts.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// A running test server.
pub struct HeadServer {
    /// Base URL, e.g. "http://127.0.0.1:12345".
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl HeadServer {
    /// Request lines received so far, e.g. "HEAD /u/1/a.png HTTP/1.1".
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread answering with `status`.
/// The server runs until the process exits.
pub fn start(status: u16) -> HeadServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);

    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let seen = Arc::clone(&seen);
            thread::spawn(move || handle(stream, status, &seen));
        }
    });

    HeadServer {
        base_url: format!("http://127.0.0.1:{}", port),
        requests,
    }
}

/// Starts a server that accepts connections but never writes a byte.
pub fn start_silent() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();

    thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming().flatten() {
            held.push(stream);
        }
    });

    format!("http://127.0.0.1:{}", port)
}

/// A URL on a port nobody listens on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

fn handle(mut stream: TcpStream, status: u16, seen: &Mutex<Vec<String>>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));

    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    if let Some(line) = request.lines().next() {
        seen.lock().unwrap().push(line.to_string());
    }

    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        status,
        reason_phrase(status)
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
