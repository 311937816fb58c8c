#![allow(dead_code)]

use std::io;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::str::from_utf8;
use std::thread;
use std::time::Duration;

use verity::ApiClient;

pub const API_KEY: &str = "test-api-key";

pub fn client_for(base_url: &str) -> ApiClient {
    ApiClient::new(API_KEY, base_url)
}

/// Binds a port that accepts connections and never writes a response.
/// Returns the base URL to point a client at.
pub fn silent_server(hold_for: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        let mut held = vec![];
        for stream in listener.incoming() {
            held.push(stream);
            thread::sleep(hold_for);
        }
    });
    format!("http://127.0.0.1:{}", port)
}

/// Answers each connection with headers promising a 100 byte body, sends
/// only the start of it, then holds the connection open.
pub fn stalled_body_server(hold_for: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        for stream in listener.incoming() {
            let mut stream = match stream {
                Ok(stream) => stream,
                Err(_) => continue,
            };
            let mut request = [0u8; 4096];
            let _ = stream.read(&mut request);
            let _ = stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n{\"a\":");
            let _ = stream.flush();
            thread::sleep(hold_for);
        }
    });
    format!("http://127.0.0.1:{}", port)
}

pub struct DebugWriter(pub String);
impl Write for DebugWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let DebugWriter(inner) = self;
        let buf = from_utf8(buf).unwrap();
        inner.push_str(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
