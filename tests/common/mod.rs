#![allow(dead_code)]
//! Shared test utilities for integration tests.
//!
//! - [`ImageServer`]: loopback HTTP server standing in for the printer's
//!   image host
//! - [`write_csv`]: layer data fixtures
//! - [`UNREACHABLE`]: an image host nothing listens on

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};

/// Image host nothing listens on.
pub const UNREACHABLE: &str = "http://127.0.0.1:1";

/// Bytes every successful request is answered with.
pub const IMAGE_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nlayer-image";

/// Loopback server answering `/missing*` with 404 and everything else with
/// [`IMAGE_BYTES`]. Runs until the test process exits.
pub struct ImageServer {
    base: String,
}

impl ImageServer {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback listener");
        let addr = listener.local_addr().expect("listener address");
        std::thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                std::thread::spawn(move || respond(stream));
            }
        });
        Self {
            base: format!("http://{addr}"),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }
}

fn respond(mut stream: TcpStream) {
    let mut request = Vec::new();
    let mut buf = [0u8; 512];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }

    let request = String::from_utf8_lossy(&request);
    let path = request.split_whitespace().nth(1).unwrap_or("/");
    let (status, body): (&str, &[u8]) = if path.starts_with("/missing") {
        ("HTTP/1.1 404 Not Found", b"missing")
    } else {
        ("HTTP/1.1 200 OK", IMAGE_BYTES)
    };
    let header = format!(
        "{status}\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    let _ = stream.write_all(header.as_bytes());
    let _ = stream.write_all(body);
}

/// One input row: layer number, image url, error column.
pub type Row<'a> = (&'a str, &'a str, &'a str);

/// Write a layer CSV with the three interpreted columns plus one
/// pass-through column.
pub fn write_csv(dir: &Path, rows: &[Row<'_>]) -> PathBuf {
    let path = dir.join("layers.csv");
    let mut contents = String::from("Layer Number,image url,Error,Bed Temp\n");
    for (layer, url, error) in rows {
        contents.push_str(&format!("{layer},{url},{error},60\n"));
    }
    std::fs::write(&path, contents).expect("write csv fixture");
    path
}

/// The three-row job used across tests: a reachable image, no image, and a
/// reachable image whose row carries "Nozzle Jam".
pub fn nozzle_jam_rows(server: &ImageServer) -> Vec<(String, String, String)> {
    vec![
        ("1".into(), server.url("layer_1.png"), "SUCCESS".into()),
        ("2".into(), String::new(), "SUCCESS".into()),
        ("3".into(), server.url("layer_3.png"), "Nozzle Jam".into()),
    ]
}

pub fn as_rows(rows: &[(String, String, String)]) -> Vec<Row<'_>> {
    rows.iter()
        .map(|(layer, url, error)| (layer.as_str(), url.as_str(), error.as_str()))
        .collect()
}
