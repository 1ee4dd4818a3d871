// src/fetch.rs

//! HTTP fetching for release archives and checksum files
//!
//! Thin wrapper around a blocking reqwest client. Fetches are a single
//! attempt: a connection failure or non-2xx response is terminal and maps to
//! `Error::NetworkError`. Nothing here retries.

use crate::checksum::lookup_checksum;
use crate::error::{Error, Result};
use crate::recipe::Recipe;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Default timeout for HTTP requests
const HTTP_TIMEOUT: Duration = Duration::from_secs(300);

/// Buffer size for streaming downloads (8 KB)
const STREAM_BUFFER_SIZE: usize = 8192;

/// Blocking HTTP client for archive downloads
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a client with the default timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(HTTP_TIMEOUT)
    }

    /// Create a client with an explicit timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Fetch a URL into memory
    ///
    /// Single attempt; non-2xx responses become `NetworkError` with the
    /// status code in the message.
    pub fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::NetworkError(format!("Failed to fetch {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::NetworkError(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| Error::NetworkError(format!("Failed to read response from {}: {}", url, e)))?;

        debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }

    /// Fetch a URL to a file, streaming through a `.tmp` sibling
    ///
    /// The file only appears at `dest_path` via an atomic rename after the
    /// whole body has been written; a partial download is never observable.
    pub fn fetch_to_file(
        &self,
        url: &str,
        dest_path: &Path,
        display_name: &str,
        progress_bar: Option<&ProgressBar>,
    ) -> Result<u64> {
        info!("Downloading {} to {}", url, dest_path.display());

        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::IoError(format!("Failed to create directory {}: {e}", parent.display()))
            })?;
        }

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::NetworkError(format!("Failed to fetch {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::NetworkError(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let total_size = response.content_length().unwrap_or(0);

        let temp_path = dest_path.with_extension("tmp");
        let mut file = File::create(&temp_path).map_err(|e| {
            Error::IoError(format!("Failed to create file {}: {e}", temp_path.display()))
        })?;

        let downloaded = match stream_response_to_file(
            response,
            &mut file,
            total_size,
            progress_bar,
            display_name,
        ) {
            Ok(n) => n,
            Err(e) => {
                let _ = fs::remove_file(&temp_path);
                return Err(e);
            }
        };

        fs::rename(&temp_path, dest_path).map_err(|e| {
            Error::IoError(format!(
                "Failed to move {} to {}: {e}",
                temp_path.display(),
                dest_path.display()
            ))
        })?;

        if let Some(pb) = progress_bar {
            pb.finish_with_message(format!("{} [done]", display_name));
        }

        info!("Downloaded {} bytes to {}", downloaded, dest_path.display());
        Ok(downloaded)
    }

    /// Resolve the expected SHA-256 digest for a recipe's archive
    ///
    /// A literal `sha256` is returned as-is; a `sha256_url` is fetched and
    /// the archive filename looked up in the checksum file.
    pub fn resolve_expected_sha256(&self, recipe: &Recipe) -> Result<String> {
        if let Some(digest) = &recipe.source.sha256 {
            return Ok(digest.to_lowercase());
        }

        let checksum_url = recipe.checksum_url().ok_or_else(|| {
            Error::ParseError("Recipe has neither sha256 nor sha256_url".to_string())
        })?;
        let filename = recipe.archive_filename();

        info!("Resolving digest for {} from {}", filename, checksum_url);
        let body = self.fetch_bytes(&checksum_url)?;
        let text = String::from_utf8(body).map_err(|e| {
            Error::ParseError(format!("Checksum file at {} is not UTF-8: {}", checksum_url, e))
        })?;

        lookup_checksum(&text, &filename).ok_or_else(|| {
            Error::ParseError(format!(
                "No checksum entry for {} in {}",
                filename, checksum_url
            ))
        })
    }
}

/// Stream an HTTP response body to a file with optional progress tracking
///
/// Always streams in fixed-size chunks, never buffering the whole body.
fn stream_response_to_file(
    mut response: reqwest::blocking::Response,
    file: &mut File,
    total_size: u64,
    progress_bar: Option<&ProgressBar>,
    display_name: &str,
) -> Result<u64> {
    if let Some(pb) = progress_bar {
        if total_size > 0 {
            pb.set_length(total_size);
            pb.set_message(display_name.to_string());
        } else {
            pb.set_message(format!("{} (unknown size)", display_name));
        }
    }

    let mut downloaded: u64 = 0;
    let mut buffer = [0u8; STREAM_BUFFER_SIZE];

    loop {
        let bytes_read = response
            .read(&mut buffer)
            .map_err(|e| Error::NetworkError(format!("Failed to read response: {e}")))?;

        if bytes_read == 0 {
            break;
        }

        file.write_all(&buffer[..bytes_read])
            .map_err(|e| Error::IoError(format!("Failed to write data: {e}")))?;

        downloaded += bytes_read as u64;

        if let Some(pb) = progress_bar {
            pb.set_position(downloaded);
        }
    }

    Ok(downloaded)
}

/// Create a styled progress bar for an archive download
pub fn create_progress_bar(name: &str) -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}) {msg}")
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );
    pb.set_message(name.to_string());
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::parse_recipe;
    use std::io::{BufRead, BufReader};
    use std::net::TcpListener;
    use std::thread;

    /// Serve one HTTP response on a loopback port, then exit
    fn one_shot_server(status_line: &'static str, body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                // Drain the request head
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut line = String::new();
                while reader.read_line(&mut line).is_ok() {
                    if line == "\r\n" || line.is_empty() {
                        break;
                    }
                    line.clear();
                }

                let head = format!(
                    "{}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status_line,
                    body.len()
                );
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(&body);
            }
        });

        format!("http://{}", addr)
    }

    #[test]
    fn test_fetch_bytes_success() {
        let base = one_shot_server("HTTP/1.1 200 OK", b"archive payload".to_vec());
        let client = HttpClient::with_timeout(Duration::from_secs(5)).unwrap();

        let bytes = client.fetch_bytes(&format!("{}/tool.tar.gz", base)).unwrap();
        assert_eq!(bytes, b"archive payload");
    }

    #[test]
    fn test_fetch_bytes_404_is_network_error() {
        let base = one_shot_server("HTTP/1.1 404 Not Found", b"gone".to_vec());
        let client = HttpClient::with_timeout(Duration::from_secs(5)).unwrap();

        let err = client
            .fetch_bytes(&format!("{}/missing.tar.gz", base))
            .unwrap_err();
        assert!(matches!(err, Error::NetworkError(_)));
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_fetch_bytes_connection_refused() {
        // Bind then drop to get a port nothing listens on
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = HttpClient::with_timeout(Duration::from_secs(5)).unwrap();

        let err = client
            .fetch_bytes(&format!("http://127.0.0.1:{}/x", port))
            .unwrap_err();
        assert!(matches!(err, Error::NetworkError(_)));
    }

    #[test]
    fn test_fetch_to_file_atomic() {
        let base = one_shot_server("HTTP/1.1 200 OK", b"streamed body".to_vec());
        let client = HttpClient::with_timeout(Duration::from_secs(5)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("dl").join("archive.tar.gz");

        let n = client
            .fetch_to_file(&format!("{}/archive.tar.gz", base), &dest, "archive", None)
            .unwrap();

        assert_eq!(n, 13);
        assert_eq!(std::fs::read(&dest).unwrap(), b"streamed body");
        assert!(!dest.with_extension("tmp").exists());
    }

    #[test]
    fn test_fetch_to_file_404_writes_nothing() {
        let base = one_shot_server("HTTP/1.1 404 Not Found", Vec::new());
        let client = HttpClient::with_timeout(Duration::from_secs(5)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("archive.tar.gz");

        let err = client
            .fetch_to_file(&format!("{}/archive.tar.gz", base), &dest, "archive", None)
            .unwrap_err();

        assert!(matches!(err, Error::NetworkError(_)));
        assert!(!dest.exists());
        assert!(!dest.with_extension("tmp").exists());
    }

    #[test]
    fn test_resolve_literal_sha256() {
        let recipe = parse_recipe(&format!(
            r#"
[package]
name = "tool"
version = "1.0"

[source]
url = "https://example.com/tool.tar.gz"
sha256 = "{}"

[[install]]
source = "tool"
dest = "bin"
"#,
            "AB".repeat(32)
        ))
        .unwrap();

        let client = HttpClient::with_timeout(Duration::from_secs(5)).unwrap();
        // Literal digests are lowercased, no network involved
        assert_eq!(
            client.resolve_expected_sha256(&recipe).unwrap(),
            "ab".repeat(32)
        );
    }

    #[test]
    fn test_resolve_sha256_from_checksum_file() {
        let digest = "c".repeat(64);
        let body = format!("{}  tool_1.0_linux_amd64.tar.gz\n", digest).into_bytes();
        let base = one_shot_server("HTTP/1.1 200 OK", body);

        let recipe = parse_recipe(&format!(
            r#"
[package]
name = "tool"
version = "1.0"

[source]
url = "https://example.com/tool_%(version)s_linux_amd64.tar.gz"
sha256_url = "{}/checksums.txt"

[[install]]
source = "tool"
dest = "bin"
"#,
            base
        ))
        .unwrap();

        let client = HttpClient::with_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(client.resolve_expected_sha256(&recipe).unwrap(), digest);
    }

    #[test]
    fn test_resolve_sha256_missing_entry() {
        let body = format!("{}  some_other_file.tar.gz\n", "d".repeat(64)).into_bytes();
        let base = one_shot_server("HTTP/1.1 200 OK", body);

        let recipe = parse_recipe(&format!(
            r#"
[package]
name = "tool"
version = "1.0"

[source]
url = "https://example.com/tool.tar.gz"
sha256_url = "{}/checksums.txt"

[[install]]
source = "tool"
dest = "bin"
"#,
            base
        ))
        .unwrap();

        let client = HttpClient::with_timeout(Duration::from_secs(5)).unwrap();
        let err = client.resolve_expected_sha256(&recipe).unwrap_err();
        assert!(matches!(err, Error::ParseError(_)));
    }
}
