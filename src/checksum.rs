// src/checksum.rs

//! SHA-256 hashing and verification for downloaded archives
//!
//! Archives are verified against the digest declared in the recipe before
//! anything touches the filesystem. Comparison is case-insensitive on the
//! hex string; digests we produce are always lowercase.

use sha2::{Digest, Sha256};
use std::fmt;
use std::io::{self, Read};
use std::path::Path;

/// Length of a SHA-256 digest as a hex string
pub const SHA256_HEX_LEN: usize = 64;

/// Checksum verification failure, carrying both sides of the comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumMismatch {
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for ChecksumMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sha256 mismatch: expected {}, got {}",
            self.expected, self.actual
        )
    }
}

impl std::error::Error for ChecksumMismatch {}

/// Check that a string looks like a SHA-256 digest (64 hex chars)
pub fn is_valid_sha256_hex(s: &str) -> bool {
    s.len() == SHA256_HEX_LEN && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Compute the SHA-256 digest of a byte slice as lowercase hex
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Compute the SHA-256 digest of a reader, streaming in 8 KiB chunks
pub fn sha256_reader<R: Read>(reader: &mut R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Verify a byte slice against an expected SHA-256 digest
///
/// The comparison is case-insensitive. On success the caller keeps using the
/// same bytes; nothing is copied or modified.
pub fn verify_bytes(data: &[u8], expected: &str) -> Result<(), ChecksumMismatch> {
    let actual = sha256_bytes(data);
    if actual == expected.to_lowercase() {
        Ok(())
    } else {
        Err(ChecksumMismatch {
            expected: expected.to_string(),
            actual,
        })
    }
}

/// Verify a file against an expected SHA-256 digest without loading it whole
pub fn verify_file(path: &Path, expected: &str) -> io::Result<Result<(), ChecksumMismatch>> {
    let mut file = std::fs::File::open(path)?;
    let actual = sha256_reader(&mut file)?;

    if actual == expected.to_lowercase() {
        Ok(Ok(()))
    } else {
        Ok(Err(ChecksumMismatch {
            expected: expected.to_string(),
            actual,
        }))
    }
}

/// Parse one line of a coreutils-style checksum file
///
/// Returns the digest and, when present, the filename column. sha256sum
/// prefixes the name with `*` in binary mode; the prefix is stripped.
pub fn parse_checksum_line(line: &str) -> Option<(&str, Option<&str>)> {
    let mut fields = line.split_whitespace();
    let digest = fields.next()?;
    let name = fields.next().map(|n| n.trim_start_matches('*'));
    Some((digest, name))
}

/// Find the digest for `filename` in a coreutils-style checksum file
///
/// Each line is `<hex>  <filename>`; a single-line file with no filename
/// column (the `.sha256sum` style some projects publish) matches any name.
pub fn lookup_checksum(checksum_text: &str, filename: &str) -> Option<String> {
    let lines: Vec<&str> = checksum_text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .collect();

    for line in &lines {
        match parse_checksum_line(line) {
            Some((digest, Some(name))) if name == filename => {
                return Some(digest.to_lowercase());
            }
            Some((digest, None)) if lines.len() == 1 && is_valid_sha256_hex(digest) => {
                return Some(digest.to_lowercase());
            }
            _ => continue,
        }
    }

    None
}
