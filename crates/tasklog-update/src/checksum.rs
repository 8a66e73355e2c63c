//! SHA256 integrity checks for downloaded binaries

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Read buffer size for hashing (1MB)
const HASH_CHUNK_SIZE: usize = 1024 * 1024;

/// Calculate the lowercase hex SHA256 of a file
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; HASH_CHUNK_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Expected digest for `asset_name` from a checksum file
///
/// Accepts either a bare digest (`<asset>.sha256`) or `sha256sum` style
/// lines (`<digest>  <name>`, optionally `*<name>` for binary mode).
pub fn parse_checksum_listing(contents: &str, asset_name: &str) -> Option<String> {
    let lines = contents.lines().map(str::trim).filter(|l| !l.is_empty());

    let mut first = None;
    for line in lines {
        let mut fields = line.split_whitespace();
        let digest = fields.next()?;
        match fields.next() {
            Some(name) => {
                let name = name.trim_start_matches('*');
                let base = name.rsplit('/').next().unwrap_or(name);
                if base == asset_name && is_sha256_hex(digest) {
                    return Some(digest.to_ascii_lowercase());
                }
            }
            None if first.is_none() => first = Some(digest),
            None => {}
        }
    }

    first
        .filter(|d| is_sha256_hex(d))
        .map(str::to_ascii_lowercase)
}

/// Compare a file's digest against an expected value, ignoring case
///
/// Returns the actual digest on mismatch.
pub fn verify_file(path: &Path, expected: &str) -> io::Result<Result<(), String>> {
    let actual = sha256_file(path)?;
    if actual.eq_ignore_ascii_case(expected.trim()) {
        Ok(Ok(()))
    } else {
        Ok(Err(actual))
    }
}

fn is_sha256_hex(s: &str) -> bool {
    s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit())
}
