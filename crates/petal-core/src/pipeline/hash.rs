//! BLAKE3 content hashing for result records and model verification.

use blake3::Hasher as Blake3Hasher;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Content hashing helpers.
pub struct Hasher;

impl Hasher {
    /// Generate a BLAKE3 hash of file contents.
    ///
    /// Streams the file so multi-hundred-megabyte model files are not loaded
    /// into memory.
    pub fn content_hash(path: &Path) -> std::io::Result<String> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut hasher = Blake3Hasher::new();

        let mut buffer = [0u8; 65536];
        loop {
            let bytes_read = reader.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(hasher.finalize().to_hex().to_string())
    }

    /// Generate a BLAKE3 hash from an in-memory byte buffer.
    pub fn content_hash_from_bytes(data: &[u8]) -> String {
        blake3::hash(data).to_hex().to_string()
    }

    /// Check a file against an expected hex checksum (case-insensitive).
    ///
    /// Returns the actual hash on mismatch so callers can report it.
    pub fn verify(path: &Path, expected: &str) -> std::io::Result<Result<(), String>> {
        let actual = Self::content_hash(path)?;
        if actual.eq_ignore_ascii_case(expected.trim()) {
            Ok(Ok(()))
        } else {
            Ok(Err(actual))
        }
    }
}
