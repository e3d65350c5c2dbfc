//! SHA-256 content hashes.
//!
//! Digests cover the original bytes of a post (text, image buffer, media
//! file). Together with a content id they form the key of a fingerprint cache
//! entry, so a re-uploaded file under the same id misses the cache while an
//! untouched one hits it. All digests are 64 lowercase hex characters.
//!
//! ```rust
//! use canonical::{hash_bytes, hash_text};
//!
//! assert_eq!(hash_text("hello world"), hash_bytes(b"hello world"));
//! assert_eq!(hash_text("hello world").len(), 64);
//! ```

use std::io::{self, Read};

use sha2::{Digest, Sha256};

/// Hash arbitrary text with SHA-256 and return a hex digest.
pub fn hash_text(text: &str) -> String {
    hash_bytes(text.as_bytes())
}

/// Hash a byte buffer with SHA-256 and return a hex digest.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Stream a reader through SHA-256 and return a hex digest.
///
/// Used for media files, which are too large to buffer whole just to derive a
/// cache key.
pub fn hash_reader<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}
