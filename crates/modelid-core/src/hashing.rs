//! Streaming digest computation for model files.
//!
//! The content identity is a truncated SHA-256: the full file is streamed
//! through the hash in fixed-size chunks and the hex encoding is cut to
//! [`HashConfig::DIGEST_HEX_LEN`] characters. The whole file is always
//! read; there is no partial-read shortcut, so identical bytes produce an
//! identical digest at any path.

use crate::config::HashConfig;
use crate::error::{ModelIdError, Result};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

/// Compute the truncated content digest for a file.
///
/// Fails with an IO error (carrying the path) if the file cannot be opened
/// or read to completion. No side effects beyond the read-only access.
pub fn compute_digest(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let mut file = std::fs::File::open(path).map_err(|e| ModelIdError::io_with_path(e, path))?;

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; HashConfig::CHUNK_SIZE];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| ModelIdError::io_with_path(e, path))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(HashConfig::DIGEST_HEX_LEN);
    Ok(digest)
}

/// Compute the digest on the blocking thread pool.
///
/// Model files are large and the read is blocking I/O, so the serving flow
/// must not run it on the async runtime directly.
pub async fn compute_digest_async(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref().to_path_buf();
    tokio::task::spawn_blocking(move || compute_digest(&path))
        .await
        .map_err(|e| ModelIdError::Other(format!("Hash computation task failed: {}", e)))?
}
