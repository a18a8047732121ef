/// SHA-256 fingerprints of file contents and serialised blobs.
///
/// Each scanner worker owns one [`FileHasher`] so hashing never contends on
/// shared state. The same digest is used to pin a serialised walk in the
/// review store.
use crate::error::TrustError;
use crate::model::{Fingerprint, FingerprintMethod};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Buffer size for streaming file reads (64 KiB).
const BUF_SIZE: usize = 64 * 1024;

/// Reusable streaming hasher with its own read buffer.
pub struct FileHasher {
    hasher: Sha256,
    buf: Vec<u8>,
}

impl Default for FileHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl FileHasher {
    pub fn new() -> Self {
        Self {
            hasher: Sha256::new(),
            buf: vec![0u8; BUF_SIZE],
        }
    }

    /// Hash the full contents of the file at `path`.
    ///
    /// The file handle is dropped on every return path, and the hasher is
    /// reset on failure so the next file starts clean.
    pub fn hash_file(&mut self, path: &Path) -> io::Result<Fingerprint> {
        let mut file = fs::File::open(path)?;
        loop {
            let n = match file.read(&mut self.buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    Digest::reset(&mut self.hasher);
                    return Err(e);
                }
            };
            self.hasher.update(&self.buf[..n]);
        }
        Ok(Fingerprint::sha256(hex::encode(
            self.hasher.finalize_reset(),
        )))
    }
}

/// Fingerprint an in-memory blob, e.g. a serialised walk.
pub fn fingerprint_bytes(data: &[u8]) -> Fingerprint {
    Fingerprint::sha256(hex::encode(Sha256::digest(data)))
}

/// Check `check` against the pinned `good` fingerprint.
///
/// Fails on a method mismatch, an unknown method, an empty pinned value, or a
/// value mismatch.
pub fn verify_fingerprint(good: &Fingerprint, check: &Fingerprint) -> Result<(), TrustError> {
    if check.method != good.method {
        return Err(TrustError::MethodMismatch {
            expected: good.method.to_string(),
            actual: check.method.to_string(),
        });
    }
    if good.method == FingerprintMethod::Unknown {
        return Err(TrustError::UnknownMethod);
    }
    if good.value.is_empty() {
        return Err(TrustError::EmptyFingerprint);
    }
    if check.value != good.value {
        return Err(TrustError::FingerprintMismatch {
            expected: good.value.clone(),
            actual: check.value.clone(),
        });
    }
    Ok(())
}
