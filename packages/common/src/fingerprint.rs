use std::fmt;
use std::io;
use std::path::Path;
use std::time::UNIX_EPOCH;

use sha2::{Digest, Sha256};

/// Cache key for a compiled artifact.
///
/// Derived from the source file's directory, stem, modification time and
/// size, so a cached binary stays valid until the source is touched or
/// resized, and same-named files in different directories never collide.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Compute the fingerprint from its components.
    pub fn compute(dir: &str, stem: &str, modified_nanos: u128, size: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(dir.as_bytes());
        hasher.update([0u8]);
        hasher.update(stem.as_bytes());
        hasher.update([0u8]);
        hasher.update(modified_nanos.to_le_bytes());
        hasher.update(size.to_le_bytes());
        Self(hasher.finalize().into())
    }

    /// Fingerprint the file at `path` from its current metadata.
    pub fn of_file(path: &Path) -> io::Result<Self> {
        let meta = std::fs::metadata(path)?;
        let modified_nanos = meta
            .modified()?
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = std::fs::canonicalize(path)?
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::compute(&dir, &stem, modified_nanos, meta.len()))
    }

    /// Return the fingerprint as a 64-character lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First 16 hex characters, used in cache file names.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.short())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
