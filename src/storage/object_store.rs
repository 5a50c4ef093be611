use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};

/// Write-only object storage used for session records.
pub trait ObjectStore: Send + Sync {
    /// Stores `payload` under `key`. Keys are unique per session; an existing
    /// object is never replaced.
    fn put(&self, key: &str, payload: &[u8]) -> Result<()>;
}

/// Object store backed by a directory, one file per key.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn object_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty()
            || key.contains(['/', '\\'])
            || key == "."
            || key.contains("..")
        {
            bail!("Invalid object key {key:?}");
        }
        Ok(self.root.join(key))
    }
}

impl ObjectStore for FsObjectStore {
    fn put(&self, key: &str, payload: &[u8]) -> Result<()> {
        let path = self.object_path(key)?;
        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create container {}", self.root.display()))?;
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .with_context(|| format!("Failed to create object {}", path.display()))?;
        file.write_all(payload)
            .with_context(|| format!("Failed to write object {}", path.display()))?;
        file.sync_all()?;
        Ok(())
    }
}

/// Computes a lowercase hex SHA-256 hash of the provided bytes.
pub fn compute_hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("{:x}", digest)
}
