//! Store file identity
//!
//! The loader replaces the store by renaming a new file over the old one, so
//! a reload is visible as a change in the file's identity even though the
//! path stays the same.

use crate::{Error, Result};
use std::path::Path;
use std::time::SystemTime;

/// Identity of the store file at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreFingerprint {
    pub len: u64,
    pub modified: Option<SystemTime>,
    /// Inode number on unix, 0 elsewhere
    pub inode: u64,
}

impl StoreFingerprint {
    /// Read the fingerprint of the file at `path`
    pub fn read(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(format!("Database not found: {}", path.display()))
            } else {
                Error::Io(e)
            }
        })?;

        #[cfg(unix)]
        let inode = std::os::unix::fs::MetadataExt::ino(&metadata);
        #[cfg(not(unix))]
        let inode = 0;

        Ok(Self {
            len: metadata.len(),
            modified: metadata.modified().ok(),
            inode,
        })
    }
}
