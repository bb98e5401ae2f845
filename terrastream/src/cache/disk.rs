//! Disk-cache file access and maintenance.
//!
//! Files hold the raw fetched bytes with no header, one file per resource
//! under `<root>/cache/`.

use bytes::Bytes;
use std::fs;
use std::path::Path;

use super::name::CACHE_DIR;
use super::types::CacheError;

/// Read a whole file into memory.
pub fn read_file(path: &Path) -> Result<Bytes, CacheError> {
    fs::read(path)
        .map(Bytes::from)
        .map_err(|e| CacheError::io(path, e))
}

/// Write `data` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, data: &[u8]) -> Result<(), CacheError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| CacheError::io(parent, e))?;
    }
    fs::write(path, data).map_err(|e| CacheError::io(path, e))
}

/// Size of the disk cache under a root directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskCacheSummary {
    pub files: u64,
    pub bytes: u64,
}

/// Outcome of [`clear_disk_cache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearResult {
    pub files_deleted: u64,
    pub bytes_freed: u64,
}

/// Count files and bytes stored under `<root>/cache`.
///
/// A missing cache directory is an empty cache.
pub fn disk_cache_stats(root: &Path) -> Result<DiskCacheSummary, CacheError> {
    let dir = root.join(CACHE_DIR);
    let mut summary = DiskCacheSummary::default();
    if dir.is_dir() {
        scan_directory(&dir, &mut summary)?;
    }
    Ok(summary)
}

fn scan_directory(dir: &Path, summary: &mut DiskCacheSummary) -> Result<(), CacheError> {
    let entries = fs::read_dir(dir).map_err(|e| CacheError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| CacheError::io(dir, e))?;
        let path = entry.path();
        let metadata = entry.metadata().map_err(|e| CacheError::io(&path, e))?;

        if metadata.is_dir() {
            scan_directory(&path, summary)?;
        } else {
            summary.files += 1;
            summary.bytes += metadata.len();
        }
    }
    Ok(())
}

/// Delete everything under `<root>/cache`, reporting what was removed.
pub fn clear_disk_cache(root: &Path) -> Result<ClearResult, CacheError> {
    let dir = root.join(CACHE_DIR);
    if !dir.is_dir() {
        return Ok(ClearResult::default());
    }

    let summary = disk_cache_stats(root)?;
    fs::remove_dir_all(&dir).map_err(|e| CacheError::io(&dir, e))?;

    Ok(ClearResult {
        files_deleted: summary.files,
        bytes_freed: summary.bytes,
    })
}
