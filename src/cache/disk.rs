use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use chrono::{DateTime, Utc};
use crc32fast::Hasher;
use tracing::{debug, warn};
use crate::cache::entry::CacheEntry;
use crate::cache::key::CacheKey;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::Domain;

// [ MAGIC (4) | CRC32 of body (4, LE) | body length (4, LE) ] <- byte 0
// [ bincode(CacheEntry) ]
const MAGIC: &[u8; 4] = b"NXC1";
const HEADER_SIZE: usize = 12;
const CACHE_EXTENSION: &str = "cache";

pub fn encode_entry(entry: &CacheEntry) -> Result<Vec<u8>> {
    let body = bincode::serialize(entry)?;

    let mut hasher = Hasher::new();
    hasher.update(&body);
    let checksum = hasher.finalize();

    let mut data = Vec::with_capacity(HEADER_SIZE + body.len());
    data.extend_from_slice(MAGIC);
    data.extend_from_slice(&checksum.to_le_bytes());
    data.extend_from_slice(&(body.len() as u32).to_le_bytes());
    data.extend_from_slice(&body);
    Ok(data)
}

pub fn decode_entry(data: &[u8]) -> Result<CacheEntry> {
    if data.len() < HEADER_SIZE || &data[0..4] != MAGIC {
        return Err(Error::new(ErrorKind::Parse, "missing cache file header".to_string()));
    }

    let checksum = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    let len = u32::from_le_bytes([data[8], data[9], data[10], data[11]]) as usize;
    let body = &data[HEADER_SIZE..];

    if body.len() != len {
        return Err(Error::new(
            ErrorKind::Parse,
            format!("truncated cache file: expected {} bytes, found {}", len, body.len()),
        ));
    }

    let mut hasher = Hasher::new();
    hasher.update(body);
    if hasher.finalize() != checksum {
        return Err(Error::new(ErrorKind::Parse, "cache file checksum mismatch".to_string()));
    }

    Ok(bincode::deserialize(body)?)
}

/// Outcome of reading one entry file.
#[derive(Debug)]
pub enum DiskRead {
    Missing,
    Corrupt(Error),
    Entry(CacheEntry),
}

#[derive(Debug, Clone)]
pub struct DiskFile {
    pub path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
}

/// Disk tier: one file per entry under `<root>/<domain>/`.
///
/// Every method is infallible from the store's point of view except
/// [`DiskTier::write`], whose error the store logs and drops.
#[derive(Debug)]
pub struct DiskTier {
    root: PathBuf,
    max_bytes: u64,
    usage_bytes: u64,
}

impl DiskTier {
    pub fn open(root: PathBuf, max_bytes: u64) -> Self {
        for dir in Self::dir_names() {
            if let Err(e) = fs::create_dir_all(root.join(dir)) {
                warn!("Cannot create cache directory {}: {}", root.join(dir).display(), e);
            }
        }

        let mut tier = DiskTier {
            root,
            max_bytes,
            usage_bytes: 0,
        };
        tier.refresh_usage();
        tier
    }

    fn dir_names() -> [&'static str; 2] {
        [Domain::Food.dir_name(), Domain::Exercise.dir_name()]
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Tracked usage; drifts if another process writes to the same root.
    pub fn usage_bytes(&self) -> u64 {
        self.usage_bytes
    }

    pub fn is_over_budget(&self) -> bool {
        self.usage_bytes > self.max_bytes
    }

    pub fn refresh_usage(&mut self) -> u64 {
        self.usage_bytes = self.scan(None).iter().map(|f| f.size).sum();
        self.usage_bytes
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.domain.dir_name()).join(key.file_name())
    }

    pub fn read(&self, key: &CacheKey) -> DiskRead {
        let path = self.path_for(key);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return DiskRead::Missing,
            Err(e) => return DiskRead::Corrupt(e.into()),
        };

        match decode_entry(&data) {
            // A file whose stored key differs was written for another key
            Ok(entry) if entry.key != key.namespaced() => DiskRead::Corrupt(Error::new(
                ErrorKind::Parse,
                format!("key mismatch in {}", path.display()),
            )),
            Ok(entry) => DiskRead::Entry(entry),
            Err(e) => DiskRead::Corrupt(e),
        }
    }

    pub fn write(&mut self, key: &CacheKey, entry: &CacheEntry) -> Result<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = encode_entry(entry)?;
        let previous = file_size(&path);

        // Write-then-rename so readers never see a half-written file
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, &data)?;
        if let Err(e) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        self.usage_bytes = self.usage_bytes.saturating_sub(previous) + data.len() as u64;
        Ok(())
    }

    pub fn remove(&mut self, key: &CacheKey) -> bool {
        let path = self.path_for(key);
        self.remove_path(&path)
    }

    pub fn remove_path(&mut self, path: &Path) -> bool {
        let size = file_size(path);
        match fs::remove_file(path) {
            Ok(()) => {
                self.usage_bytes = self.usage_bytes.saturating_sub(size);
                true
            }
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to remove cache file {}: {}", path.display(), e);
                }
                false
            }
        }
    }

    /// List entry files, optionally restricted to one domain.
    pub fn scan(&self, domain: Option<Domain>) -> Vec<DiskFile> {
        let dirs: Vec<&str> = match domain {
            Some(d) => vec![d.dir_name()],
            None => Self::dir_names().to_vec(),
        };

        let mut files = Vec::new();
        for dir in dirs {
            let dir_path = self.root.join(dir);
            let read_dir = match fs::read_dir(&dir_path) {
                Ok(read_dir) => read_dir,
                Err(e) => {
                    debug!("Skipping cache directory {}: {}", dir_path.display(), e);
                    continue;
                }
            };

            for dir_entry in read_dir.flatten() {
                let path = dir_entry.path();
                if path.extension().and_then(|s| s.to_str()) != Some(CACHE_EXTENSION) {
                    continue;
                }

                if let Some(d) = domain {
                    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or_default();
                    if !d.owns_file(name) {
                        continue;
                    }
                }

                if let Ok(meta) = dir_entry.metadata() {
                    files.push(DiskFile {
                        path,
                        size: meta.len(),
                        modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                    });
                }
            }
        }

        files
    }

    /// Delete expired and undecodable files. Returns how many were removed.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;

        for file in self.scan(None) {
            let stale = match fs::read(&file.path) {
                Ok(data) => match decode_entry(&data) {
                    Ok(entry) => entry.is_expired_at(now),
                    Err(e) => {
                        debug!("Removing corrupt cache file {}: {}", file.path.display(), e);
                        true
                    }
                },
                Err(e) => {
                    debug!("Cannot read cache file {}: {}", file.path.display(), e);
                    false
                }
            };

            if stale && self.remove_path(&file.path) {
                removed += 1;
            }
        }

        removed
    }

    /// Delete the least recently written files until usage is at most `target_bytes`.
    pub fn trim_to(&mut self, target_bytes: u64) -> usize {
        if self.usage_bytes <= target_bytes {
            return 0;
        }

        let mut files = self.scan(None);
        files.sort_by_key(|f| f.modified);

        let mut removed = 0;
        for file in files {
            if self.usage_bytes <= target_bytes {
                break;
            }
            if self.remove_path(&file.path) {
                removed += 1;
            }
        }

        removed
    }

    pub fn clear(&mut self, domain: Option<Domain>) -> usize {
        let mut removed = 0;
        for file in self.scan(domain) {
            if self.remove_path(&file.path) {
                removed += 1;
            }
        }
        removed
    }
}

fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
