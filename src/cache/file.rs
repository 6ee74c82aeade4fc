//! Cache file format
//!
//! Layout:
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ HEADER (24 bytes)                       │
//! │   magic: [u8; 4] = "SIGC"               │
//! │   version: u16                          │
//! │   reserved: [u8; 2]                     │
//! │   payload_len: u64                      │
//! │   payload_checksum: u32                 │
//! │   header_checksum: u32                  │
//! ├─────────────────────────────────────────┤
//! │ PAYLOAD (payload_len bytes)             │
//! │   LZ4(bincode(value)), size prepended   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! Files are replaced atomically: the new contents go to a sibling temp file
//! which is fsynced and then renamed over the key. Concurrent writers race,
//! the last rename wins, and readers only ever see a complete file.

use crate::cache::error::{CacheError, CacheResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Distinguishes temp files of concurrent writers within one process
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Magic bytes for cache file identification
const CACHE_MAGIC: [u8; 4] = *b"SIGC";

/// Current cache format version
const CACHE_VERSION: u16 = 1;

/// Header size in bytes
const HEADER_SIZE: usize = 24;

/// Cache file header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheHeader {
    /// Format version
    pub version: u16,
    /// Length of the payload following the header
    pub payload_len: u64,
    /// CRC32 of the payload
    pub payload_checksum: u32,
}

impl CacheHeader {
    fn for_payload(payload: &[u8]) -> Self {
        Self {
            version: CACHE_VERSION,
            payload_len: payload.len() as u64,
            payload_checksum: crc32fast::hash(payload),
        }
    }

    /// Serialize header to bytes
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];

        buf[0..4].copy_from_slice(&CACHE_MAGIC);
        buf[4..6].copy_from_slice(&self.version.to_le_bytes());
        // bytes 6-7 reserved
        buf[8..16].copy_from_slice(&self.payload_len.to_le_bytes());
        buf[16..20].copy_from_slice(&self.payload_checksum.to_le_bytes());

        let checksum = crc32fast::hash(&buf[0..20]);
        buf[20..24].copy_from_slice(&checksum.to_le_bytes());

        buf
    }

    /// Parse header from bytes
    pub fn from_bytes(buf: &[u8]) -> CacheResult<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(CacheError::Corruption(format!(
                "Truncated header: {} of {} bytes",
                buf.len(),
                HEADER_SIZE
            )));
        }

        if buf[0..4] != CACHE_MAGIC {
            return Err(CacheError::Corruption(format!(
                "Invalid magic bytes: {:?}",
                &buf[0..4]
            )));
        }

        let stored_checksum = u32::from_le_bytes([buf[20], buf[21], buf[22], buf[23]]);
        let computed_checksum = crc32fast::hash(&buf[0..20]);

        if stored_checksum != computed_checksum {
            return Err(CacheError::Corruption(format!(
                "Header checksum mismatch: stored={}, computed={}",
                stored_checksum, computed_checksum
            )));
        }

        let version = u16::from_le_bytes([buf[4], buf[5]]);
        if version != CACHE_VERSION {
            return Err(CacheError::Corruption(format!(
                "Unsupported cache version: expected {}, got {}",
                CACHE_VERSION, version
            )));
        }

        let mut len_bytes = [0u8; 8];
        len_bytes.copy_from_slice(&buf[8..16]);

        Ok(Self {
            version,
            payload_len: u64::from_le_bytes(len_bytes),
            payload_checksum: u32::from_le_bytes([buf[16], buf[17], buf[18], buf[19]]),
        })
    }
}

/// A single-value cache file addressed by its path
#[derive(Debug, Clone)]
pub struct CacheFile {
    path: PathBuf,
}

impl CacheFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The key of this entry
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Decode the stored value, or `None` if nothing is stored yet
    pub fn load<T: DeserializeOwned>(&self) -> CacheResult<Option<T>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        decode(&bytes).map(Some)
    }

    /// Persist a value, atomically replacing any previous one
    pub fn store<T: Serialize>(&self, value: &T) -> CacheResult<()> {
        let bytes = encode(value)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.temp_path();
        if let Err(e) = write_synced(&temp_path, &bytes) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        tracing::debug!(
            path = %self.path.display(),
            bytes = bytes.len(),
            "Stored cache entry"
        );
        Ok(())
    }

    /// Delete the stored value. Returns whether a file was removed.
    pub fn invalidate(&self) -> CacheResult<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "Invalidated cache entry");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Unique temp file next to the key, so the final rename stays on one filesystem
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        name.push(format!(".{}.{}.tmp", std::process::id(), seq));
        self.path.with_file_name(name)
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// Serialize a value into a complete cache file image
fn encode<T: Serialize>(value: &T) -> CacheResult<Vec<u8>> {
    let serialized = bincode::serialize(value)?;
    let payload = lz4_flex::compress_prepend_size(&serialized);

    let header = CacheHeader::for_payload(&payload);

    let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len());
    bytes.extend_from_slice(&header.to_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Verify and decode a cache file image
fn decode<T: DeserializeOwned>(bytes: &[u8]) -> CacheResult<T> {
    let header = CacheHeader::from_bytes(bytes)?;
    let payload = &bytes[HEADER_SIZE..];

    if payload.len() as u64 != header.payload_len {
        return Err(CacheError::Corruption(format!(
            "Payload length mismatch: header says {}, file has {}",
            header.payload_len,
            payload.len()
        )));
    }

    let computed = crc32fast::hash(payload);
    if computed != header.payload_checksum {
        return Err(CacheError::Corruption(format!(
            "Payload checksum mismatch: stored={}, computed={}",
            header.payload_checksum, computed
        )));
    }

    let decompressed = lz4_flex::decompress_size_prepended(payload)
        .map_err(|e| CacheError::Compression(format!("LZ4 decompression failed: {}", e)))?;

    Ok(bincode::deserialize(&decompressed)?)
}
