use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Encryption parameters forwarded to the storage endpoint as request headers.
///
/// The service performs the encryption; this crate only relays the cipher
/// name and the base64 encoded key.
#[derive(Clone, PartialEq, Eq)]
pub struct Encryption {
    pub cipher: String,
    pub key: String,
}

impl Encryption {
    pub fn new(cipher: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            cipher: cipher.into(),
            key: key.into(),
        }
    }

    /// Headers are only sent when both values are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.cipher.is_empty() && !self.key.is_empty()
    }
}

impl fmt::Debug for Encryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encryption")
            .field("cipher", &self.cipher)
            .field("key", &"<REDACTED>")
            .finish()
    }
}

/// A local file to be uploaded.
///
/// The total size is not stored here: it is read from the open file handle
/// at the start of every upload call.
#[derive(Debug, Clone)]
pub struct UploadTarget {
    pub path: PathBuf,
    pub encryption: Option<Encryption>,
}

impl UploadTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            encryption: None,
        }
    }

    pub fn with_encryption(mut self, cipher: impl Into<String>, key: impl Into<String>) -> Self {
        self.encryption = Some(Encryption::new(cipher, key));
        self
    }

    /// Encryption headers to attach to every request of this upload.
    pub fn encryption_headers(&self) -> Vec<(&'static str, String)> {
        use crate::constants::{ENCRYPTION_CIPHER_HEADER, ENCRYPTION_KEY_HEADER};

        match &self.encryption {
            Some(enc) if enc.is_complete() => vec![
                (ENCRYPTION_CIPHER_HEADER, enc.cipher.clone()),
                (ENCRYPTION_KEY_HEADER, enc.key.clone()),
            ],
            _ => Vec::new(),
        }
    }
}

/// A contiguous byte range of the source file sent as one multipart request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub index: u64,
    pub offset: u64,
    pub length: u64,
}

impl Chunk {
    /// Offset one past the last byte of this chunk.
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}

/// One progress notification delivered to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Whole percentage in `0..=100`
    pub percent: u8,
    pub bytes_transferred: u64,
    pub total_bytes: u64,
    pub elapsed: Duration,
    /// Set on the final event of an upload only
    pub done: bool,
}

impl ProgressEvent {
    /// Average rate so far in MB/s, zero before any time has elapsed.
    pub fn throughput_mb_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.bytes_transferred as f64 / (1024.0 * 1024.0) / secs
    }
}

/// Callback invoked synchronously on the uploading thread.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;
