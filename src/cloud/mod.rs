//! Snapshot uploads to HTTP storage.
//!
//! Two entry points are provided and callers pick one directly:
//!
//! - [`single_part::upload_single_part`] streams the whole file in one
//!   `POST /v1/upload` request.
//! - [`multipart::upload_multipart`] negotiates a chunk size with
//!   `PUT /v2/upload/start`, sends each byte range with
//!   `PUT /v2/upload/chunk/{index}` and closes the session with
//!   `PUT /v2/upload/finalize`.
//!
//! Both report progress through a [`ProgressCallback`] that fires on every
//! whole-percentage increase and ends with exactly one `done` event at 100%.
//! [`upload_file`] is a convenience for callers that want the choice made by
//! file size.
//!
//! ## Usage Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use snapshot_upload::cloud::client::HttpClient;
//! use snapshot_upload::cloud::multipart::upload_multipart;
//! use snapshot_upload::models::{ProgressEvent, UploadTarget};
//!
//! # fn example() -> anyhow::Result<()> {
//! let client = HttpClient::new("https://db.example.com", Some("token".to_string()), None)?;
//! let target = UploadTarget::new("/var/backups/app.db");
//!
//! upload_multipart(&client, &target, Arc::new(|event: ProgressEvent| {
//!     println!("{}% ({}/{} bytes)", event.percent, event.bytes_transferred, event.total_bytes);
//! }))?;
//! # Ok(())
//! # }
//! ```

/// Chunk partitioning and percentage arithmetic
pub mod chunking;

/// HTTP transport seam and the reqwest implementation
pub mod client;

/// Upload error taxonomy
pub mod error;

/// Negotiated chunked upload
pub mod multipart;

/// Progress reporting reader
pub mod progress;

/// Streamed single-request upload
pub mod single_part;

use std::fs;

use log::debug;

use crate::cloud::client::HttpTransport;
use crate::cloud::error::UploadError;
use crate::models::{ProgressCallback, UploadTarget};

pub use error::{RequestError, TransportError};

/// How [`upload_file`] sends a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStrategy {
    SinglePart,
    Multipart,
    /// Multipart for files strictly larger than `threshold` bytes
    Auto { threshold: u64 },
}

impl UploadStrategy {
    /// Resolve `Auto` against a concrete file size.
    pub fn resolve(self, file_size: u64) -> UploadStrategy {
        match self {
            UploadStrategy::Auto { threshold } if file_size > threshold => UploadStrategy::Multipart,
            UploadStrategy::Auto { .. } => UploadStrategy::SinglePart,
            other => other,
        }
    }
}

/// Upload `target` with the given strategy, returning the strategy used.
pub fn upload_file<T: HttpTransport + ?Sized>(
    transport: &T,
    target: &UploadTarget,
    strategy: UploadStrategy,
    on_progress: ProgressCallback,
) -> Result<UploadStrategy, UploadError> {
    let strategy = match strategy {
        UploadStrategy::Auto { .. } => {
            let size = fs::metadata(&target.path)
                .map_err(|source| UploadError::Open {
                    path: target.path.clone(),
                    source,
                })?
                .len();
            strategy.resolve(size)
        }
        other => other,
    };

    debug!("Uploading {} using {:?}", target.path.display(), strategy);
    match strategy {
        UploadStrategy::Multipart => multipart::upload_multipart(transport, target, on_progress)?,
        _ => single_part::upload_single_part(transport, target, on_progress)?,
    }
    Ok(strategy)
}
