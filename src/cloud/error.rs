use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to deliver a request or read its response.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The connection failed while the body was being written. The endpoint
    /// may have answered early, but its status cannot be recovered.
    #[error("connection lost while sending the request body, no HTTP status available: {0}")]
    BodyInterrupted(#[source] reqwest::Error),

    #[error("I/O error during transfer: {0}")]
    Io(#[from] io::Error),
}

/// Failure of a single request against the storage endpoint.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The endpoint answered with a non-2xx status.
    #[error("server returned HTTP {status}: {body}")]
    Server { status: u16, body: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Local failure while preparing the request body.
    #[error("failed to read upload data: {0}")]
    Io(#[from] io::Error),
}

impl RequestError {
    /// HTTP status of a rejected request, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors returned by the upload entry points.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The local file could not be opened or inspected; nothing was sent.
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A single-part upload request failed.
    #[error("upload failed: {0}")]
    Request(#[from] RequestError),

    /// The endpoint rejected the multipart session; no file data was sent.
    #[error("failed to start multipart upload: {0}")]
    StartFailed(#[source] RequestError),

    /// Chunk `index` was rejected or could not be transferred.
    #[error("failed to upload chunk {index}: {cause}")]
    ChunkFailed {
        index: u64,
        #[source]
        cause: RequestError,
    },

    /// Every chunk was accepted but the session could not be finalized.
    #[error("failed to finalize multipart upload: {0}")]
    FinalizeFailed(#[source] RequestError),
}

impl UploadError {
    /// Index of the failed chunk, for chunk failures.
    pub fn chunk_index(&self) -> Option<u64> {
        match self {
            UploadError::ChunkFailed { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// HTTP status carried by the underlying request failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            UploadError::Open { .. } => None,
            UploadError::Request(cause)
            | UploadError::StartFailed(cause)
            | UploadError::ChunkFailed { cause, .. }
            | UploadError::FinalizeFailed(cause) => cause.status(),
        }
    }
}
