//! Negotiated multipart upload.
//!
//! The endpoint chooses the chunk size when the session starts. The file is
//! then sent as sequential byte ranges, one request at a time, and the session
//! is finalized once every chunk has been accepted.

use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::time::Instant;

use log::{debug, info, warn};
use serde::Deserialize;

use crate::cloud::chunking::{num_chunks, plan_chunks};
use crate::cloud::client::{HttpRequest, HttpResponse, HttpTransport, Method};
use crate::cloud::error::{RequestError, UploadError};
use crate::cloud::progress::{ProgressOffset, ProgressReader};
use crate::cloud::single_part::open_target;
use crate::constants::{
    MULTIPART_CHUNK_PATH, MULTIPART_FINALIZE_PATH, MULTIPART_START_PATH, PERCENT_COMPLETE,
};
use crate::models::{Chunk, ProgressCallback, ProgressEvent, UploadTarget};

/// Where a multipart upload currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Idle,
    Started { chunk_size: u64 },
    Uploading { index: u64 },
    Finalizing,
    Done,
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadStage::Idle => write!(f, "idle"),
            UploadStage::Started { chunk_size } => write!(f, "started (chunk size {})", chunk_size),
            UploadStage::Uploading { index } => write!(f, "uploading chunk {}", index),
            UploadStage::Finalizing => write!(f, "finalizing"),
            UploadStage::Done => write!(f, "done"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StartResponse {
    chunk_size: i64,
}

fn check_status(response: HttpResponse) -> Result<HttpResponse, RequestError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(RequestError::Server {
            status: response.status,
            body: response.body,
        })
    }
}

/// Open a session and return the chunk size the endpoint asked for.
fn start_session<T: HttpTransport + ?Sized>(
    transport: &T,
    headers: &[(&'static str, String)],
) -> Result<u64, RequestError> {
    let request = HttpRequest::new(Method::Put, MULTIPART_START_PATH).headers(headers.to_vec());
    let response = check_status(transport.send(request)?)?;

    let parsed: StartResponse = serde_json::from_str(&response.body).map_err(|e| {
        RequestError::InvalidResponse(format!("malformed session start response: {}", e))
    })?;

    if parsed.chunk_size <= 0 {
        return Err(RequestError::InvalidResponse(format!(
            "chunk size must be positive, got {}",
            parsed.chunk_size
        )));
    }
    Ok(parsed.chunk_size as u64)
}

fn finalize_session<T: HttpTransport + ?Sized>(
    transport: &T,
    headers: &[(&'static str, String)],
) -> Result<(), RequestError> {
    let request = HttpRequest::new(Method::Put, MULTIPART_FINALIZE_PATH).headers(headers.to_vec());
    check_status(transport.send(request)?)?;
    Ok(())
}

/// Reader over exactly `chunk`'s byte range of an already open file.
///
/// The returned handle shares the open file description with `file`.
pub fn chunk_reader(file: &File, chunk: &Chunk) -> io::Result<io::Take<File>> {
    let mut handle = file.try_clone()?;
    handle.seek(SeekFrom::Start(chunk.offset))?;
    Ok(handle.take(chunk.length))
}

/// Send one chunk as `PUT /v2/upload/chunk/{index}` with a literal
/// `Content-Length` equal to the chunk length.
///
/// `offset` positions this chunk's progress within the whole upload.
pub fn upload_chunk<T: HttpTransport + ?Sized>(
    transport: &T,
    file: &File,
    chunk: &Chunk,
    total_size: u64,
    headers: &[(&'static str, String)],
    offset: ProgressOffset,
    on_progress: ProgressCallback,
) -> Result<(), RequestError> {
    let reader = ProgressReader::with_offset(chunk_reader(file, chunk)?, total_size, offset, on_progress);
    let request = HttpRequest::new(Method::Put, format!("{}/{}", MULTIPART_CHUNK_PATH, chunk.index))
        .headers(headers.to_vec())
        .body(reader, Some(chunk.length));

    check_status(transport.send(request)?)?;
    Ok(())
}

/// Upload a file as a negotiated sequence of chunks.
///
/// Chunks are sent strictly in index order with one request in flight. A
/// failure stops the upload immediately: already accepted chunks are left
/// for the endpoint to clean up and nothing is retried.
///
/// A zero-byte file opens a session, sends no chunks, reports a single
/// completed progress event and finalizes.
///
/// # Errors
///
/// * [`UploadError::Open`] if the file cannot be opened; no request is made.
/// * [`UploadError::StartFailed`] if the session is rejected or its
///   response is unusable.
/// * [`UploadError::ChunkFailed`] naming the first chunk that failed.
/// * [`UploadError::FinalizeFailed`] if finalization is rejected, even
///   though every byte was delivered.
pub fn upload_multipart<T: HttpTransport + ?Sized>(
    transport: &T,
    target: &UploadTarget,
    on_progress: ProgressCallback,
) -> Result<(), UploadError> {
    let (file, file_size) = open_target(target)?;
    let headers = target.encryption_headers();
    let started = Instant::now();
    let mut stage = UploadStage::Idle;
    debug!("{}: {} ({} bytes)", stage, target.path.display(), file_size);

    let chunk_size = start_session(transport, &headers).map_err(|e| {
        warn!("Multipart session for {} rejected: {}", target.path.display(), e);
        UploadError::StartFailed(e)
    })?;
    stage = UploadStage::Started { chunk_size };

    let total_chunks = num_chunks(file_size, chunk_size);
    info!("Uploading {} in {} chunks ({})", target.path.display(), total_chunks, stage);

    if total_chunks == 0 {
        on_progress(ProgressEvent {
            percent: PERCENT_COMPLETE,
            bytes_transferred: 0,
            total_bytes: 0,
            elapsed: started.elapsed(),
            done: true,
        });
    }

    for chunk in plan_chunks(file_size, chunk_size) {
        stage = UploadStage::Uploading { index: chunk.index };
        debug!("{}: bytes {}..{}", stage, chunk.offset, chunk.end());

        let offset = ProgressOffset::for_chunk(&chunk, file_size, started);
        upload_chunk(transport, &file, &chunk, file_size, &headers, offset, on_progress.clone())
            .map_err(|cause| {
                warn!("Chunk {} of {} failed: {}", chunk.index, target.path.display(), cause);
                UploadError::ChunkFailed {
                    index: chunk.index,
                    cause,
                }
            })?;
    }

    stage = UploadStage::Finalizing;
    debug!("{}: {}", stage, target.path.display());
    finalize_session(transport, &headers).map_err(|e| {
        warn!("Finalizing upload of {} failed: {}", target.path.display(), e);
        UploadError::FinalizeFailed(e)
    })?;

    stage = UploadStage::Done;
    info!("Multipart upload of {} {} ({} bytes in {:?})",
          target.path.display(), stage, file_size, started.elapsed());
    Ok(())
}
