use std::fs::File;
use std::io::{BufReader, Read};
use std::time::Instant;

use log::{debug, info, warn};

use crate::cloud::client::{HttpRequest, HttpTransport, Method};
use crate::cloud::error::{RequestError, UploadError};
use crate::cloud::progress::ProgressReader;
use crate::constants::{SINGLE_PART_UPLOAD_PATH, UPLOAD_BUFFER_SIZE};
use crate::models::{ProgressCallback, UploadTarget};

/// Open `target` and return the handle with its current size.
pub(crate) fn open_target(target: &UploadTarget) -> Result<(File, u64), UploadError> {
    let open_error = |source| UploadError::Open {
        path: target.path.clone(),
        source,
    };

    let file = File::open(&target.path).map_err(open_error)?;
    let size = file.metadata().map_err(open_error)?.len();
    Ok((file, size))
}

/// Upload a whole file as one streamed POST request.
///
/// The body is read straight from disk while the request is sent, so the
/// file is never held in memory. Nothing is retried.
///
/// # Errors
///
/// * [`UploadError::Open`] if the file cannot be opened; no request is made.
/// * [`UploadError::Request`] wrapping [`RequestError::Server`] for a non-2xx
///   answer, or a transport failure.
pub fn upload_single_part<T: HttpTransport + ?Sized>(
    transport: &T,
    target: &UploadTarget,
    on_progress: ProgressCallback,
) -> Result<(), UploadError> {
    let (file, file_size) = open_target(target)?;
    let start_time = Instant::now();

    debug!("Starting single-part upload of {} ({} bytes)", target.path.display(), file_size);

    // Bytes appended after the size was taken are not part of this upload.
    let reader = ProgressReader::new(
        BufReader::with_capacity(UPLOAD_BUFFER_SIZE, file.take(file_size)),
        file_size,
        on_progress,
    );
    let request = HttpRequest::new(Method::Post, SINGLE_PART_UPLOAD_PATH)
        .headers(target.encryption_headers())
        .body(reader, Some(file_size));

    let response = transport.send(request).map_err(RequestError::from)?;
    if !response.is_success() {
        warn!("Single-part upload of {} rejected with HTTP {}",
              target.path.display(), response.status);
        return Err(RequestError::Server {
            status: response.status,
            body: response.body,
        }
        .into());
    }

    info!("Uploaded {} ({} bytes) in {:?}",
          target.path.display(), file_size, start_time.elapsed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::client::{MockHttpTransport, RequestBody};
    use crate::cloud::client::HttpResponse;
    use crate::cloud::error::TransportError;
    use crate::models::ProgressEvent;
    use std::io::{self, Read, Write};
    use std::sync::{Arc, Mutex};
    use tempfile::NamedTempFile;

    fn snapshot(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    fn ignore_progress() -> ProgressCallback {
        Arc::new(|_: ProgressEvent| {})
    }

    #[test]
    fn test_missing_file_makes_no_request() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().times(0);

        let target = UploadTarget::new("/nonexistent/snapshot.db");
        let err = upload_single_part(&transport, &target, ignore_progress()).unwrap_err();

        assert!(matches!(err, UploadError::Open { .. }));
        assert!(err.to_string().contains("/nonexistent/snapshot.db"));
    }

    #[test]
    fn test_streams_file_with_headers() {
        let content = b"SQLite format 3\0snapshot-bytes".to_vec();
        let file = snapshot(&content);
        let expected = content.clone();

        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .times(1)
            .withf(|req| {
                req.method == Method::Post
                    && req.path == SINGLE_PART_UPLOAD_PATH
                    && req.header("x-encryption-cipher") == Some("aes256gcm")
                    && req.header("x-encryption-key") == Some("a2V5")
            })
            .returning(move |req| {
                let mut received = Vec::new();
                match req.body {
                    RequestBody::Reader { mut reader, length } => {
                        assert_eq!(length, Some(expected.len() as u64));
                        reader.read_to_end(&mut received).unwrap();
                    }
                    RequestBody::Empty => panic!("expected a streamed body"),
                }
                assert_eq!(received, expected);
                Ok(HttpResponse::new(200, ""))
            });

        let events = Arc::new(Mutex::new(Vec::<ProgressEvent>::new()));
        let sink = Arc::clone(&events);
        let target = UploadTarget::new(file.path()).with_encryption("aes256gcm", "a2V5");

        upload_single_part(&transport, &target, Arc::new(move |e: ProgressEvent| sink.lock().unwrap().push(e)))
            .unwrap();

        let events = events.lock().unwrap();
        let last = events.last().unwrap();
        assert!(last.done);
        assert_eq!(last.percent, 100);
        assert_eq!(last.total_bytes, content.len() as u64);
    }

    #[test]
    fn test_body_stops_at_size_taken_at_open() {
        let file = snapshot(b"page-1 page-2 ");
        let path = file.path().to_path_buf();

        let mut transport = MockHttpTransport::new();
        transport.expect_send().times(1).returning(move |req| {
            let mut writer = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
            writer.write_all(b"page-3 written mid-upload").unwrap();
            writer.flush().unwrap();

            let mut received = Vec::new();
            if let RequestBody::Reader { mut reader, length } = req.body {
                assert_eq!(length, Some(14));
                reader.read_to_end(&mut received).unwrap();
            }
            assert_eq!(received, b"page-1 page-2 ");
            Ok(HttpResponse::new(200, ""))
        });

        let target = UploadTarget::new(file.path());
        upload_single_part(&transport, &target, ignore_progress()).unwrap();
    }

    #[test]
    fn test_non_success_status_is_server_error() {
        let file = snapshot(b"data");

        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(413, "snapshot too large")));

        let target = UploadTarget::new(file.path());
        let err = upload_single_part(&transport, &target, ignore_progress()).unwrap_err();

        match err {
            UploadError::Request(RequestError::Server { status, ref body }) => {
                assert_eq!(status, 413);
                assert_eq!(body, "snapshot too large");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_transport_failure_is_surfaced() {
        let file = snapshot(b"data");

        let mut transport = MockHttpTransport::new();
        transport.expect_send().times(1).returning(|_| {
            Err(TransportError::Io(io::Error::new(io::ErrorKind::ConnectionRefused, "refused")))
        });

        let target = UploadTarget::new(file.path());
        let err = upload_single_part(&transport, &target, ignore_progress()).unwrap_err();
        assert!(matches!(err, UploadError::Request(RequestError::Transport(_))));
        assert!(err.to_string().contains("refused"));
    }
}
