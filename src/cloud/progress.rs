use std::io::{self, Read};
use std::time::{Duration, Instant};

use crate::cloud::chunking::percent_of;
use crate::constants::{PERCENT_COMPLETE, PROGRESS_SENTINEL};
use crate::models::{Chunk, ProgressCallback, ProgressEvent};

/// Where a reader's byte count starts within the whole upload.
///
/// Successive chunk readers each receive their own offset value, so progress
/// stays continuous across independently issued requests without any shared
/// mutable state between them.
#[derive(Debug, Clone, Copy)]
pub struct ProgressOffset {
    /// Bytes already accounted for by earlier readers
    pub base_bytes: u64,
    /// Highest percentage already reported
    pub last_percent: i64,
    /// Start of the whole upload, used for `elapsed`
    pub started: Instant,
}

impl ProgressOffset {
    /// Offset for the first (or only) reader of an upload.
    pub fn start(started: Instant) -> Self {
        Self {
            base_bytes: 0,
            last_percent: PROGRESS_SENTINEL,
            started,
        }
    }

    /// Offset for the reader of `chunk`, assuming every earlier chunk was
    /// fully consumed. Every percentage up to the one covering
    /// `chunk.offset` has then been reported already.
    pub fn for_chunk(chunk: &Chunk, total_size: u64, started: Instant) -> Self {
        if chunk.offset == 0 {
            return Self::start(started);
        }
        Self {
            base_bytes: chunk.offset,
            last_percent: i64::from(percent_of(chunk.offset, total_size)),
            started,
        }
    }
}

/// Wraps a byte source and reports cumulative progress against a total.
///
/// A callback fires on every whole-percentage increase and once more, with
/// `done` set, on the read that brings the cumulative count to the total.
/// No percentage value is ever reported twice.
pub struct ProgressReader<R> {
    inner: R,
    total_size: u64,
    base_bytes: u64,
    bytes_read: u64,
    last_update: i64,
    start_time: Instant,
    finished: bool,
    callback: ProgressCallback,
}

impl<R: Read> ProgressReader<R> {
    /// Reader covering a whole upload on its own.
    pub fn new(inner: R, total_size: u64, callback: ProgressCallback) -> Self {
        Self::with_offset(inner, total_size, ProgressOffset::start(Instant::now()), callback)
    }

    /// Reader covering one slice of a larger upload.
    ///
    /// An empty upload reports completion immediately and never reports again.
    pub fn with_offset(
        inner: R,
        total_size: u64,
        offset: ProgressOffset,
        callback: ProgressCallback,
    ) -> Self {
        let mut reader = Self {
            inner,
            total_size,
            base_bytes: offset.base_bytes,
            bytes_read: 0,
            last_update: offset.last_percent,
            start_time: offset.started,
            finished: false,
            callback,
        };

        if total_size == 0 {
            reader.finished = true;
            reader.last_update = i64::from(PERCENT_COMPLETE);
            (reader.callback)(ProgressEvent {
                percent: PERCENT_COMPLETE,
                bytes_transferred: 0,
                total_bytes: 0,
                elapsed: Duration::ZERO,
                done: true,
            });
        }

        reader
    }

    /// Bytes consumed from the wrapped source so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Whether the completion event has been delivered.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn record(&mut self, n: usize) {
        self.bytes_read += n as u64;
        if self.finished {
            return;
        }

        let transferred = self.base_bytes + self.bytes_read;
        let percent = percent_of(transferred, self.total_size);
        let done = transferred >= self.total_size;

        if i64::from(percent) > self.last_update || done {
            self.last_update = i64::from(percent);
            self.finished = done;
            (self.callback)(ProgressEvent {
                percent,
                bytes_transferred: transferred,
                total_bytes: self.total_size,
                elapsed: self.start_time.elapsed(),
                done,
            });
        }
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.record(n);
        }
        Ok(n)
    }
}
