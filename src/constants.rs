//! Global constants for the snapshot uploader.
//!
//! This module centralizes the endpoint paths, header names and default
//! values so the wire surface is defined in exactly one place.

// Endpoint paths
/// Single-part upload endpoint (POST, streamed body)
pub const SINGLE_PART_UPLOAD_PATH: &str = "/v1/upload";

/// Multipart session start endpoint (PUT, empty body)
pub const MULTIPART_START_PATH: &str = "/v2/upload/start";

/// Multipart chunk endpoint prefix; the chunk index is appended
pub const MULTIPART_CHUNK_PATH: &str = "/v2/upload/chunk";

/// Multipart finalize endpoint (PUT, empty body)
pub const MULTIPART_FINALIZE_PATH: &str = "/v2/upload/finalize";

// Headers
/// Header carrying the encryption cipher name
pub const ENCRYPTION_CIPHER_HEADER: &str = "x-encryption-cipher";

/// Header carrying the base64 encoded encryption key
pub const ENCRYPTION_KEY_HEADER: &str = "x-encryption-key";

// Progress
/// Watermark a fresh progress reader starts from, below any real percentage
pub const PROGRESS_SENTINEL: i64 = -1;

/// Percentage reported when an upload completes
pub const PERCENT_COMPLETE: u8 = 100;

// Defaults
/// Default request timeout in seconds (0 disables the timeout)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Files strictly larger than this use the multipart upload (100MB)
pub const DEFAULT_MULTIPART_THRESHOLD_MB: u64 = 100;

/// Buffer size used when copying file data into a request body (64KB)
pub const UPLOAD_BUFFER_SIZE: usize = 64 * 1024;

// Environment variables
pub const ENV_ENDPOINT: &str = "SNAPSHOT_UPLOAD_ENDPOINT";
pub const ENV_TOKEN: &str = "SNAPSHOT_UPLOAD_TOKEN";
pub const ENV_CIPHER: &str = "SNAPSHOT_UPLOAD_CIPHER";
pub const ENV_KEY: &str = "SNAPSHOT_UPLOAD_KEY";
