//! # snapshot-upload
//!
//! Uploads a local database snapshot to a remote HTTP storage endpoint,
//! either as one streamed request or as a negotiated sequence of fixed-size
//! chunks, while reporting continuous progress to the caller.
//!
//! ## Overview
//!
//! - **Single-part**: the whole file is streamed from disk in one
//!   `POST /v1/upload` request.
//! - **Multipart**: the endpoint picks a chunk size, the file is sent as
//!   sequential byte ranges, then the session is finalized.
//! - **Progress**: one callback per whole-percentage increase, continuous
//!   across chunk requests, ending with exactly one `done` event at 100%.
//! - **Errors**: every failure names its stage, and the chunk index and HTTP
//!   status where applicable. Nothing is retried.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use snapshot_upload::cloud::client::HttpClient;
//! use snapshot_upload::cloud::single_part::upload_single_part;
//! use snapshot_upload::models::{ProgressEvent, UploadTarget};
//!
//! # fn main() -> anyhow::Result<()> {
//! let client = HttpClient::new("https://db.example.com", None, None)?;
//! let target = UploadTarget::new("/var/backups/app.db")
//!     .with_encryption("aes256gcm", "c2VjcmV0LWtleQ==");
//!
//! upload_single_part(&client, &target, Arc::new(|event: ProgressEvent| {
//!     if event.done {
//!         println!("sent {} bytes", event.total_bytes);
//!     }
//! }))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`cloud`]: progress reader, transport seam and both uploaders
//! - [`models`]: upload target, chunk and progress event types
//! - [`config`]: YAML/environment configuration for the binary
//! - [`security`]: credential scrubbing for logs and errors
//! - [`cli`]: command-line interface definitions
//! - [`constants`]: endpoint paths, header names and defaults

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Snapshot upload: progress reader, HTTP transport and uploaders
pub mod cloud;

/// Configuration management
pub mod config;

/// Application constants
pub mod constants;

/// Core data models
pub mod models;

/// Credential scrubbing
pub mod security;
