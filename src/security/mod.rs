//! Security utilities.
//!
//! Keeps bearer tokens and encryption keys out of logs and error output.

pub mod credential_scrubber;

pub use credential_scrubber::{scrub_credentials, scrub_secrets};
