use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::cloud::UploadStrategy;

/// Command-line arguments for the snapshot uploader.
///
/// Values given here override the config file and the
/// `SNAPSHOT_UPLOAD_*` environment variables.
#[derive(Parser, Debug)]
#[clap(name = "snapshot-upload", about = "Upload a database snapshot to HTTP storage")]
pub struct Args {
    /// Snapshot file to upload
    pub file: PathBuf,

    /// Base URL of the storage endpoint
    #[clap(short, long)]
    pub endpoint: Option<String>,

    /// Bearer token for the storage endpoint
    #[clap(long)]
    pub token: Option<String>,

    /// Encryption cipher name forwarded to the endpoint
    #[clap(long)]
    pub cipher: Option<String>,

    /// Base64 encoded encryption key forwarded to the endpoint
    #[clap(long)]
    pub encryption_key: Option<String>,

    /// Upload mode
    #[clap(short, long, value_enum, default_value = "auto")]
    pub mode: UploadMode,

    /// Files larger than this use multipart in auto mode (in MB)
    #[clap(long)]
    pub multipart_threshold: Option<u64>,

    /// Request timeout in seconds (0 disables)
    #[clap(long)]
    pub timeout: Option<u64>,

    /// Path to configuration YAML file
    #[clap(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[clap(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UploadMode {
    Auto,
    Single,
    Multipart,
}

impl UploadMode {
    pub fn strategy(self, threshold_bytes: u64) -> UploadStrategy {
        match self {
            UploadMode::Auto => UploadStrategy::Auto { threshold: threshold_bytes },
            UploadMode::Single => UploadStrategy::SinglePart,
            UploadMode::Multipart => UploadStrategy::Multipart,
        }
    }
}
