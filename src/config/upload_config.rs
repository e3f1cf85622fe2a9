use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MULTIPART_THRESHOLD_MB, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::models::Encryption;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct EncryptionConfig {
    pub cipher: String,
    pub key: String,
}

/// Settings for talking to the storage endpoint.
///
/// Layered as YAML file, then environment, then command line; each layer
/// overrides only the values it sets.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub encryption: Option<EncryptionConfig>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_multipart_threshold_mb")]
    pub multipart_threshold_mb: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_multipart_threshold_mb() -> u64 {
    DEFAULT_MULTIPART_THRESHOLD_MB
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            auth_token: None,
            encryption: None,
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            multipart_threshold_mb: DEFAULT_MULTIPART_THRESHOLD_MB,
        }
    }
}

impl UploadConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: UploadConfig = serde_yaml::from_str(&content)
            .context("Failed to parse YAML config")?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Set the cipher and/or key, keeping whichever half is not given.
    pub fn set_encryption(&mut self, cipher: Option<String>, key: Option<String>) {
        if cipher.is_none() && key.is_none() {
            return;
        }
        let current = self.encryption.take().unwrap_or(EncryptionConfig {
            cipher: String::new(),
            key: String::new(),
        });
        self.encryption = Some(EncryptionConfig {
            cipher: cipher.unwrap_or(current.cipher),
            key: key.unwrap_or(current.key),
        });
    }

    /// Check the settings are usable before any file is opened.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            bail!("No storage endpoint configured");
        }
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            bail!("Endpoint must be an http:// or https:// URL: {}", self.endpoint);
        }

        if let Some(enc) = &self.encryption {
            match (enc.cipher.is_empty(), enc.key.is_empty()) {
                (false, false) => {
                    STANDARD.decode(&enc.key)
                        .map_err(|e| anyhow!("Encryption key is not valid base64: {}", e))?;
                }
                (true, true) => {}
                (true, false) => bail!("Encryption key given without a cipher"),
                (false, true) => bail!("Encryption cipher given without a key"),
            }
        }

        Ok(())
    }

    /// Per-request timeout; `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn multipart_threshold_bytes(&self) -> u64 {
        self.multipart_threshold_mb.saturating_mul(1024 * 1024)
    }

    /// Encryption to apply to uploads, if both halves are set.
    pub fn encryption(&self) -> Option<Encryption> {
        self.encryption
            .as_ref()
            .map(|enc| Encryption::new(enc.cipher.clone(), enc.key.clone()))
            .filter(Encryption::is_complete)
    }
}
