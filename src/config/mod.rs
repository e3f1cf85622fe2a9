mod env_vars;
mod upload_config;

pub use upload_config::{EncryptionConfig, UploadConfig};

pub use env_vars::{apply_env_overrides, apply_overrides_from};

use std::path::Path;

use anyhow::Result;
use log::info;

/// Load the YAML file when given, otherwise start from defaults, then apply
/// environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<UploadConfig> {
    let mut config = match path {
        Some(path) => UploadConfig::from_yaml_file(path)?,
        None => {
            info!("No config file given, using defaults and environment");
            UploadConfig::default()
        }
    };
    apply_env_overrides(&mut config);
    Ok(config)
}
