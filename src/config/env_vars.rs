use log::debug;

use crate::config::UploadConfig;
use crate::constants::{ENV_CIPHER, ENV_ENDPOINT, ENV_KEY, ENV_TOKEN};

/// Read a variable, treating unset and empty the same way.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

/// Apply `SNAPSHOT_UPLOAD_*` environment overrides to `config`.
pub fn apply_env_overrides(config: &mut UploadConfig) {
    apply_overrides_from(config, non_empty_var);
}

/// Apply overrides looked up through `lookup`, so tests need not touch the
/// process environment.
pub fn apply_overrides_from<F>(config: &mut UploadConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(endpoint) = lookup(ENV_ENDPOINT) {
        debug!("Endpoint overridden by {}", ENV_ENDPOINT);
        config.endpoint = endpoint;
    }
    if let Some(token) = lookup(ENV_TOKEN) {
        debug!("Auth token overridden by {}", ENV_TOKEN);
        config.auth_token = Some(token);
    }
    config.set_encryption(lookup(ENV_CIPHER), lookup(ENV_KEY));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let mut config = UploadConfig {
            endpoint: "https://old.example.com".to_string(),
            auth_token: Some("old".to_string()),
            ..Default::default()
        };

        apply_overrides_from(&mut config, lookup_from(&[
            (ENV_ENDPOINT, "https://new.example.com"),
            (ENV_TOKEN, "new"),
        ]));

        assert_eq!(config.endpoint, "https://new.example.com");
        assert_eq!(config.auth_token.as_deref(), Some("new"));
        assert!(config.encryption.is_none());
    }

    #[test]
    fn test_partial_encryption_override_keeps_other_half() {
        let mut config = UploadConfig::default();
        config.set_encryption(Some("aes256gcm".to_string()), Some("b2xk".to_string()));

        apply_overrides_from(&mut config, lookup_from(&[(ENV_KEY, "bmV3")]));

        let enc = config.encryption.unwrap();
        assert_eq!(enc.cipher, "aes256gcm");
        assert_eq!(enc.key, "bmV3");
    }

    #[test]
    fn test_no_overrides_leaves_config_untouched() {
        let mut config = UploadConfig {
            endpoint: "https://db.example.com".to_string(),
            ..Default::default()
        };
        let before = config.clone();
        apply_overrides_from(&mut config, lookup_from(&[]));
        assert_eq!(config, before);
    }
}
