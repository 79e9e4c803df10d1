//! Configuration loading and validation for `sealctl`.
//!
//! Values come from environment variables. The key is never accepted on the
//! command line so it does not end up in shell history or process listings.

use anyhow::{Context, Result};
use codec::FieldKey;
use serde::Deserialize;

/// Validated `sealctl` configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Standard-base64 key of 16, 24 or 32 bytes. **Required.**
    pub field_key: String,

    /// Tracing log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".into()
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("field_key", &"[REDACTED]")
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load and validate configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build sealctl configuration")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise sealctl configuration")?;

        c.validate()?;
        Ok(c)
    }

    fn validate(&self) -> Result<()> {
        if self.field_key.trim().is_empty() {
            anyhow::bail!("FIELD_KEY is required and must not be empty");
        }
        self.key()?;
        Ok(())
    }

    /// Decode the configured key.
    pub fn key(&self) -> Result<FieldKey> {
        FieldKey::from_base64(&self.field_key).context("FIELD_KEY is not a valid key")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(field_key: &str) -> Config {
        Config {
            field_key: field_key.into(),
            log_level: default_log_level(),
        }
    }

    #[test]
    fn defaults() {
        assert_eq!(default_log_level(), "warn");
    }

    #[test]
    fn validate_rejects_empty_key() {
        assert!(cfg("  ").validate().is_err());
    }

    #[test]
    fn validate_rejects_wrong_key_length() {
        // 8 bytes
        assert!(cfg("AAAAAAAAAAA=").validate().is_err());
    }

    #[test]
    fn validate_accepts_aes128_key() {
        // 16 bytes
        let c = cfg("AAAAAAAAAAAAAAAAAAAAAA==");
        assert!(c.validate().is_ok());
        assert_eq!(c.key().unwrap().len(), 16);
    }

    #[test]
    fn debug_hides_key() {
        let c = cfg("AAAAAAAAAAAAAAAAAAAAAA==");
        assert!(!format!("{c:?}").contains("AAAA"));
    }
}
