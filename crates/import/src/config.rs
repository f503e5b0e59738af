//! Import configuration.
//!
//! Loaded from TOML:
//!
//! ```toml
//! parallelism = 4
//!
//! [[target]]
//! address = "acme_widget.web"
//! id = "w-123"
//!
//! [[target]]
//! address = "module.net.acme_subnet.a[0]"
//! id = "s-9"
//! provider = "provider.acme.west"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_engine::{DEFAULT_MAX_PARALLEL, WalkerConfig};

use crate::error::ConfigError;
use crate::transform::ImportTarget;

/// Settings for one import run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportConfig {
    /// Maximum number of nodes evaluated at once.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,

    /// Objects to import.
    #[serde(default, rename = "target")]
    pub targets: Vec<TargetConfig>,
}

/// One `[[target]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Resource instance address to import into.
    pub address: String,
    /// Remote ID.
    pub id: String,
    /// Provider configuration address; implied from the type when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

fn default_parallelism() -> usize {
    DEFAULT_MAX_PARALLEL
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            parallelism: default_parallelism(),
            targets: Vec::new(),
        }
    }
}

impl ImportConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded import configuration");
        Self::from_toml_str(&content)
    }

    /// Reject values that parse but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parallelism == 0 {
            return Err(ConfigError::Validation {
                message: "parallelism must be at least 1".to_owned(),
            });
        }
        Ok(())
    }

    /// The configured targets, with addresses parsed.
    pub fn targets(&self) -> Result<Vec<ImportTarget>, ConfigError> {
        self.targets
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let addr = entry
                    .address
                    .parse()
                    .map_err(|source| ConfigError::InvalidAddress {
                        index,
                        address: entry.address.clone(),
                        source,
                    })?;
                let target = ImportTarget::new(addr, entry.id.clone());
                match &entry.provider {
                    None => Ok(target),
                    Some(provider) => {
                        let provider_addr =
                            provider
                                .parse()
                                .map_err(|source| ConfigError::InvalidProvider {
                                    index,
                                    provider: provider.clone(),
                                    source,
                                })?;
                        Ok(target.with_provider(provider_addr))
                    }
                }
            })
            .collect()
    }

    /// Walker settings derived from this configuration.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig {
            max_parallel: self.parallelism,
        }
    }
}
