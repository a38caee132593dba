//! Optional TOML settings file read by the CLI.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tc_core::{Radix, VectorKind};

use crate::error::{Result, StoreError};

/// Every key is optional; command-line flags take precedence.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub data_file: Option<PathBuf>,
    pub radix: Option<String>,
    pub vector: Option<String>,
    pub log_level: Option<String>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        let settings: Settings = toml::from_str(&text).map_err(|source| StoreError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        // surface bad tags at load time rather than on first use
        settings.radix()?;
        settings.vector()?;
        tracing::debug!("settings loaded from {}", path.display());
        Ok(settings)
    }

    pub fn radix(&self) -> Result<Option<Radix>> {
        let Some(tag) = self.radix.as_deref() else {
            return Ok(None);
        };
        let mut chars = tag.chars();
        match (chars.next().and_then(Radix::from_tag), chars.next()) {
            (Some(radix), None) => Ok(Some(radix)),
            _ => Err(StoreError::InvalidData(format!(
                "radix must be one of b, q, d; found {tag:?}"
            ))),
        }
    }

    pub fn vector(&self) -> Result<Option<VectorKind>> {
        self.vector
            .as_deref()
            .map(|tag| {
                VectorKind::from_tag(tag).ok_or_else(|| {
                    StoreError::InvalidData(format!("vector must be cc or tc; found {tag:?}"))
                })
            })
            .transpose()
    }
}
