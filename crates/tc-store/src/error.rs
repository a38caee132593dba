use std::fmt;
use std::path::{Path, PathBuf};

use tc_core::CalcError;

#[derive(Debug)]
pub enum StoreError {
    Io { path: PathBuf, source: std::io::Error },
    Json { path: PathBuf, source: serde_json::Error },
    Toml { path: PathBuf, source: toml::de::Error },
    Calc(CalcError),
    InvalidData(String),
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn json(path: &Path, source: serde_json::Error) -> Self {
        StoreError::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io { path, source } => write!(f, "{}: {source}", path.display()),
            StoreError::Json { path, source } => {
                write!(f, "malformed data file {}: {source}", path.display())
            }
            StoreError::Toml { path, source } => {
                write!(f, "malformed settings file {}: {source}", path.display())
            }
            StoreError::Calc(e) => write!(f, "{e}"),
            StoreError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io { source, .. } => Some(source),
            StoreError::Json { source, .. } => Some(source),
            StoreError::Toml { source, .. } => Some(source),
            StoreError::Calc(e) => Some(e),
            StoreError::InvalidData(_) => None,
        }
    }
}

impl From<CalcError> for StoreError {
    fn from(e: CalcError) -> Self {
        StoreError::Calc(e)
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
