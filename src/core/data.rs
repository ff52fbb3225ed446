/// Event and world document loading.
///
/// Documents are RON unless the file extension is `.json`.

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::schema::event::{EventPools, PoolName};
use crate::schema::world::{WorldData, WorldRegistry};

/// Syntax or shape error from either supported document format.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("RON serialization error: {0}")]
    RonWrite(#[from] ron::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("missing data file: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed document {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
}

/// On-disk document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Ron,
    Json,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Ron,
        }
    }

    pub fn parse<T: DeserializeOwned>(&self, input: &str) -> Result<T, FormatError> {
        match self {
            Self::Ron => Ok(ron::from_str(input)?),
            Self::Json => Ok(serde_json::from_str(input)?),
        }
    }

    pub fn write<T: serde::Serialize>(&self, value: &T) -> Result<String, FormatError> {
        match self {
            Self::Ron => Ok(ron::ser::to_string_pretty(
                value,
                ron::ser::PrettyConfig::default(),
            )?),
            Self::Json => Ok(serde_json::to_string_pretty(value)?),
        }
    }
}

/// Read and parse a required document. A missing file is an error.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    if !path.exists() {
        return Err(DataError::MissingFile(path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    DocumentFormat::from_path(path)
        .parse(&contents)
        .map_err(|source| DataError::Malformed {
            path: path.to_path_buf(),
            source,
        })
}

impl EventPools {
    /// Load an event document from a file.
    pub fn load(path: &Path) -> Result<EventPools, DataError> {
        let pools: EventPools = load_document(path)?;
        info!(
            path = %path.display(),
            sea = pools.pool(PoolName::Sea).len(),
            harbor = pools.pool(PoolName::Harbor).len(),
            village = pools.pool(PoolName::Village).len(),
            special = pools.pool(PoolName::Special).len(),
            "loaded event pools"
        );
        Ok(pools)
    }

    /// Parse an event document from a RON string.
    pub fn parse_ron(input: &str) -> Result<EventPools, FormatError> {
        DocumentFormat::Ron.parse(input)
    }
}

impl WorldRegistry {
    /// Load a world document from a file.
    pub fn load(path: &Path) -> Result<WorldRegistry, DataError> {
        let data: WorldData = load_document(path)?;
        info!(
            path = %path.display(),
            ports = data.major_ports.len(),
            villages = data.villages.len(),
            harbor_masters = data.harbor_masters.len(),
            "loaded world"
        );
        Ok(WorldRegistry::new(data))
    }

    /// Parse a world document from a RON string.
    pub fn parse_ron(input: &str) -> Result<WorldRegistry, FormatError> {
        let data: WorldData = DocumentFormat::Ron.parse(input)?;
        Ok(WorldRegistry::new(data))
    }
}
