/// Save-slot persistence. Whole-state snapshots are written and read back as one document.

use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::core::data::{DocumentFormat, FormatError};
use crate::schema::player::PlayerState;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt snapshot: {0}")]
    Format(#[from] FormatError),
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Write `state` to `path`, creating parent directories as needed.
pub fn save_snapshot(path: &Path, state: &PlayerState) -> Result<(), PersistError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let contents = DocumentFormat::from_path(path).write(state)?;
    std::fs::write(path, contents)?;
    info!(path = %path.display(), day = state.day, "game saved");
    Ok(())
}

/// Read a snapshot. `Ok(None)` means there is no save at `path`.
pub fn load_snapshot(path: &Path) -> Result<Option<PlayerState>, PersistError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)?;
    let state: PlayerState = DocumentFormat::from_path(path).parse(&contents)?;
    if let Some(problem) = state.invariant_violation() {
        return Err(PersistError::InvalidSnapshot(problem));
    }
    info!(path = %path.display(), day = state.day, "game loaded");
    Ok(Some(state))
}
