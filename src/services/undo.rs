use thiserror::Error;

use crate::{
    repository::Repository,
    state::App,
    storage::{KvStore, StorageError},
};

#[derive(Debug, Error)]
pub enum UndoError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Restore the snapshot taken before the most recent mutation, persisting
/// all five collections from it, then clear the snapshot in memory and in
/// the store so the same action cannot be undone twice. Returns `false`
/// when there is nothing to undo.
pub fn restore_last_snapshot<S: KvStore>(
    app: &mut App,
    repo: &Repository<S>,
) -> Result<bool, UndoError> {
    let Some(snapshot) = app.snapshot().cloned() else {
        return Ok(false);
    };

    repo.save_store(&snapshot)?;
    app.clear_snapshot(repo)?;
    app.store = snapshot;

    Ok(true)
}
