use crate::{
    models::store::Store,
    repository::Repository,
    storage::{KvStore, StorageError},
};

/// Application state: the live collections plus at most one retained
/// pre-mutation snapshot. The snapshot is depth-1 history, not a stack:
/// taking a new one overwrites the old, and a restore consumes it.
pub struct App {
    pub store: Store,
    snapshot: Option<Store>,
}

impl App {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            snapshot: None,
        }
    }

    /// Rebuild what the previous invocation left behind: the live
    /// collections plus the persisted snapshot, if one survived.
    pub fn load<S: KvStore>(repo: &Repository<S>) -> Self {
        let mut app = Self::new(repo.load_all());
        app.snapshot = repo.load_snapshot();
        app
    }

    /// Capture the current collections, overwriting any previous snapshot.
    /// Called by every mutating operation before it touches anything. The
    /// snapshot is persisted before it is retained, so a later process can
    /// still undo this mutation.
    pub fn take_snapshot<S: KvStore>(
        &mut self,
        repo: &Repository<S>,
    ) -> Result<(), StorageError> {
        let snapshot = self.store.clone();
        repo.save_snapshot(&snapshot)?;
        self.snapshot = Some(snapshot);
        Ok(())
    }

    pub fn snapshot(&self) -> Option<&Store> {
        self.snapshot.as_ref()
    }

    /// Drop the snapshot after a successful restore, in memory and in the
    /// store, so the same action cannot be undone twice.
    pub fn clear_snapshot<S: KvStore>(
        &mut self,
        repo: &Repository<S>,
    ) -> Result<(), StorageError> {
        repo.clear_snapshot()?;
        self.snapshot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::vehicle::Vehicle, storage::memory::MemoryStore};

    #[test]
    fn test_take_snapshot_overwrites_previous_snapshot() {
        let repo = Repository::new(MemoryStore::new());
        let mut app = App::new(Store::default());

        app.take_snapshot(&repo).unwrap();
        app.store.vehicles.push(Vehicle::default());
        app.take_snapshot(&repo).unwrap();

        // The retained snapshot reflects the state before the *second*
        // capture, not the first.
        assert_eq!(app.snapshot().unwrap().vehicles.len(), 1);
        assert_eq!(repo.load_snapshot().unwrap().vehicles.len(), 1);
    }

    #[test]
    fn test_clear_snapshot_prevents_double_restore() {
        let repo = Repository::new(MemoryStore::new());
        let mut app = App::new(Store::default());
        app.take_snapshot(&repo).unwrap();

        app.clear_snapshot(&repo).unwrap();

        assert!(app.snapshot().is_none());
        assert!(repo.load_snapshot().is_none());
    }

    #[test]
    fn test_load_picks_up_a_persisted_snapshot() {
        let repo = Repository::new(MemoryStore::new());
        let mut first = App::new(Store::default());
        first.store.vehicles.push(Vehicle::default());
        first.take_snapshot(&repo).unwrap();

        let second = App::load(&repo);

        assert_eq!(second.snapshot().unwrap().vehicles.len(), 1);
    }
}
