use std::{
    fs::{self, OpenOptions, rename, write},
    path::PathBuf,
};

use fs2::FileExt;
use uuid::Uuid;

use crate::storage::{KvStore, StorageError};

/// One `<key>.json` file per key under a data directory. Writes go to a
/// unique temp file and are renamed into place under an exclusive lock,
/// so a crashed write never leaves a half-written blob behind.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn lock_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.lock"))
    }
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.key_path(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed {
                key: key.to_string(),
                path,
                source: e,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.key_path(key);

        fs::create_dir_all(&self.dir).map_err(|e| StorageError::WriteFailed {
            key: key.to_string(),
            path: self.dir.clone(),
            source: e,
        })?;

        let unique_temp = format!("{}.tmp.{}", path.display(), Uuid::new_v4());
        let temp_path = PathBuf::from(&unique_temp);
        write(&temp_path, value).map_err(|e| StorageError::WriteFailed {
            key: key.to_string(),
            path: temp_path.clone(),
            source: e,
        })?;

        let lock_file_path = self.lock_path(key);
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_file_path)
            .map_err(|e| StorageError::WriteFailed {
                key: key.to_string(),
                path: lock_file_path.clone(),
                source: e,
            })?;
        lock_file
            .lock_exclusive()
            .map_err(|e| StorageError::WriteFailed {
                key: key.to_string(),
                path: lock_file_path,
                source: e,
            })?;

        rename(&temp_path, &path).map_err(|e| StorageError::WriteFailed {
            key: key.to_string(),
            path: path.clone(),
            source: e,
        })?;

        lock_file.unlock().map_err(|e| StorageError::WriteFailed {
            key: key.to_string(),
            path,
            source: e,
        })?;

        Ok(())
    }

    fn remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        for key in keys {
            let path = self.key_path(key);
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(StorageError::RemoveFailed {
                        key: key.to_string(),
                        path,
                        source: e,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_dir(name: &str) -> PathBuf {
        let dir = PathBuf::from("/tmp").join(name);
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_set_and_get() {
        let store = JsonFileStore::new(fresh_dir("wrenchlog_json_set_get"));

        store.set("vehicles", r#"[{"id":1}]"#).unwrap();

        assert_eq!(store.get("vehicles").unwrap().unwrap(), r#"[{"id":1}]"#);
    }

    #[test]
    fn test_get_missing_key_is_none() {
        let store = JsonFileStore::new(fresh_dir("wrenchlog_json_missing"));

        assert!(store.get("never_written").unwrap().is_none());
    }

    #[test]
    fn test_set_overwrites_previous_value() {
        let store = JsonFileStore::new(fresh_dir("wrenchlog_json_overwrite"));

        store.set("tasks", "[1]").unwrap();
        store.set("tasks", "[1,2]").unwrap();

        assert_eq!(store.get("tasks").unwrap().unwrap(), "[1,2]");
    }

    #[test]
    fn test_remove_skips_missing_keys() {
        let store = JsonFileStore::new(fresh_dir("wrenchlog_json_remove"));

        store.set("a", "1").unwrap();
        store.remove(&["a", "b"]).unwrap();

        assert!(store.get("a").unwrap().is_none());
    }
}
