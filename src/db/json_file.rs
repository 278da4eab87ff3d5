use std::io::Write;
use std::path::{Path, PathBuf};

use super::{SlotStorage, StorageError};

/// One `<key>.json` file per slot inside a directory.
///
/// Writes go to a temp file in the same directory and are renamed over
/// the target, so a reader never sees a half-written collection.
pub struct JsonFileSlots {
    dir: PathBuf,
}

impl JsonFileSlots {
    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl SlotStorage for JsonFileSlots {
    fn read_slot(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_slot(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StorageError::Io(e.error))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_none() {
        let tmp = tempfile::tempdir().unwrap();
        let slots = JsonFileSlots::open(tmp.path()).unwrap();
        assert!(slots.read_slot("mediq_appointments").unwrap().is_none());
    }

    #[test]
    fn write_then_read_from_new_handle() {
        let tmp = tempfile::tempdir().unwrap();
        JsonFileSlots::open(tmp.path())
            .unwrap()
            .write_slot("mediq_appointments", "[{\"id\":\"a\"}]")
            .unwrap();

        let reopened = JsonFileSlots::open(tmp.path()).unwrap();
        assert_eq!(
            reopened.read_slot("mediq_appointments").unwrap().as_deref(),
            Some("[{\"id\":\"a\"}]")
        );
        assert!(tmp.path().join("mediq_appointments.json").exists());
    }

    #[test]
    fn overwrite_leaves_no_temp_files() {
        let tmp = tempfile::tempdir().unwrap();
        let slots = JsonFileSlots::open(tmp.path()).unwrap();
        slots.write_slot("k", "[]").unwrap();
        slots.write_slot("k", "[1]").unwrap();
        let entries = std::fs::read_dir(tmp.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn path_like_keys_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let slots = JsonFileSlots::open(tmp.path()).unwrap();
        assert!(matches!(
            slots.write_slot("../escape", "[]"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(slots.read_slot("").is_err());
    }
}
