use std::path::{Path, PathBuf};

use super::{Registry, RegistryStore};
use crate::error::AcryptError;

/// registry kept in one JSON file, a missing file is an empty registry.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl RegistryStore for JsonFileStore {
    fn load(&self) -> Result<Registry, AcryptError> {
        if !self.path.is_file() {
            log::debug!("registry `{}` not exist, start empty", self.path.display());
            return Ok(Registry::new());
        }

        let content = std::fs::read_to_string(self.path.as_path())?;
        if content.trim().is_empty() {
            return Ok(Registry::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    fn save(&mut self, registry: &Registry) -> Result<(), AcryptError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }

        // 先写临时文件再重命名, 不会留下写了一半的注册表
        let content = serde_json::to_string_pretty(registry)?;
        let tmp = self.tmp_path();
        std::fs::write(tmp.as_path(), content.as_bytes())?;
        if let Err(e) = std::fs::rename(tmp.as_path(), self.path.as_path()) {
            let _ = std::fs::remove_file(tmp.as_path());
            return Err(e.into());
        }

        log::debug!(
            "saved {} users to `{}`",
            registry.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::UserRecord;
    use crate::ty::KeyTuple;
    use num_bigint::BigUint;

    fn record(blob: &str) -> UserRecord {
        UserRecord {
            public_key: KeyTuple::new(BigUint::from(65537u32), BigUint::from(1000036000099u64)),
            encrypted_private_key: blob.to_string(),
        }
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("none.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("registry.json");
        let mut store = JsonFileStore::new(&path);

        let mut reg = Registry::new();
        reg.insert("alice", record("blob")).unwrap();
        store.save(&reg).unwrap();

        assert_eq!(store.path(), path.as_path());
        assert!(path.is_file());
        assert!(!store.tmp_path().exists());
        assert_eq!(JsonFileStore::new(&path).load().unwrap(), reg);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("1000036000099"));
        assert!(!raw.contains("\"1000036000099\""));
    }

    #[test]
    fn save_replaces_whole_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("registry.json"));

        let mut reg = Registry::new();
        reg.insert("alice", record("a")).unwrap();
        store.save(&reg).unwrap();
        reg.insert("bob", record("b")).unwrap();
        store.save(&reg).unwrap();

        assert_eq!(store.load().unwrap().usernames(), vec!["alice", "bob"]);
    }

    #[test]
    fn invalid_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            JsonFileStore::new(&path).load(),
            Err(AcryptError::Json(_))
        ));

        std::fs::write(&path, "  \n").unwrap();
        assert!(JsonFileStore::new(&path).load().unwrap().is_empty());
    }
}
