// Single-slot identity persistence over a JSON file

use std::path::PathBuf;

use async_trait::async_trait;

use credport_core::error::StoreError;
use credport_core::identity::{IdentityStore, UserIdentity};

/// Durable store holding at most one serialized identity record. Every
/// save rewrites the whole record through a temp file and rename, so a
/// reader never observes a partial write.
pub struct JsonIdentityStore {
    path: PathBuf,
}

impl JsonIdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.credport/identity.json`
    pub fn default_path() -> PathBuf {
        PathBuf::from(credport_commons::env::config_dir()).join("identity.json")
    }
}

#[async_trait]
impl IdentityStore for JsonIdentityStore {
    async fn load(&self) -> Result<Option<UserIdentity>, StoreError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => {
                let identity = serde_json::from_slice(&bytes)
                    .map_err(|e| StoreError::backend(format!("corrupt identity record: {e}")))?;
                Ok(Some(identity))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::backend(format!("read identity record: {err}"))),
        }
    }

    async fn save(&self, identity: &UserIdentity) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(identity)
            .map_err(|e| StoreError::backend(format!("encode identity record: {e}")))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::backend(format!("create store directory: {e}")))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, &bytes).map_err(|e| StoreError::backend(format!("write identity record: {e}")))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| StoreError::backend(format!("commit identity record: {e}")))?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::backend(format!("remove identity record: {err}"))),
        }
    }
}
