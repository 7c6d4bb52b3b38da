//! JSON persistence for the bridge state
//!
//! The whole [`PersistedState`] lives in a single file (`/data/state.json`
//! inside the add-on container). Reads never fail: a missing or damaged file
//! yields the default state. Writes serialize fully in memory, go to a
//! sibling temp file and are then renamed over the target, so a failed write
//! leaves the previous content in place.

use rp_core::PersistedState;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, error, info, warn};

/// Where the add-on keeps its state
pub const DEFAULT_STATE_PATH: &str = "/data/state.json";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Handle to the state file
///
/// Cheap to clone. There is no in-memory copy: every operation goes to disk,
/// so concurrent handlers see each other's writes (last writer wins).
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Create a store backed by the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the state file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "state.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Read the state file
    ///
    /// Returns `None` if the file doesn't exist.
    pub async fn try_load(&self) -> StorageResult<Option<PersistedState>> {
        if !self.path.exists() {
            debug!("State file not found: {:?}", self.path);
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).await?;
        let state: PersistedState = serde_json::from_str(&content)?;

        debug!("Loaded state file: {:?}", self.path);
        Ok(Some(state))
    }

    /// Read the state file, falling back to the default state on any error
    pub async fn load(&self) -> PersistedState {
        match self.try_load().await {
            Ok(Some(state)) => state,
            Ok(None) => PersistedState::default(),
            Err(e) => {
                error!("Failed to read state file {:?}, using defaults: {}", self.path, e);
                PersistedState::default()
            }
        }
    }

    /// Write the full state
    ///
    /// Writes atomically by first writing to a temp file, then renaming.
    pub async fn save(&self, state: &PersistedState) -> StorageResult<()> {
        // Serialize with pretty printing for readability
        let content = serde_json::to_string_pretty(state)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await?;
                debug!("Created state directory: {:?}", parent);
            }
        }

        let temp_path = self.temp_path();
        fs::write(&temp_path, &content).await?;

        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            if let Err(cleanup) = fs::remove_file(&temp_path).await {
                warn!("Failed to remove temp file {:?}: {}", temp_path, cleanup);
            }
            return Err(e.into());
        }

        debug!("Saved state file: {:?}", self.path);
        Ok(())
    }

    /// Reload, apply one mutation, and write the result back
    ///
    /// Reloading first keeps writes from other handlers that landed since
    /// this one last looked at the file.
    pub async fn update<F>(&self, mutate: F) -> StorageResult<PersistedState>
    where
        F: FnOnce(&mut PersistedState),
    {
        let mut state = self.load().await;
        mutate(&mut state);
        self.save(&state).await?;
        info!("State updated: {:?}", self.path);
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rp_core::{ConnectionOutcome, Credentials, DeviceEntry, DeviceLists};
    use tempfile::TempDir;

    fn sample_state() -> PersistedState {
        PersistedState {
            credentials: Credentials {
                server: "1.2.3.4".to_string(),
                port: 28082,
                account_id: "76561198000000000".to_string(),
                session_token: "-42".to_string(),
            },
            devices: DeviceLists {
                switches: vec![DeviceEntry {
                    name: "Base Lights".to_string(),
                    entity_id: 123,
                }],
                alarms: vec![],
                cameras: vec![DeviceEntry {
                    name: "Gate".to_string(),
                    entity_id: 9,
                }],
            },
            connection: ConnectionOutcome::failure("timed out"),
        }
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = StateStore::new(temp_dir.path().join("state.json"));
        let state = sample_state();

        store.save(&state).await.unwrap();

        assert_eq!(store.load().await, state);
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn test_missing_file_loads_default() {
        let temp_dir = TempDir::new().unwrap();
        let store = StateStore::new(temp_dir.path().join("state.json"));

        assert!(store.try_load().await.unwrap().is_none());
        assert_eq!(store.load().await, PersistedState::default());
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");
        std::fs::write(&path, "{ truncated").unwrap();
        let store = StateStore::new(&path);

        assert!(matches!(store.try_load().await, Err(StorageError::Json(_))));
        assert_eq!(store.load().await, PersistedState::default());
    }

    #[tokio::test]
    async fn test_save_creates_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = StateStore::new(temp_dir.path().join("data").join("state.json"));

        store.save(&sample_state()).await.unwrap();
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_previous_content() {
        let temp_dir = TempDir::new().unwrap();
        let store = StateStore::new(temp_dir.path().join("state.json"));
        let original = sample_state();
        store.save(&original).await.unwrap();

        // A directory squatting on the temp path makes the write fail
        std::fs::create_dir(store.temp_path()).unwrap();

        let result = store.save(&PersistedState::default()).await;
        assert!(matches!(result, Err(StorageError::Io(_))));
        assert_eq!(store.load().await, original);
    }

    #[tokio::test]
    async fn test_update_reloads_before_mutating() {
        let temp_dir = TempDir::new().unwrap();
        let store = StateStore::new(temp_dir.path().join("state.json"));
        let other = store.clone();

        store.save(&sample_state()).await.unwrap();

        // Another handle replaces the devices; this one only touches the outcome
        other
            .update(|s| s.devices = DeviceLists::default())
            .await
            .unwrap();
        let updated = store
            .update(|s| s.connection = ConnectionOutcome::success())
            .await
            .unwrap();

        assert!(updated.devices.is_empty());
        assert!(updated.connection.ok);
        assert_eq!(updated.credentials, sample_state().credentials);
        assert_eq!(store.load().await, updated);
    }
}
