// ── Local state persistence ──
//
// `load` never fails: a missing file is a fresh state, and a corrupt one
// is logged and replaced by defaults on the next save.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::LocalState;

/// Durable storage for [`LocalState`].
pub trait StateStore: Send + Sync + fmt::Debug {
    fn load(&self) -> LocalState;

    fn save(&self, state: &LocalState) -> Result<(), CoreError>;
}

// ── File-backed ─────────────────────────────────────────────────────

/// One pretty-printed JSON document, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persistence_error(&self, reason: impl fmt::Display) -> CoreError {
        CoreError::Persistence {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> LocalState {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no local state yet");
                return LocalState::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot read local state, using defaults");
                return LocalState::default();
            }
        };

        let (state, parsed) = LocalState::from_json_lenient(&raw);
        if !parsed {
            warn!(path = %self.path.display(), "local state is corrupt, using defaults");
        }
        state
    }

    fn save(&self, state: &LocalState) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.persistence_error(e))?;
        }
        let json = serde_json::to_vec_pretty(state).map_err(|e| self.persistence_error(e))?;

        // Atomic write: temp file + rename.
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, json).map_err(|e| self.persistence_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.persistence_error(e))?;

        debug!(path = %self.path.display(), "local state saved");
        Ok(())
    }
}

// ── In-memory ───────────────────────────────────────────────────────

/// Non-durable store for tests and one-off sessions.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    state: Mutex<LocalState>,
}

impl MemoryStateStore {
    pub fn new(state: LocalState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// The last saved state.
    pub fn snapshot(&self) -> LocalState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> LocalState {
        self.snapshot()
    }

    fn save(&self, state: &LocalState) -> Result<(), CoreError> {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state.clone();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> LocalState {
        let mut state = LocalState::default();
        state.quota.guest_uses_remaining = 1;
        state.quota.daily_ads_watched = 3;
        state.session_cookie = Some("session=abc".into());
        state
    }

    #[test]
    fn missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join("state.json"));
        assert_eq!(store.load(), LocalState::default());
    }

    #[test]
    fn save_creates_parents_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join("nested/deeper/state.json"));

        store.save(&sample()).unwrap();

        assert_eq!(store.load(), sample());
        assert!(!dir.path().join("nested/deeper/state.json.tmp").exists());
    }

    #[test]
    fn corrupt_file_loads_default_and_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{{{ not json").unwrap();
        let store = FileStateStore::new(&path);

        assert_eq!(store.load(), LocalState::default());

        store.save(&sample()).unwrap();
        assert_eq!(store.load(), sample());
    }

    #[test]
    fn memory_store_keeps_last_save() {
        let store = MemoryStateStore::default();
        store.save(&sample()).unwrap();
        assert_eq!(store.load(), sample());
        assert_eq!(store.snapshot(), sample());
    }
}
