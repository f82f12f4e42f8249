use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DashboardError, Result};
use crate::settings::Settings;
use crate::state::{AppState, Tab, SCHEMA_VERSION};

/// Single key under which the whole dashboard is stored.
pub const STORAGE_KEY: &str = "modernHomepage";

/// Durable key-value backend for the persisted document.
pub trait StateStorage {
    /// `Ok(None)` when nothing was ever stored under `key`.
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StateStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let tmp_path = path.with_extension("tmp");

        fs::create_dir_all(&self.dir)?;

        // Write to tmp, then rename, so a crash never leaves a half-written file.
        fs::write(&tmp_path, value)?;
        fs::rename(tmp_path, path)?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// In-process backend, used by tests and embedders without a disk.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| DashboardError::Storage(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| DashboardError::Storage(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| DashboardError::Storage(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistedStateRef<'a> {
    tabs: &'a [Tab],
    active_tab_id: Option<&'a str>,
    settings: &'a Settings,
    version: &'static str,
    last_modified: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedState {
    #[serde(default)]
    tabs: Option<Vec<Tab>>,
    #[serde(default)]
    active_tab_id: Option<String>,
    #[serde(default)]
    settings: Option<Value>,
    #[serde(default)]
    version: Option<String>,
}

/// Writes the whole state, stamped with the schema version and `lastModified`.
pub fn try_save<S: StateStorage + ?Sized>(storage: &S, state: &AppState) -> Result<()> {
    let document = PersistedStateRef {
        tabs: &state.tabs,
        active_tab_id: state.active_tab_id.as_deref(),
        settings: &state.settings,
        version: SCHEMA_VERSION,
        last_modified: Utc::now(),
    };
    let json = serde_json::to_string_pretty(&document)?;
    storage.write(STORAGE_KEY, &json)
}

/// Like [`try_save`], but failures are only logged. The in-memory state stays
/// authoritative when the backend is unreachable.
pub fn save<S: StateStorage + ?Sized>(storage: &S, state: &AppState) {
    if let Err(e) = try_save(storage, state) {
        log::error!("[Storage] Failed to save state: {}", e);
    }
}

/// Where a loaded state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Parsed from the stored document.
    Stored,
    /// Nothing stored yet.
    Missing,
    /// The backend or the document could not be read. The stored bytes are
    /// left as they are and should not be overwritten by the empty state.
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub state: AppState,
    pub source: LoadSource,
}

impl Loaded {
    fn empty(source: LoadSource) -> Self {
        Self {
            state: AppState::default(),
            source,
        }
    }
}

/// Reads the stored state and reports how it was obtained. Never fails: a
/// missing key, an unreadable backend or a corrupted document all yield an
/// empty state (no tabs).
///
/// Tabs from older documents without `isDefault` load as ordinary tabs.
/// Settings are applied key by key over the defaults; a value that does not
/// fit its key is dropped without losing the rest of the document.
pub fn load_with_source<S: StateStorage + ?Sized>(storage: &S) -> Loaded {
    let raw = match storage.read(STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Loaded::empty(LoadSource::Missing),
        Err(e) => {
            log::error!("[Storage] Failed to read state, starting empty: {}", e);
            return Loaded::empty(LoadSource::Fallback);
        }
    };

    let persisted = match serde_json::from_str::<PersistedState>(&raw) {
        Ok(persisted) => persisted,
        Err(e) => {
            log::error!("[Storage] Failed to parse stored state, starting empty: {}", e);
            return Loaded::empty(LoadSource::Fallback);
        }
    };

    let Some(tabs) = persisted.tabs else {
        log::warn!("[Storage] Stored document has no tabs, starting empty");
        return Loaded::empty(LoadSource::Fallback);
    };

    if let Some(version) = persisted.version.as_deref() {
        if version != SCHEMA_VERSION {
            log::warn!(
                "[Storage] Stored schema {} differs from {}, loading anyway",
                version,
                SCHEMA_VERSION
            );
        }
    }

    let settings = match persisted.settings {
        Some(Value::Object(map)) => Settings::default().merge_lenient(&map),
        None | Some(Value::Null) => Settings::default(),
        Some(other) => {
            log::warn!("[Storage] Ignoring malformed settings: {}", other);
            Settings::default()
        }
    };

    log::info!("[Storage] Loaded {} tabs", tabs.len());
    Loaded {
        state: AppState {
            tabs,
            active_tab_id: persisted.active_tab_id,
            settings,
        },
        source: LoadSource::Stored,
    }
}

/// [`load_with_source`] without the provenance.
pub fn load<S: StateStorage + ?Sized>(storage: &S) -> AppState {
    load_with_source(storage).state
}
