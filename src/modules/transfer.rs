// Backup export and import.
//
// Import is destructive and all-or-nothing: the document is fully validated
// into a new AppState before anything replaces the caller's state.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::{DashboardError, Result};
use crate::settings::Settings;
use crate::state::{AppState, Tab, SCHEMA_VERSION};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument<'a> {
    tabs: &'a [Tab],
    active_tab_id: Option<&'a str>,
    settings: &'a Settings,
    export_date: DateTime<Utc>,
    version: &'static str,
}

/// Pretty-printed backup document for `state`.
pub fn export_state(state: &AppState) -> Result<String> {
    let document = ExportDocument {
        tabs: &state.tabs,
        active_tab_id: state.active_tab_id.as_deref(),
        settings: &state.settings,
        export_date: Utc::now(),
        version: SCHEMA_VERSION,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// `modern-homepage-backup-YYYY-MM-DD.json`
pub fn backup_file_name(date: DateTime<Utc>) -> String {
    format!("modern-homepage-backup-{}.json", date.format("%Y-%m-%d"))
}

/// Builds the state a backup document describes, on top of `current`.
///
/// `tabs` must be a list of tabs. Settings are merged key by key over the
/// current ones. The document's active id is kept only if it names one of the
/// imported tabs; otherwise the first imported tab (or none) becomes active.
pub fn import_state(current: &AppState, document: &str) -> Result<AppState> {
    let document: Value = serde_json::from_str(document)
        .map_err(|e| DashboardError::InvalidFormat(format!("not JSON: {}", e)))?;

    let raw_tabs = match document.get("tabs") {
        Some(tabs @ Value::Array(_)) => tabs.clone(),
        _ => return Err(DashboardError::InvalidFormat("tabs must be a list".to_string())),
    };
    let tabs: Vec<Tab> = serde_json::from_value(raw_tabs)
        .map_err(|e| DashboardError::InvalidFormat(format!("bad tab: {}", e)))?;

    let settings = match document.get("settings") {
        Some(Value::Object(overrides)) => current
            .settings
            .merge(overrides)
            .map_err(|e| DashboardError::InvalidFormat(format!("bad settings: {}", e)))?,
        _ => current.settings.clone(),
    };

    let requested = document.get("activeTabId").and_then(Value::as_str);
    let active_tab_id = match requested {
        Some(id) if tabs.iter().any(|t| t.id == id) => Some(id.to_string()),
        _ => tabs.first().map(|t| t.id.clone()),
    };

    log::info!("[Transfer] Parsed backup with {} tabs", tabs.len());
    Ok(AppState {
        tabs,
        active_tab_id,
        settings,
    })
}

/// Writes a dated backup file into `dir` and returns its path.
pub fn write_backup(dir: &Path, state: &AppState) -> Result<PathBuf> {
    let path = dir.join(backup_file_name(Utc::now()));
    fs::create_dir_all(dir)?;
    fs::write(&path, export_state(state)?)?;

    log::info!("[Transfer] Exported backup to {}", path.display());
    Ok(path)
}

pub fn read_backup(current: &AppState, path: &Path) -> Result<AppState> {
    let content = fs::read_to_string(path)?;
    import_state(current, &content)
}
