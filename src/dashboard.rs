// Owning component: one AppState plus the storage it is persisted to.
// Each successful mutation is saved before the call returns.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::error::Result;
use crate::modules::deletion::TabDeletion;
use crate::modules::quick_links::QuickLinkStore;
use crate::modules::tabs::TabStore;
use crate::modules::transfer;
use crate::settings::Settings;
use crate::state::{AppState, QuickLink, SharedDashboard, Tab};
use crate::storage::{self, LoadSource, Loaded, StateStorage};

pub struct Dashboard<S: StateStorage> {
    state: AppState,
    storage: S,
}

impl<S: StateStorage> Dashboard<S> {
    /// Startup flow: load, recreate missing default tabs, repair the active
    /// tab, then write the repaired state back.
    ///
    /// When the stored document could not be read, the fresh state is kept in
    /// memory only and the stored bytes stay on disk until the next mutation.
    pub fn open(storage: S) -> Self {
        let Loaded { state, source } = storage::load_with_source(&storage);
        let mut dashboard = Self { state, storage };
        dashboard.repair();
        if source == LoadSource::Fallback {
            log::warn!("[Dashboard] Stored state unreadable, not overwriting it on startup");
        } else {
            dashboard.save();
        }
        dashboard
    }

    /// Wraps an existing state as-is, without startup repair or saving.
    pub fn with_state(state: AppState, storage: S) -> Self {
        Self { state, storage }
    }

    pub fn into_shared(self) -> SharedDashboard<S> {
        Arc::new(Mutex::new(self))
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.state.active_tab()
    }

    pub fn display_order(&self) -> Vec<&Tab> {
        crate::modules::ordering::display_indices(&self.state.tabs)
            .into_iter()
            .map(|i| &self.state.tabs[i])
            .collect()
    }

    pub fn save(&self) {
        storage::save(&self.storage, &self.state);
    }

    fn repair(&mut self) -> bool {
        let mut tabs = TabStore::new(&mut self.state);
        let reconciled = tabs.reconcile_defaults();
        let activated = tabs.ensure_active();
        reconciled || activated
    }

    fn saved<T>(&self, result: T, changed: bool) -> T {
        if changed {
            self.save();
        }
        result
    }

    // Tabs

    pub fn create_tab(&mut self, name: &str, set_active: bool) -> Tab {
        let tab = TabStore::new(&mut self.state).create(name, set_active, false);
        self.saved(tab, true)
    }

    pub fn reconcile_defaults(&mut self) -> bool {
        let changed = TabStore::new(&mut self.state).reconcile_defaults();
        self.saved(changed, changed)
    }

    pub fn delete_tab(&mut self, id: &str) -> bool {
        let deleted = TabStore::new(&mut self.state).delete(id);
        self.saved(deleted, deleted)
    }

    /// First step of the confirmation flow; see [`TabDeletion`].
    pub fn request_tab_deletion(&mut self, id: &str) -> TabDeletion {
        let outcome = TabDeletion::request(&mut self.state, id);
        let changed = matches!(outcome, TabDeletion::Deleted { .. });
        self.saved(outcome, changed)
    }

    pub fn confirm_tab_deletion(&mut self, pending: TabDeletion) -> TabDeletion {
        let outcome = pending.confirm(&mut self.state);
        let changed = matches!(outcome, TabDeletion::Deleted { .. });
        self.saved(outcome, changed)
    }

    pub fn rename_tab(&mut self, id: &str, new_name: &str) -> bool {
        let renamed = TabStore::new(&mut self.state).rename(id, new_name);
        self.saved(renamed, renamed)
    }

    pub fn toggle_pin(&mut self, id: &str) -> bool {
        let toggled = TabStore::new(&mut self.state).toggle_pin(id);
        self.saved(toggled, toggled)
    }

    pub fn duplicate_tab(&mut self, id: &str) -> Option<Tab> {
        let copy = TabStore::new(&mut self.state).duplicate(id);
        let changed = copy.is_some();
        self.saved(copy, changed)
    }

    pub fn reorder_tab(&mut self, from: usize, to: usize) -> bool {
        let moved = TabStore::new(&mut self.state).reorder(from, to);
        self.saved(moved, moved)
    }

    pub fn move_tab_in_display(&mut self, from_display: usize, to_display: usize) -> bool {
        let moved = TabStore::new(&mut self.state).move_in_display(from_display, to_display);
        self.saved(moved, moved)
    }

    pub fn set_active(&mut self, id: &str) -> bool {
        let switched = TabStore::new(&mut self.state).set_active(id);
        self.saved(switched, switched)
    }

    // Quick links, on the active tab

    pub fn add_link(&mut self, title: &str, url: &str) -> Option<QuickLink> {
        let link = QuickLinkStore::new(&mut self.state).add(title, url);
        let changed = link.is_some();
        self.saved(link, changed)
    }

    /// Adds to an explicit tab instead of the active one.
    pub fn add_link_to(&mut self, tab_id: &str, title: &str, url: &str) -> Option<QuickLink> {
        let link = QuickLinkStore::for_tab(&mut self.state, tab_id).add(title, url);
        let changed = link.is_some();
        self.saved(link, changed)
    }

    pub fn edit_link(&mut self, id: &str, title: &str, url: &str) -> bool {
        let edited = QuickLinkStore::new(&mut self.state).edit(id, title, url);
        self.saved(edited, edited)
    }

    pub fn delete_link(&mut self, id: &str) -> bool {
        let deleted = QuickLinkStore::new(&mut self.state).delete(id);
        self.saved(deleted, deleted)
    }

    pub fn duplicate_link(&mut self, id: &str) -> Option<QuickLink> {
        let copy = QuickLinkStore::new(&mut self.state).duplicate(id);
        let changed = copy.is_some();
        self.saved(copy, changed)
    }

    pub fn reorder_link(&mut self, from: usize, to: usize) -> bool {
        let moved = QuickLinkStore::new(&mut self.state).reorder(from, to);
        self.saved(moved, moved)
    }

    // Settings

    pub fn update_setting(&mut self, key: &str, value: Value) -> bool {
        let updated = self.state.settings.set(key, value);
        self.saved(updated, updated)
    }

    pub fn reset_settings(&mut self) {
        self.state.settings.reset();
        self.save();
    }

    /// Drops every tab and setting, then rebuilds the default tabs.
    pub fn reset_to_default(&mut self) {
        self.state = AppState::default();
        self.repair();
        self.save();
        log::info!("[Dashboard] Reset to defaults");
    }

    // Backup

    pub fn export_document(&self) -> Result<String> {
        transfer::export_state(&self.state)
    }

    pub fn write_backup(&self, dir: &Path) -> Result<PathBuf> {
        transfer::write_backup(dir, &self.state)
    }

    /// Replaces the whole state with a backup document. The caller must have
    /// obtained the user's confirmation. On error nothing changes.
    pub fn import(&mut self, document: &str) -> Result<()> {
        let imported = transfer::import_state(&self.state, document)?;
        self.replace_with(imported);
        Ok(())
    }

    pub fn import_file(&mut self, path: &Path) -> Result<()> {
        let imported = transfer::read_backup(&self.state, path)?;
        self.replace_with(imported);
        Ok(())
    }

    fn replace_with(&mut self, imported: AppState) {
        self.state = imported;
        self.repair();
        self.save();
        log::info!("[Dashboard] Imported {} tabs", self.state.tabs.len());
    }
}
