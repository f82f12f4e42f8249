// Data model shared by the stores, the storage layer and the codec.
// Field names follow the persisted document (camelCase, `tabs`/`quickLinks`).

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dashboard::Dashboard;
use crate::settings::Settings;

/// Reserved names of the tabs that always exist, in their fixed leading order.
pub const DEFAULT_TAB_NAMES: [&str; 2] = ["Home", "Tools"];
pub const NEW_TAB_NAME: &str = "New Tab";
pub const SCHEMA_VERSION: &str = "1.0.0";

pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuickLink {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl QuickLink {
    pub fn new(title: &str, url: &str) -> Self {
        Self {
            id: new_id(),
            title: title.to_string(),
            url: url.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Same title and url under a fresh identity.
    pub fn duplicate(&self) -> Self {
        Self::new(&self.title, &self.url)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub pinned: bool,
    // Older documents predate default tabs entirely.
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub quick_links: Vec<QuickLink>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Tab {
    pub fn new(name: &str, is_default: bool) -> Self {
        Self {
            id: new_id(),
            name: name.to_string(),
            pinned: false,
            is_default,
            quick_links: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Rename, pin and move are refused while this returns true.
    pub fn is_locked(&self) -> bool {
        self.is_default || self.pinned
    }

    /// Position of this tab's name among the reserved default names, if it is one.
    pub fn reserved_rank(&self) -> Option<usize> {
        DEFAULT_TAB_NAMES.iter().position(|n| *n == self.name)
    }
}

/// The whole in-memory state of the dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    /// Canonical (manual) order. Display order is derived, never stored.
    pub tabs: Vec<Tab>,
    pub active_tab_id: Option<String>,
    pub settings: Settings,
}

impl AppState {
    pub fn tab(&self, id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    pub fn tab_mut(&mut self, id: &str) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id == id)
    }

    pub fn tab_index(&self, id: &str) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == id)
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.active_tab_id.as_deref().and_then(|id| self.tab(id))
    }

    pub fn default_tab_count(&self) -> usize {
        self.tabs.iter().filter(|t| t.is_default).count()
    }

    /// True when the active id is either a live tab, or null with no tabs at all.
    pub fn active_is_valid(&self) -> bool {
        match self.active_tab_id.as_deref() {
            Some(id) => self.tab(id).is_some(),
            None => self.tabs.is_empty(),
        }
    }
}

/// A dashboard shared between concurrent callers. Every operation takes the
/// single lock for its whole read-modify-write.
pub type SharedDashboard<S> = Arc<Mutex<Dashboard<S>>>;
