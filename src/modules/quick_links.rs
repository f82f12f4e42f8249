// Quick link store - operations on the links of a single tab.

use crate::modules::ordering::splice_move;
use crate::state::{AppState, QuickLink, Tab};

/// Prefixes `https://` unless the url already starts with `http://` or `https://`.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Link operations scoped to one tab: the active tab by default, or an
/// explicit one via [`QuickLinkStore::for_tab`]. When the tab does not exist
/// every operation is a no-op.
pub struct QuickLinkStore<'a> {
    state: &'a mut AppState,
    tab_id: Option<String>,
}

impl<'a> QuickLinkStore<'a> {
    pub fn new(state: &'a mut AppState) -> Self {
        let tab_id = state.active_tab_id.clone();
        Self { state, tab_id }
    }

    pub fn for_tab(state: &'a mut AppState, tab_id: &str) -> Self {
        Self {
            state,
            tab_id: Some(tab_id.to_string()),
        }
    }

    fn tab(&self) -> Option<&Tab> {
        self.tab_id.as_deref().and_then(|id| self.state.tab(id))
    }

    fn tab_mut(&mut self) -> Option<&mut Tab> {
        let id = self.tab_id.as_deref()?;
        self.state.tabs.iter_mut().find(|t| t.id == id)
    }

    pub fn links(&self) -> &[QuickLink] {
        self.tab().map(|t| t.quick_links.as_slice()).unwrap_or_default()
    }

    /// Appends a link. Blank title or url is ignored.
    pub fn add(&mut self, title: &str, url: &str) -> Option<QuickLink> {
        let (title, url) = (title.trim(), url.trim());
        if title.is_empty() || url.is_empty() {
            return None;
        }

        let link = QuickLink::new(title, &normalize_url(url));
        let tab = self.tab_mut()?;
        tab.quick_links.push(link.clone());

        log::info!("[QuickLinks] Added '{}' -> {} to tab '{}'", link.title, link.url, tab.name);
        Some(link)
    }

    pub fn edit(&mut self, id: &str, title: &str, url: &str) -> bool {
        let (title, url) = (title.trim(), url.trim());
        if title.is_empty() || url.is_empty() {
            return false;
        }

        let Some(link) = self
            .tab_mut()
            .and_then(|t| t.quick_links.iter_mut().find(|l| l.id == id))
        else {
            return false;
        };

        link.title = title.to_string();
        link.url = normalize_url(url);
        true
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let Some(tab) = self.tab_mut() else {
            return false;
        };
        let before = tab.quick_links.len();
        tab.quick_links.retain(|l| l.id != id);
        tab.quick_links.len() != before
    }

    /// Copies a link to the end of the same tab.
    pub fn duplicate(&mut self, id: &str) -> Option<QuickLink> {
        let tab = self.tab_mut()?;
        let copy = tab.quick_links.iter().find(|l| l.id == id)?.duplicate();
        tab.quick_links.push(copy.clone());
        Some(copy)
    }

    /// Plain splice-move; links have no positional restrictions.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        match self.tab_mut() {
            Some(tab) => splice_move(&mut tab.quick_links, from, to),
            None => false,
        }
    }
}
