// Tab store - pure logic over the canonical tab list.
// Callers persist; nothing in here touches storage.

use chrono::Utc;

use crate::modules::deletion;
use crate::modules::ordering::{display_indices, splice_move};
use crate::state::{new_id, AppState, QuickLink, Tab, DEFAULT_TAB_NAMES, NEW_TAB_NAME};

/// Tab operations over one borrowed [`AppState`].
///
/// Every method returns `false`/`None` instead of failing when an operation
/// would break a tab rule (deleting the last tab, renaming a pinned tab, ...).
pub struct TabStore<'a> {
    state: &'a mut AppState,
}

impl<'a> TabStore<'a> {
    pub fn new(state: &'a mut AppState) -> Self {
        Self { state }
    }

    /// Appends a new tab to the canonical order.
    ///
    /// A blank name becomes "New Tab". The tab is activated when `set_active`
    /// is true or when it is the only tab.
    pub fn create(&mut self, name: &str, set_active: bool, is_default: bool) -> Tab {
        let name = match name.trim() {
            "" => NEW_TAB_NAME,
            trimmed => trimmed,
        };
        let tab = Tab::new(name, is_default);
        self.state.tabs.push(tab.clone());

        if set_active || self.state.tabs.len() == 1 {
            self.state.active_tab_id = Some(tab.id.clone());
        }

        log::info!("[Tabs] Created tab '{}' ({}), default: {}", tab.name, tab.id, is_default);
        tab
    }

    /// Makes sure every reserved default tab exists exactly once and leads the
    /// canonical order, in reserved-name order.
    ///
    /// Duplicate defaults of the same name are demoted to ordinary tabs and a
    /// stray pin on a default tab is cleared. Returns true if anything changed;
    /// a second call in a row always returns false.
    pub fn reconcile_defaults(&mut self) -> bool {
        let before = self.state.tabs.clone();
        let mut seen = [false; DEFAULT_TAB_NAMES.len()];

        for tab in self.state.tabs.iter_mut().filter(|t| t.is_default) {
            if let Some(rank) = tab.reserved_rank() {
                if seen[rank] {
                    log::warn!(
                        "[Tabs] Demoting duplicate default tab '{}' ({})",
                        tab.name,
                        tab.id
                    );
                    tab.is_default = false;
                    continue;
                }
                seen[rank] = true;
            }
            tab.pinned = false;
        }

        for (rank, name) in DEFAULT_TAB_NAMES.iter().enumerate() {
            if !seen[rank] {
                self.create(name, false, true);
            }
        }

        let last = DEFAULT_TAB_NAMES.len();
        self.state.tabs.sort_by_key(|t| {
            if t.is_default {
                t.reserved_rank().unwrap_or(last)
            } else {
                last + 1
            }
        });

        before != self.state.tabs
    }

    /// Guarantees at least one tab and an active id that points at a live tab.
    pub fn ensure_active(&mut self) -> bool {
        if self.state.tabs.is_empty() {
            self.create(DEFAULT_TAB_NAMES[0], true, true);
            return true;
        }

        if self.state.active_is_valid() {
            return false;
        }

        let first = self.state.tabs[0].id.clone();
        log::info!("[Tabs] Active tab reset to {}", first);
        self.state.active_tab_id = Some(first);
        true
    }

    /// Removes a tab and its links.
    ///
    /// Refused for the last tab, default tabs, pinned tabs and unknown ids.
    /// If the deleted tab was active, the tab now at the same canonical index
    /// becomes active, or the last tab if that index fell off the end.
    pub fn delete(&mut self, id: &str) -> bool {
        if let Some(reason) = deletion::rejection_for(self.state, id) {
            log::info!("[Tabs] Refusing to delete {}: {}", id, reason);
            return false;
        }
        let Some(index) = self.state.tab_index(id) else {
            return false;
        };

        let removed = self.state.tabs.remove(index);
        log::info!(
            "[Tabs] Deleted tab '{}' with {} links",
            removed.name,
            removed.quick_links.len()
        );

        if self.state.active_tab_id.as_deref() == Some(id) {
            self.state.active_tab_id = self
                .state
                .tabs
                .get(index)
                .or_else(|| self.state.tabs.last())
                .map(|t| t.id.clone());
        }

        true
    }

    pub fn rename(&mut self, id: &str, new_name: &str) -> bool {
        let Some(tab) = self.state.tab_mut(id) else {
            return false;
        };
        if tab.is_locked() {
            log::info!("[Tabs] Tab '{}' is locked, not renaming", tab.name);
            return false;
        }

        tab.name = new_name.trim().to_string();
        true
    }

    pub fn toggle_pin(&mut self, id: &str) -> bool {
        match self.state.tab_mut(id) {
            Some(tab) if !tab.is_default => {
                tab.pinned = !tab.pinned;
                true
            }
            _ => false,
        }
    }

    /// Deep copy named "<name> (Copy)": fresh ids for the tab and every link,
    /// never pinned, never default. The copy is appended and activated.
    pub fn duplicate(&mut self, id: &str) -> Option<Tab> {
        let source = self.state.tab(id)?;
        let copy = Tab {
            id: new_id(),
            name: format!("{} (Copy)", source.name),
            pinned: false,
            is_default: false,
            quick_links: source.quick_links.iter().map(QuickLink::duplicate).collect(),
            created_at: Utc::now(),
        };

        self.state.tabs.push(copy.clone());
        self.state.active_tab_id = Some(copy.id.clone());
        Some(copy)
    }

    /// Splice-moves a tab within the canonical order.
    ///
    /// Default and pinned tabs do not move. `to` is raised to the number of
    /// default tabs so nothing lands in front of them.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let Some(tab) = self.state.tabs.get(from) else {
            return false;
        };
        if tab.is_locked() {
            return false;
        }

        let to = to.max(self.state.default_tab_count());
        splice_move(&mut self.state.tabs, from, to)
    }

    /// Canonical index of the tab shown at `display_index`.
    pub fn display_to_canonical(&self, display_index: usize) -> Option<usize> {
        display_indices(&self.state.tabs).get(display_index).copied()
    }

    /// Reorders using indices from the displayed (sorted) tab strip. Dropping
    /// past the last displayed tab moves to the end.
    pub fn move_in_display(&mut self, from_display: usize, to_display: usize) -> bool {
        let Some(from) = self.display_to_canonical(from_display) else {
            return false;
        };
        let to = self
            .display_to_canonical(to_display)
            .unwrap_or(self.state.tabs.len());

        self.reorder(from, to)
    }

    pub fn display_order(&self) -> Vec<&Tab> {
        display_indices(&self.state.tabs)
            .into_iter()
            .map(|i| &self.state.tabs[i])
            .collect()
    }

    pub fn set_active(&mut self, id: &str) -> bool {
        if self.state.tab(id).is_none() {
            return false;
        }
        self.state.active_tab_id = Some(id.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn create_test_tab(name: &str, pinned: bool) -> Tab {
        let mut tab = Tab::new(name, false);
        tab.pinned = pinned;
        tab
    }

    /// [Home, Tools] followed by the given ordinary tabs, Home active.
    fn state_with(extra: &[&str]) -> AppState {
        let mut state = AppState::default();
        let mut store = TabStore::new(&mut state);
        store.reconcile_defaults();
        store.ensure_active();
        for name in extra {
            store.create(name, false, false);
        }
        state
    }

    fn names(state: &AppState) -> Vec<&str> {
        state.tabs.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_create_appends_and_activates() {
        let mut state = state_with(&[]);
        let tab = TabStore::new(&mut state).create("  Work  ", true, false);

        assert_eq!(tab.name, "Work");
        assert_eq!(names(&state), vec!["Home", "Tools", "Work"]);
        assert_eq!(state.active_tab_id.as_deref(), Some(tab.id.as_str()));
    }

    #[test]
    fn test_create_blank_name_and_background() {
        let mut state = state_with(&[]);
        let home = state.tabs[0].id.clone();
        let tab = TabStore::new(&mut state).create("   ", false, false);

        assert_eq!(tab.name, NEW_TAB_NAME);
        assert_eq!(state.active_tab_id, Some(home));
    }

    #[test]
    fn test_first_tab_is_always_activated() {
        let mut state = AppState::default();
        let tab = TabStore::new(&mut state).create("Solo", false, false);
        assert_eq!(state.active_tab_id, Some(tab.id));
    }

    #[test]
    fn test_reconcile_from_empty() {
        let mut state = AppState::default();
        let mut store = TabStore::new(&mut state);
        assert!(store.reconcile_defaults());
        store.ensure_active();

        assert_eq!(names(&state), vec!["Home", "Tools"]);
        assert!(state.tabs.iter().all(|t| t.is_default));
        assert_eq!(state.active_tab_id, Some(state.tabs[0].id.clone()));
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let mut state = AppState::default();
        state.tabs.push(create_test_tab("Work", false));
        state.tabs.push(create_test_tab("News", true));

        assert!(TabStore::new(&mut state).reconcile_defaults());
        let snapshot = state.clone();

        assert!(!TabStore::new(&mut state).reconcile_defaults());
        assert_eq!(state, snapshot);
    }

    #[test]
    fn test_reconcile_moves_defaults_to_front() {
        let mut state = AppState::default();
        state.tabs.push(create_test_tab("Work", false));
        state.tabs.push(Tab::new("Tools", true));
        state.tabs.push(create_test_tab("News", false));

        TabStore::new(&mut state).reconcile_defaults();

        assert_eq!(names(&state), vec!["Home", "Tools", "Work", "News"]);
    }

    #[test]
    fn test_reconcile_ignores_non_default_namesake() {
        let mut state = AppState::default();
        state.tabs.push(create_test_tab("Home", false));

        TabStore::new(&mut state).reconcile_defaults();

        assert_eq!(names(&state), vec!["Home", "Tools", "Home"]);
        assert!(state.tabs[0].is_default);
        assert!(!state.tabs[2].is_default);
    }

    #[test]
    fn test_reconcile_repairs_duplicates_and_pins() {
        let mut state = AppState::default();
        let mut pinned_home = Tab::new("Home", true);
        pinned_home.pinned = true;
        state.tabs.push(pinned_home);
        state.tabs.push(Tab::new("Home", true));
        state.tabs.push(Tab::new("Tools", true));

        TabStore::new(&mut state).reconcile_defaults();

        assert_eq!(state.default_tab_count(), 2);
        assert!(!state.tabs[0].pinned);
        assert_eq!(names(&state), vec!["Home", "Tools", "Home"]);
        assert!(!state.tabs[2].is_default);
    }

    #[test]
    fn test_reconcile_keeps_unreserved_default_after_reserved() {
        let mut state = AppState::default();
        state.tabs.push(create_test_tab("News", false));
        let mut work = Tab::new("Work", true);
        work.pinned = true;
        state.tabs.push(work);

        assert!(TabStore::new(&mut state).reconcile_defaults());

        assert_eq!(names(&state), vec!["Home", "Tools", "Work", "News"]);
        assert!(state.tabs[2].is_default);
        assert!(!state.tabs[2].pinned);
        assert_eq!(state.default_tab_count(), 3);
        assert!(!TabStore::new(&mut state).reconcile_defaults());
    }

    #[test]
    fn test_ensure_active_repairs_dangling_id() {
        let mut state = state_with(&["Work"]);
        state.active_tab_id = Some("missing".to_string());

        assert!(TabStore::new(&mut state).ensure_active());
        assert_eq!(state.active_tab_id, Some(state.tabs[0].id.clone()));
        assert!(!TabStore::new(&mut state).ensure_active());
    }

    #[test]
    fn test_delete_active_activates_same_index() {
        let mut state = AppState::default();
        let mut store = TabStore::new(&mut state);
        let a = store.create("A", false, false);
        let b = store.create("B", true, false);
        let c = store.create("C", false, false);

        assert!(store.delete(&b.id));
        assert_eq!(state.active_tab_id, Some(c.id.clone()));
        assert_eq!(state.tab_index(&a.id), Some(0));
    }

    #[test]
    fn test_delete_active_last_falls_back_to_new_last() {
        let mut state = state_with(&["Work"]);
        let work = state.tabs[2].id.clone();
        TabStore::new(&mut state).set_active(&work);

        assert!(TabStore::new(&mut state).delete(&work));
        assert_eq!(state.active_tab_id, Some(state.tabs[1].id.clone()));
    }

    #[test]
    fn test_delete_inactive_keeps_active() {
        let mut state = state_with(&["Work"]);
        let home = state.tabs[0].id.clone();
        let work = state.tabs[2].id.clone();

        assert!(TabStore::new(&mut state).delete(&work));
        assert_eq!(state.active_tab_id, Some(home));
    }

    #[rstest]
    #[case::default_tab(0)]
    #[case::pinned_tab(2)]
    fn test_delete_refused(#[case] index: usize) {
        let mut state = state_with(&["Work"]);
        state.tabs[2].pinned = true;
        let id = state.tabs[index].id.clone();

        assert!(!TabStore::new(&mut state).delete(&id));
        assert_eq!(state.tabs.len(), 3);
    }

    #[test]
    fn test_delete_last_tab_refused() {
        let mut state = AppState::default();
        let only = TabStore::new(&mut state).create("Only", true, false);
        assert!(!TabStore::new(&mut state).delete(&only.id));
        assert!(!TabStore::new(&mut state).delete("nope"));
    }

    #[test]
    fn test_rename() {
        let mut state = state_with(&["Work"]);
        let home = state.tabs[0].id.clone();
        let work = state.tabs[2].id.clone();
        let mut store = TabStore::new(&mut state);

        assert!(store.rename(&work, "  Office "));
        assert!(!store.rename(&home, "Start"));
        assert!(store.toggle_pin(&work));
        assert!(!store.rename(&work, "Again"));

        assert_eq!(names(&state), vec!["Home", "Tools", "Office"]);
    }

    #[test]
    fn test_toggle_pin() {
        let mut state = state_with(&["Work"]);
        let tools = state.tabs[1].id.clone();
        let work = state.tabs[2].id.clone();
        let mut store = TabStore::new(&mut state);

        assert!(!store.toggle_pin(&tools));
        assert!(store.toggle_pin(&work));
        assert!(state.tabs[2].pinned);

        assert!(TabStore::new(&mut state).toggle_pin(&work));
        assert!(!state.tabs[2].pinned);
    }

    #[test]
    fn test_duplicate_deep_copies_links() {
        let mut state = state_with(&["Work"]);
        state.tabs[2].pinned = true;
        state.tabs[2].quick_links.push(QuickLink::new("Rust", "https://rust-lang.org"));
        let work = state.tabs[2].id.clone();

        let copy = TabStore::new(&mut state).duplicate(&work).unwrap();

        assert_eq!(copy.name, "Work (Copy)");
        assert!(!copy.pinned);
        assert!(!copy.is_default);
        assert_eq!(copy.quick_links.len(), 1);
        assert_ne!(copy.quick_links[0].id, state.tabs[2].quick_links[0].id);
        assert_eq!(copy.quick_links[0].url, "https://rust-lang.org");
        assert_eq!(state.active_tab_id, Some(copy.id.clone()));
        assert_eq!(state.tabs.last().map(|t| t.id.as_str()), Some(copy.id.as_str()));
    }

    #[test]
    fn test_duplicate_default_is_ordinary() {
        let mut state = state_with(&[]);
        let home = state.tabs[0].id.clone();
        let copy = TabStore::new(&mut state).duplicate(&home).unwrap();

        assert_eq!(copy.name, "Home (Copy)");
        assert!(!copy.is_default);
        assert!(TabStore::new(&mut state).duplicate("missing").is_none());
    }

    #[test]
    fn test_reorder_cannot_pass_defaults() {
        let mut state = state_with(&["Work"]);
        let before = names(&state).join(",");

        assert!(!TabStore::new(&mut state).reorder(2, 0));
        assert_eq!(names(&state).join(","), before);
    }

    #[test]
    fn test_reorder_default_is_noop() {
        let mut state = state_with(&["Work", "News"]);
        assert!(!TabStore::new(&mut state).reorder(0, 3));
        assert_eq!(names(&state), vec!["Home", "Tools", "Work", "News"]);
    }

    #[test]
    fn test_reorder_pinned_is_noop() {
        let mut state = state_with(&["Work", "News"]);
        state.tabs[2].pinned = true;
        assert!(!TabStore::new(&mut state).reorder(2, 3));
        assert_eq!(names(&state), vec!["Home", "Tools", "Work", "News"]);
    }

    #[rstest]
    #[case(2, 3, vec!["Home", "Tools", "B", "A", "C"])]
    #[case(4, 2, vec!["Home", "Tools", "C", "A", "B"])]
    #[case(3, 1, vec!["Home", "Tools", "B", "A", "C"])]
    #[case(2, 10, vec!["Home", "Tools", "B", "C", "A"])]
    fn test_reorder_splice(#[case] from: usize, #[case] to: usize, #[case] expected: Vec<&str>) {
        let mut state = state_with(&["A", "B", "C"]);
        assert!(TabStore::new(&mut state).reorder(from, to));
        assert_eq!(names(&state), expected);
    }

    #[test]
    fn test_reorder_never_displaces_defaults() {
        for from in 0..5 {
            for to in 0..6 {
                let mut state = state_with(&["A", "B", "C"]);
                TabStore::new(&mut state).reorder(from, to);
                assert_eq!(&names(&state)[..2], &["Home", "Tools"], "from {from} to {to}");
            }
        }
    }

    #[test]
    fn test_display_order_and_translation() {
        let mut state = state_with(&["A", "B", "C"]);
        state.tabs[4].pinned = true;

        let store = TabStore::new(&mut state);
        let shown: Vec<&str> = store.display_order().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(shown, vec!["Home", "Tools", "C", "A", "B"]);
        assert_eq!(store.display_to_canonical(2), Some(4));
        assert_eq!(store.display_to_canonical(3), Some(2));
        assert_eq!(store.display_to_canonical(5), None);
    }

    #[test]
    fn test_move_in_display() {
        let mut state = state_with(&["A", "B", "C"]);
        state.tabs[4].pinned = true;

        // Display: Home, Tools, C(pinned), A, B. Drag B onto A.
        assert!(TabStore::new(&mut state).move_in_display(4, 3));
        assert_eq!(names(&state), vec!["Home", "Tools", "B", "A", "C"]);

        // Dropping past the end.
        assert!(TabStore::new(&mut state).move_in_display(3, 9));
        assert_eq!(names(&state), vec!["Home", "Tools", "A", "C", "B"]);
    }

    #[test]
    fn test_set_active() {
        let mut state = state_with(&["Work"]);
        let work = state.tabs[2].id.clone();
        let mut store = TabStore::new(&mut state);

        assert!(store.set_active(&work));
        assert!(!store.set_active("missing"));
        assert_eq!(state.active_tab_id, Some(work));
    }
}
