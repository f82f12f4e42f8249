// Tab deletion flow.
//
// Requested -> Rejected                       (unknown, default, pinned or last tab)
//           -> Deleted                        (tab has no links)
//           -> AwaitingConfirmation -> Deleted | Cancelled

use crate::modules::tabs::TabStore;
use crate::state::AppState;

/// Why a tab cannot be deleted. The message is meant for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeletionRejection {
    #[error("Tab not found")]
    NotFound,
    #[error("Default tabs cannot be deleted")]
    DefaultTab,
    #[error("Please unpin the tab before deleting")]
    Pinned,
    #[error("The last tab cannot be deleted")]
    LastTab,
}

/// Checks every rule that blocks deleting tab `id`, without mutating anything.
pub fn rejection_for(state: &AppState, id: &str) -> Option<DeletionRejection> {
    let Some(tab) = state.tab(id) else {
        return Some(DeletionRejection::NotFound);
    };

    if tab.is_default {
        Some(DeletionRejection::DefaultTab)
    } else if tab.pinned {
        Some(DeletionRejection::Pinned)
    } else if state.tabs.len() <= 1 {
        Some(DeletionRejection::LastTab)
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabDeletion {
    /// The tab still holds links; the user has to confirm first.
    AwaitingConfirmation { tab_id: String, link_count: usize },
    Deleted { tab_id: String },
    Cancelled { tab_id: String },
    Rejected { tab_id: String, reason: DeletionRejection },
}

impl TabDeletion {
    /// Starts a deletion. Empty tabs are deleted immediately.
    pub fn request(state: &mut AppState, id: &str) -> Self {
        if let Some(reason) = rejection_for(state, id) {
            return Self::Rejected {
                tab_id: id.to_string(),
                reason,
            };
        }

        let link_count = state
            .tab(id)
            .map(|t| t.quick_links.len())
            .unwrap_or_default();
        if link_count > 0 {
            return Self::AwaitingConfirmation {
                tab_id: id.to_string(),
                link_count,
            };
        }

        Self::finish(state, id)
    }

    /// Completes a pending deletion. Any other state is returned unchanged.
    pub fn confirm(self, state: &mut AppState) -> Self {
        match self {
            Self::AwaitingConfirmation { tab_id, .. } => Self::finish(state, &tab_id),
            other => other,
        }
    }

    pub fn cancel(self) -> Self {
        match self {
            Self::AwaitingConfirmation { tab_id, .. } => Self::Cancelled { tab_id },
            other => other,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::AwaitingConfirmation { .. })
    }

    pub fn tab_id(&self) -> &str {
        match self {
            Self::AwaitingConfirmation { tab_id, .. }
            | Self::Deleted { tab_id }
            | Self::Cancelled { tab_id }
            | Self::Rejected { tab_id, .. } => tab_id,
        }
    }

    fn finish(state: &mut AppState, id: &str) -> Self {
        if TabStore::new(state).delete(id) {
            return Self::Deleted {
                tab_id: id.to_string(),
            };
        }

        // The tab may have been pinned while the prompt was open.
        Self::Rejected {
            tab_id: id.to_string(),
            reason: rejection_for(state, id).unwrap_or(DeletionRejection::NotFound),
        }
    }
}
